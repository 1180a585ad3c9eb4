// Copyright  (C) 2020, Kisio Digital and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Kisio Digital (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

use std::sync::Arc;

use chrono::NaiveDate;
use chrono_tz::Tz;
use tracing::{debug, trace, warn};

use super::{
    FrequencyEntry, RealTimeState, RealTimeTripTimes, ScheduleRelationship, StopTimeEvent,
    StopTimeUpdate, TimetableBuilder, TripTimes, TripTimesPatch, TripUpdate,
};
use crate::{
    config::BackwardsDelayPropagationType,
    model::{FeedScopedId, StopPattern},
    realtime::{UpdateError, UpdateErrorType},
    time,
};

/// Times of all trips of a pattern.
///
/// Either the scheduled timetable of the pattern (no service date),
/// or a realtime version of it, valid only on its service date.
/// Trips are sorted by id.
/// A `Timetable` is immutable : use a [`TimetableBuilder`] to derive a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timetable {
    pub(super) pattern_id: FeedScopedId,
    pub(super) stop_pattern: Arc<StopPattern>,
    pub(super) service_date: Option<NaiveDate>,
    pub(super) trip_times: Vec<Arc<TripTimes>>,
    pub(super) frequency_entries: Vec<Arc<FrequencyEntry>>,
}

impl Timetable {
    pub fn pattern_id(&self) -> &FeedScopedId {
        &self.pattern_id
    }

    pub fn stop_pattern(&self) -> &Arc<StopPattern> {
        &self.stop_pattern
    }

    pub fn service_date(&self) -> Option<NaiveDate> {
        self.service_date
    }

    pub fn is_created_by_realtime_updater(&self) -> bool {
        self.service_date.is_some()
    }

    /// A timetable without service date is valid on every date.
    pub fn is_valid_for(&self, date: NaiveDate) -> bool {
        match self.service_date {
            Some(service_date) => service_date == date,
            None => true,
        }
    }

    pub fn trip_times(&self) -> &[Arc<TripTimes>] {
        &self.trip_times
    }

    pub fn frequency_entries(&self) -> &[Arc<FrequencyEntry>] {
        &self.frequency_entries
    }

    pub fn is_empty(&self) -> bool {
        self.trip_times.is_empty() && self.frequency_entries.is_empty()
    }

    pub fn trip_index(&self, trip_id: &FeedScopedId) -> Option<usize> {
        self.trip_times
            .binary_search_by(|trip_times| trip_times.trip_id().cmp(trip_id))
            .ok()
    }

    pub fn trip_times_for(&self, trip_id: &FeedScopedId) -> Option<&Arc<TripTimes>> {
        self.trip_index(trip_id)
            .map(|idx| &self.trip_times[idx])
            .or_else(|| {
                self.frequency_entries
                    .iter()
                    .map(|entry| &entry.trip_times)
                    .find(|trip_times| trip_times.trip_id() == trip_id)
            })
    }

    /// Times of one of the trips, taken from the fixed-schedule trips first.
    pub fn representative_trip_times(&self) -> Option<&Arc<TripTimes>> {
        self.trip_times
            .first()
            .or_else(|| self.frequency_entries.first().map(|entry| &entry.trip_times))
    }

    pub fn copy_of(&self) -> TimetableBuilder {
        TimetableBuilder::copy_of(self)
    }

    /// The same trips, as a realtime timetable for `service_date`.
    pub fn copy_for_service_date(&self, service_date: NaiveDate) -> Timetable {
        Timetable {
            service_date: Some(service_date),
            ..self.clone()
        }
    }

    /// Applies `trip_update` on the scheduled times of the trip it targets,
    /// and returns the new times.
    ///
    /// Times given by the update are applied stop by stop. A delay known at
    /// some stop is carried to the following stops that are not updated.
    /// Depending on `backwards_delay_propagation_type`, the delay of the first
    /// updated stop may also be applied to the stops before it.
    /// Times of cancelled stops are interpolated, then the resulting times
    /// are checked to never decrease along the trip.
    ///
    /// This timetable is left untouched.
    pub fn create_updated_trip_times(
        &self,
        trip_update: &TripUpdate,
        timezone: &Tz,
        service_date: NaiveDate,
        backwards_delay_propagation_type: BackwardsDelayPropagationType,
    ) -> Result<TripTimesPatch, UpdateError> {
        let trip_id = match trip_update.trip_id.as_deref() {
            Some(trip_id) => self.pattern_id.sibling(trip_id),
            None => {
                debug!("Trip update without trip id on pattern {}", self.pattern_id);
                return Err(UpdateError::without_trip_id(UpdateErrorType::TripNotFound));
            }
        };
        let trip_times = self.trip_times_for(&trip_id).ok_or_else(|| {
            debug!(
                "Trip {} not found in pattern {} on {}",
                trip_id, self.pattern_id, service_date
            );
            UpdateError::new(trip_id.clone(), UpdateErrorType::TripNotFoundInPattern)
        })?;
        if trip_update.stop_time_updates.is_empty() {
            warn!("Trip update for {} has no stop time update", trip_id);
            return Err(UpdateError::new(trip_id, UpdateErrorType::TooFewStops));
        }

        let service_day_start = time::service_day_start(service_date, timezone);
        let mut new_times = trip_times.copy_scheduled_times();
        let mut skipped_stop_indices = Vec::new();
        let mut stop_time_updates = trip_update.stop_time_updates.iter().peekable();
        let mut delay: Option<i32> = None;
        let mut first_updated_stop_idx: Option<usize> = None;

        for stop_idx in 0..new_times.nb_of_stops() {
            let stop_pattern = &self.stop_pattern;
            let matched = stop_time_updates.next_if(|update| {
                is_update_for_stop(update, stop_idx, &new_times, stop_pattern)
            });
            let update = match matched {
                Some(update) => update,
                None => {
                    if let Some(delay) = delay {
                        new_times.update_arrival_delay(stop_idx, delay);
                        new_times.update_departure_delay(stop_idx, delay);
                    }
                    continue;
                }
            };

            match update.schedule_relationship {
                ScheduleRelationship::Skipped => {
                    skipped_stop_indices.push(stop_idx);
                    new_times.set_cancelled(stop_idx);
                    let skipped_delay = delay.unwrap_or(0);
                    new_times.update_arrival_delay(stop_idx, skipped_delay);
                    new_times.update_departure_delay(stop_idx, skipped_delay);
                    delay = Some(skipped_delay);
                }
                ScheduleRelationship::NoData => {
                    new_times.update_arrival_delay(stop_idx, 0);
                    new_times.update_departure_delay(stop_idx, 0);
                    new_times.set_no_data(stop_idx);
                    delay = Some(0);
                }
                ScheduleRelationship::Scheduled => {
                    // backward propagation starts from the first stop given a time
                    if update.arrival.is_some() || update.departure.is_some() {
                        first_updated_stop_idx.get_or_insert(stop_idx);
                    }
                    delay = apply_scheduled_stop_update(
                        update,
                        stop_idx,
                        &mut new_times,
                        delay,
                        service_day_start,
                    )?;
                }
            }
        }

        if let Some(unmatched) = stop_time_updates.peek() {
            debug!(
                "Trip {} : stop time update {:?} does not match any remaining stop",
                trip_id, unmatched
            );
            return Err(UpdateError::new(
                trip_id,
                UpdateErrorType::InvalidStopSequence,
            ));
        }

        if let Some(first_updated_stop_idx) = first_updated_stop_idx.filter(|&idx| idx > 0) {
            let propagated = match backwards_delay_propagation_type {
                BackwardsDelayPropagationType::None => false,
                BackwardsDelayPropagationType::RequiredNoData => {
                    new_times.adjust_times_before_when_required(first_updated_stop_idx, true)
                }
                BackwardsDelayPropagationType::Required => {
                    new_times.adjust_times_before_when_required(first_updated_stop_idx, false)
                }
                BackwardsDelayPropagationType::Always => {
                    new_times.adjust_times_before_always(first_updated_stop_idx)
                }
            };
            if propagated {
                debug!(
                    "Trip {} : delay propagated backwards from stop {}",
                    trip_id, first_updated_stop_idx
                );
            }
        }

        if new_times.interpolate_missing_times() {
            debug!("Trip {} : interpolated times of cancelled stops", trip_id);
        }

        new_times.validate_non_increasing_times().map_err(|err| {
            debug!("{}", err);
            UpdateError::from(err)
        })?;

        if let Some(accessibility) = trip_update.wheelchair_accessibility {
            new_times.set_wheelchair_accessibility(accessibility);
        }
        new_times.set_real_time_state(RealTimeState::Updated);

        trace!(
            "Trip {} updated on {}, skipped stops {:?}",
            trip_id,
            service_date,
            skipped_stop_indices
        );
        Ok(TripTimesPatch {
            trip_times: Arc::new(new_times.freeze()),
            skipped_stop_indices,
        })
    }
}

// An update targets a stop by its stop sequence if present, by its stop id otherwise
fn is_update_for_stop(
    update: &StopTimeUpdate,
    stop_idx: usize,
    trip_times: &RealTimeTripTimes,
    stop_pattern: &StopPattern,
) -> bool {
    match (update.stop_sequence, &update.stop_id) {
        (Some(stop_sequence), _) => trip_times.stop_sequence(stop_idx) == stop_sequence,
        (None, Some(stop_id)) => stop_pattern.stop_id(stop_idx).id() == stop_id,
        (None, None) => false,
    }
}

// Returns (new time, delay) of an event, or None if it carries neither a delay
// nor a valid timestamp, or if the delay is more than 48 hours.
// When both are given, the timestamp sets the time and the delay is kept as is.
fn resolve_event(
    event: &StopTimeEvent,
    scheduled_time: i32,
    service_day_start: Option<i64>,
) -> Option<(i32, i32)> {
    if let Some(timestamp) = event.time {
        let new_time = time::seconds_since_service_day_start(timestamp, service_day_start?)?;
        let delay = match event.delay {
            Some(delay) => delay,
            None => new_time.checked_sub(scheduled_time)?,
        };
        Some((new_time, delay)).filter(|&(_, delay)| time::is_valid_delay(delay))
    } else {
        let delay = event.delay?;
        Some((time::delayed_time(scheduled_time, delay)?, delay))
    }
}

// Returns the delay to carry to the next stops.
fn apply_scheduled_stop_update(
    update: &StopTimeUpdate,
    stop_idx: usize,
    new_times: &mut RealTimeTripTimes,
    previous_delay: Option<i32>,
    service_day_start: Option<i64>,
) -> Result<Option<i32>, UpdateError> {
    let arrival = match &update.arrival {
        Some(event) => {
            let scheduled = new_times.scheduled_arrival_time(stop_idx);
            let resolved = resolve_event(event, scheduled, service_day_start).ok_or_else(|| {
                debug!(
                    "Trip {} : invalid arrival {:?} at stop {}",
                    new_times.trip_id(),
                    event,
                    stop_idx
                );
                UpdateError::at_stop(
                    new_times.trip_id().clone(),
                    UpdateErrorType::InvalidArrivalTime,
                    stop_idx,
                )
            })?;
            Some(resolved)
        }
        None => None,
    };
    let departure = match &update.departure {
        Some(event) => {
            let scheduled = new_times.scheduled_departure_time(stop_idx);
            let resolved = resolve_event(event, scheduled, service_day_start).ok_or_else(|| {
                debug!(
                    "Trip {} : invalid departure {:?} at stop {}",
                    new_times.trip_id(),
                    event,
                    stop_idx
                );
                UpdateError::at_stop(
                    new_times.trip_id().clone(),
                    UpdateErrorType::InvalidDepartureTime,
                    stop_idx,
                )
            })?;
            Some(resolved)
        }
        None => None,
    };

    let delay = match (arrival, departure) {
        (Some((arrival_time, _)), Some((departure_time, departure_delay))) => {
            new_times.update_arrival_time(stop_idx, arrival_time);
            new_times.update_departure_time(stop_idx, departure_time);
            Some(departure_delay)
        }
        (None, Some((departure_time, departure_delay))) => {
            let arrival_time = new_times
                .scheduled_arrival_time(stop_idx)
                .saturating_add(previous_delay.unwrap_or(0));
            new_times.update_arrival_time(stop_idx, arrival_time.min(departure_time));
            new_times.update_departure_time(stop_idx, departure_time);
            Some(departure_delay)
        }
        (Some((arrival_time, arrival_delay)), None) => {
            new_times.update_arrival_time(stop_idx, arrival_time);
            if arrival_delay < 0 {
                // an early vehicle waits at timepoints
                if new_times.is_timepoint(stop_idx) {
                    new_times.update_departure_delay(stop_idx, 0);
                    Some(0)
                } else {
                    new_times.update_departure_delay(stop_idx, arrival_delay);
                    Some(arrival_delay)
                }
            } else {
                let departure_time = arrival_time.max(new_times.scheduled_departure_time(stop_idx));
                new_times.update_departure_time(stop_idx, departure_time);
                Some(arrival_delay)
            }
        }
        (None, None) => {
            if let Some(delay) = previous_delay {
                new_times.update_arrival_delay(stop_idx, delay);
                new_times.update_departure_delay(stop_idx, delay);
            }
            previous_delay
        }
    };
    if update.recorded {
        new_times.set_recorded(stop_idx);
    }
    Ok(delay)
}
