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

use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::sync::Arc;

use crate::model::{Accessibility, FeedScopedId, Trip};

/// State of a trip with respect to realtime data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealTimeState {
    Scheduled,
    /// Times updated by a realtime message.
    Updated,
    Canceled,
    /// Trip added by a realtime message.
    Added,
    /// Trip moved onto a pattern created by a realtime message.
    Modified,
    /// Trip removed from its pattern.
    Deleted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StopRealTimeState {
    Default,
    Cancelled,
    NoData,
    Recorded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledStopTime {
    pub stop_sequence: u32,
    pub arrival_time: i32,
    pub departure_time: i32,
    pub timepoint: bool,
}

/// Times of a trip as found in the schedule, in seconds since the
/// start of the service day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTripTimes {
    trip: Arc<Trip>,
    stop_sequences: Vec<u32>,
    arrival_times: Vec<i32>,
    departure_times: Vec<i32>,
    timepoints: Vec<bool>,
    wheelchair_accessibility: Accessibility,
}

impl ScheduledTripTimes {
    pub fn new<StopTimes>(trip: Arc<Trip>, stop_times: StopTimes) -> Self
    where
        StopTimes: IntoIterator<Item = ScheduledStopTime>,
    {
        let mut result = Self {
            trip,
            stop_sequences: Vec::new(),
            arrival_times: Vec::new(),
            departure_times: Vec::new(),
            timepoints: Vec::new(),
            wheelchair_accessibility: Accessibility::NoInformation,
        };
        for stop_time in stop_times {
            result.stop_sequences.push(stop_time.stop_sequence);
            result.arrival_times.push(stop_time.arrival_time);
            result.departure_times.push(stop_time.departure_time);
            result.timepoints.push(stop_time.timepoint);
        }
        result
    }

    pub fn with_wheelchair_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.wheelchair_accessibility = accessibility;
        self
    }

    pub fn trip(&self) -> &Arc<Trip> {
        &self.trip
    }

    pub fn nb_of_stops(&self) -> usize {
        self.arrival_times.len()
    }
}

/// Times of one trip at each stop of its pattern.
///
/// Either a plain copy of the scheduled times, or the frozen result of
/// a realtime patch (see [`RealTimeTripTimes`]).
/// A `TripTimes` is never mutated once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripTimes {
    scheduled: Arc<ScheduledTripTimes>,
    arrival_times: Vec<i32>,
    departure_times: Vec<i32>,
    stop_states: Vec<StopRealTimeState>,
    real_time_state: RealTimeState,
    wheelchair_accessibility: Accessibility,
}

impl TripTimes {
    pub fn from_scheduled(scheduled: Arc<ScheduledTripTimes>) -> Self {
        let nb_of_stops = scheduled.nb_of_stops();
        Self {
            arrival_times: scheduled.arrival_times.clone(),
            departure_times: scheduled.departure_times.clone(),
            stop_states: vec![StopRealTimeState::Default; nb_of_stops],
            real_time_state: RealTimeState::Scheduled,
            wheelchair_accessibility: scheduled.wheelchair_accessibility,
            scheduled,
        }
    }

    /// A working copy holding the scheduled times, ready to be patched.
    pub fn copy_scheduled_times(&self) -> RealTimeTripTimes {
        RealTimeTripTimes {
            times: TripTimes::from_scheduled(self.scheduled.clone()),
        }
    }

    /// A working copy holding the current times.
    pub fn copy(&self) -> RealTimeTripTimes {
        RealTimeTripTimes {
            times: self.clone(),
        }
    }

    pub fn trip(&self) -> &Arc<Trip> {
        &self.scheduled.trip
    }

    pub fn trip_id(&self) -> &FeedScopedId {
        &self.scheduled.trip.id
    }

    pub fn scheduled_trip_times(&self) -> &Arc<ScheduledTripTimes> {
        &self.scheduled
    }

    pub fn nb_of_stops(&self) -> usize {
        self.arrival_times.len()
    }

    pub fn arrival_time(&self, stop_idx: usize) -> i32 {
        self.arrival_times[stop_idx]
    }

    pub fn departure_time(&self, stop_idx: usize) -> i32 {
        self.departure_times[stop_idx]
    }

    pub fn scheduled_arrival_time(&self, stop_idx: usize) -> i32 {
        self.scheduled.arrival_times[stop_idx]
    }

    pub fn scheduled_departure_time(&self, stop_idx: usize) -> i32 {
        self.scheduled.departure_times[stop_idx]
    }

    pub fn arrival_delay(&self, stop_idx: usize) -> i32 {
        self.arrival_time(stop_idx) - self.scheduled_arrival_time(stop_idx)
    }

    pub fn departure_delay(&self, stop_idx: usize) -> i32 {
        self.departure_time(stop_idx) - self.scheduled_departure_time(stop_idx)
    }

    pub fn stop_sequence(&self, stop_idx: usize) -> u32 {
        self.scheduled.stop_sequences[stop_idx]
    }

    pub fn is_timepoint(&self, stop_idx: usize) -> bool {
        self.scheduled.timepoints[stop_idx]
    }

    pub fn stop_real_time_state(&self, stop_idx: usize) -> StopRealTimeState {
        self.stop_states[stop_idx]
    }

    pub fn is_cancelled_stop(&self, stop_idx: usize) -> bool {
        self.stop_states[stop_idx] == StopRealTimeState::Cancelled
    }

    pub fn is_no_data_stop(&self, stop_idx: usize) -> bool {
        self.stop_states[stop_idx] == StopRealTimeState::NoData
    }

    pub fn is_recorded_stop(&self, stop_idx: usize) -> bool {
        self.stop_states[stop_idx] == StopRealTimeState::Recorded
    }

    pub fn real_time_state(&self) -> RealTimeState {
        self.real_time_state
    }

    pub fn is_scheduled(&self) -> bool {
        self.real_time_state == RealTimeState::Scheduled
    }

    pub fn is_canceled(&self) -> bool {
        self.real_time_state == RealTimeState::Canceled
    }

    pub fn is_deleted(&self) -> bool {
        self.real_time_state == RealTimeState::Deleted
    }

    pub fn is_canceled_or_deleted(&self) -> bool {
        self.is_canceled() || self.is_deleted()
    }

    pub fn wheelchair_accessibility(&self) -> Accessibility {
        self.wheelchair_accessibility
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationErrorCode {
    /// The vehicle departs from a stop before arriving at it.
    NegativeDwellTime,
    /// The vehicle arrives at a stop before departing from the previous one.
    NegativeHopTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimetableValidationError {
    pub trip_id: FeedScopedId,
    pub code: ValidationErrorCode,
    pub stop_idx: usize,
}

impl std::error::Error for TimetableValidationError {}

impl Display for TimetableValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.code {
            ValidationErrorCode::NegativeDwellTime => write!(
                f,
                "Trip {} departs before arriving at stop {}",
                self.trip_id, self.stop_idx
            ),
            ValidationErrorCode::NegativeHopTime => write!(
                f,
                "Trip {} arrives at stop {} before departing from the previous stop",
                self.trip_id, self.stop_idx
            ),
        }
    }
}

/// A mutable working copy of a [`TripTimes`], on which realtime
/// updates are applied before being frozen with [`freeze()`](Self::freeze).
#[derive(Debug, Clone)]
pub struct RealTimeTripTimes {
    times: TripTimes,
}

impl Deref for RealTimeTripTimes {
    type Target = TripTimes;

    fn deref(&self) -> &TripTimes {
        &self.times
    }
}

impl RealTimeTripTimes {
    pub fn freeze(self) -> TripTimes {
        self.times
    }

    pub fn update_arrival_time(&mut self, stop_idx: usize, time: i32) {
        self.times.arrival_times[stop_idx] = time;
    }

    pub fn update_arrival_delay(&mut self, stop_idx: usize, delay: i32) {
        self.times.arrival_times[stop_idx] =
            self.scheduled_arrival_time(stop_idx).saturating_add(delay);
    }

    pub fn update_departure_time(&mut self, stop_idx: usize, time: i32) {
        self.times.departure_times[stop_idx] = time;
    }

    pub fn update_departure_delay(&mut self, stop_idx: usize, delay: i32) {
        self.times.departure_times[stop_idx] =
            self.scheduled_departure_time(stop_idx).saturating_add(delay);
    }

    pub fn set_cancelled(&mut self, stop_idx: usize) {
        self.times.stop_states[stop_idx] = StopRealTimeState::Cancelled;
    }

    pub fn set_no_data(&mut self, stop_idx: usize) {
        self.times.stop_states[stop_idx] = StopRealTimeState::NoData;
    }

    pub fn set_recorded(&mut self, stop_idx: usize) {
        self.times.stop_states[stop_idx] = StopRealTimeState::Recorded;
    }

    pub fn set_real_time_state(&mut self, state: RealTimeState) {
        self.times.real_time_state = state;
    }

    pub fn set_wheelchair_accessibility(&mut self, accessibility: Accessibility) {
        self.times.wheelchair_accessibility = accessibility;
    }

    /// All stops are cancelled, and the trip is marked as canceled.
    pub fn cancel_trip(&mut self) {
        for state in self.times.stop_states.iter_mut() {
            *state = StopRealTimeState::Cancelled;
        }
        self.times.real_time_state = RealTimeState::Canceled;
    }

    pub fn delete_trip(&mut self) {
        self.times.real_time_state = RealTimeState::Deleted;
    }

    /// Applies the arrival delay of `first_updated_stop_idx` to all previous stops.
    /// Returns true if some times were changed.
    pub fn adjust_times_before_always(&mut self, first_updated_stop_idx: usize) -> bool {
        if first_updated_stop_idx == 0 {
            return false;
        }
        let delay = self.arrival_delay(first_updated_stop_idx);
        for stop_idx in 0..first_updated_stop_idx {
            self.update_arrival_delay(stop_idx, delay);
            self.update_departure_delay(stop_idx, delay);
        }
        true
    }

    /// Applies the arrival delay of `first_updated_stop_idx` to all previous stops,
    /// but only when the vehicle would otherwise arrive at `first_updated_stop_idx`
    /// before leaving the stop before it.
    /// When `set_no_data` is true, the non cancelled previous stops are flagged
    /// as having no realtime data.
    /// Returns true if some times were changed.
    pub fn adjust_times_before_when_required(
        &mut self,
        first_updated_stop_idx: usize,
        set_no_data: bool,
    ) -> bool {
        if first_updated_stop_idx == 0 {
            return false;
        }
        let first_arrival = self.arrival_time(first_updated_stop_idx);
        if first_arrival >= self.departure_time(first_updated_stop_idx - 1) {
            return false;
        }
        let delay = self.arrival_delay(first_updated_stop_idx);
        for stop_idx in (0..first_updated_stop_idx).rev() {
            if set_no_data && !self.is_cancelled_stop(stop_idx) {
                self.set_no_data(stop_idx);
            }
            self.update_arrival_delay(stop_idx, delay);
            self.update_departure_delay(stop_idx, delay);
        }
        true
    }

    /// Gives times to runs of cancelled stops lying between two non cancelled stops,
    /// proportionally to the scheduled times.
    /// Runs at the beginning or at the end of the trip are left untouched, as are
    /// runs whose surrounding times are decreasing.
    /// Returns true if some times were interpolated.
    pub fn interpolate_missing_times(&mut self) -> bool {
        let nb_of_stops = self.nb_of_stops();
        let mut interpolated = false;
        let mut stop_idx = 1;
        while stop_idx < nb_of_stops {
            if !self.is_cancelled_stop(stop_idx) {
                stop_idx += 1;
                continue;
            }
            let run_start = stop_idx;
            let mut run_end = stop_idx;
            while run_end < nb_of_stops && self.is_cancelled_stop(run_end) {
                run_end += 1;
            }
            stop_idx = run_end;
            // the run reaches the first or last stop
            if run_end == nb_of_stops || self.is_cancelled_stop(run_start - 1) {
                continue;
            }

            let previous_departure = self.departure_time(run_start - 1);
            let next_arrival = self.arrival_time(run_end);
            if previous_departure > next_arrival {
                continue;
            }
            let scheduled_previous_departure = self.scheduled_departure_time(run_start - 1);
            let scheduled_next_arrival = self.scheduled_arrival_time(run_end);
            let scheduled_span = i64::from(scheduled_next_arrival - scheduled_previous_departure);
            let real_time_span = i64::from(next_arrival - previous_departure);

            let interpolate = |scheduled_time: i32| -> i32 {
                if scheduled_span <= 0 {
                    return previous_departure;
                }
                let elapsed = i64::from(scheduled_time - scheduled_previous_departure);
                previous_departure + (elapsed * real_time_span / scheduled_span) as i32
            };

            for idx in run_start..run_end {
                let arrival = interpolate(self.scheduled_arrival_time(idx));
                let departure = interpolate(self.scheduled_departure_time(idx));
                self.update_arrival_time(idx, arrival);
                self.update_departure_time(idx, departure);
            }
            interpolated = true;
        }
        interpolated
    }

    /// Checks that times never decrease along the trip.
    /// Cancelled stops are checked too.
    pub fn validate_non_increasing_times(&self) -> Result<(), TimetableValidationError> {
        let error = |code, stop_idx| TimetableValidationError {
            trip_id: self.trip_id().clone(),
            code,
            stop_idx,
        };
        for stop_idx in 0..self.nb_of_stops() {
            let arrival = self.arrival_time(stop_idx);
            let departure = self.departure_time(stop_idx);
            if departure < arrival {
                return Err(error(ValidationErrorCode::NegativeDwellTime, stop_idx));
            }
            if stop_idx > 0 && self.departure_time(stop_idx - 1) > arrival {
                return Err(error(ValidationErrorCode::NegativeHopTime, stop_idx));
            }
        }
        Ok(())
    }
}
