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

use std::collections::BTreeMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use chrono::NaiveDate;

use super::{FrequencyEntry, Timetable, TripTimes};
use crate::model::{FeedScopedId, StopPattern};

/// Stages the content of a new [`Timetable`].
///
/// Trip times are kept by trip id, so that [`build()`](Self::build) produces
/// the same timetable whatever the order in which trips were added.
#[derive(Debug, Clone)]
pub struct TimetableBuilder {
    pattern_id: FeedScopedId,
    stop_pattern: Arc<StopPattern>,
    service_date: Option<NaiveDate>,
    trip_times: BTreeMap<FeedScopedId, Arc<TripTimes>>,
    frequency_entries: Vec<Arc<FrequencyEntry>>,
}

pub enum TimetableBuilderError {
    DuplicateTripTimes(FeedScopedId),
    // trip id, stops of the trip, stops of the pattern
    StopCountMismatch(FeedScopedId, usize, usize),
}

impl std::error::Error for TimetableBuilderError {}

impl Display for TimetableBuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Debug>::fmt(self, f)
    }
}

impl Debug for TimetableBuilderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TimetableBuilderError::DuplicateTripTimes(trip_id) => write!(
                f,
                "Trip {} already has times in this timetable, use add_or_update_trip_times() to replace them",
                trip_id
            ),
            TimetableBuilderError::StopCountMismatch(trip_id, nb_of_trip_stops, nb_of_stops) => {
                write!(
                    f,
                    "Trip {} has times for {} stops but its pattern has {} stops",
                    trip_id, nb_of_trip_stops, nb_of_stops
                )
            }
        }
    }
}

impl TimetableBuilder {
    pub fn new(pattern_id: FeedScopedId, stop_pattern: Arc<StopPattern>) -> Self {
        Self {
            pattern_id,
            stop_pattern,
            service_date: None,
            trip_times: BTreeMap::new(),
            frequency_entries: Vec::new(),
        }
    }

    pub fn copy_of(timetable: &Timetable) -> Self {
        let trip_times = timetable
            .trip_times
            .iter()
            .map(|trip_times| (trip_times.trip_id().clone(), trip_times.clone()))
            .collect();
        Self {
            pattern_id: timetable.pattern_id.clone(),
            stop_pattern: timetable.stop_pattern.clone(),
            service_date: timetable.service_date,
            trip_times,
            frequency_entries: timetable.frequency_entries.clone(),
        }
    }

    pub fn with_service_date(mut self, service_date: NaiveDate) -> Self {
        self.service_date = Some(service_date);
        self
    }

    pub fn trip_times(&self, trip_id: &FeedScopedId) -> Option<&Arc<TripTimes>> {
        self.trip_times.get(trip_id)
    }

    pub fn add_trip_times(
        mut self,
        trip_times: Arc<TripTimes>,
    ) -> Result<Self, TimetableBuilderError> {
        let trip_id = trip_times.trip_id().clone();
        if trip_times.nb_of_stops() != self.stop_pattern.nb_of_stops() {
            return Err(TimetableBuilderError::StopCountMismatch(
                trip_id,
                trip_times.nb_of_stops(),
                self.stop_pattern.nb_of_stops(),
            ));
        }
        if self.trip_times(&trip_id).is_some() || self.frequency_entry_idx(&trip_id).is_some() {
            return Err(TimetableBuilderError::DuplicateTripTimes(trip_id));
        }
        self.trip_times.insert(trip_id, trip_times);
        Ok(self)
    }

    /// Replaces the times of the trip if it is already in the timetable,
    /// including as the trip of a frequency entry, and adds them otherwise.
    ///
    /// The trip times must have been derived from a trip of this pattern.
    pub fn add_or_update_trip_times(mut self, trip_times: Arc<TripTimes>) -> Self {
        debug_assert_eq!(trip_times.nb_of_stops(), self.stop_pattern.nb_of_stops());
        if let Some(idx) = self.frequency_entry_idx(trip_times.trip_id()) {
            let entry = &mut self.frequency_entries[idx];
            *entry = Arc::new(entry.with_trip_times(trip_times));
            return self;
        }
        self.trip_times
            .insert(trip_times.trip_id().clone(), trip_times);
        self
    }

    fn frequency_entry_idx(&self, trip_id: &FeedScopedId) -> Option<usize> {
        self.frequency_entries
            .iter()
            .position(|entry| entry.trip_times.trip_id() == trip_id)
    }

    pub fn remove_trip_times(mut self, trip_id: &FeedScopedId) -> Self {
        self.trip_times.remove(trip_id);
        self
    }

    pub fn remove_all_trip_times<'a, TripIds>(mut self, trip_ids: TripIds) -> Self
    where
        TripIds: IntoIterator<Item = &'a FeedScopedId>,
    {
        for trip_id in trip_ids {
            self.trip_times.remove(trip_id);
        }
        self
    }

    pub fn add_frequency_entry(mut self, frequency_entry: FrequencyEntry) -> Self {
        self.frequency_entries.push(Arc::new(frequency_entry));
        self
    }

    /// Replaces the times of every trip, including the ones of frequency entries,
    /// by `f(times)`.
    pub fn update_all_trip_times<F>(mut self, f: F) -> Self
    where
        F: Fn(&TripTimes) -> TripTimes,
    {
        for trip_times in self.trip_times.values_mut() {
            *trip_times = Arc::new(f(trip_times));
        }
        for entry in self.frequency_entries.iter_mut() {
            let new_trip_times = Arc::new(f(&entry.trip_times));
            *entry = Arc::new(entry.with_trip_times(new_trip_times));
        }
        self
    }

    pub fn build(self) -> Timetable {
        Timetable {
            pattern_id: self.pattern_id,
            stop_pattern: self.stop_pattern,
            service_date: self.service_date,
            trip_times: self.trip_times.into_values().collect(),
            frequency_entries: self.frequency_entries,
        }
    }
}
