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

use std::collections::{BTreeMap, HashMap};
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use chrono::NaiveDate;

use crate::model::{
    FeedScopedId, Route, Trip, TripIdAndServiceDate, TripOnServiceDate, TripPattern,
};
use crate::timetables::Timetable;

pub type PatternSet = BTreeMap<FeedScopedId, Arc<TripPattern>>;

/// Realtime timetables of one pattern, by service date.
#[derive(Debug, Clone)]
pub struct PatternTimetables {
    pub(super) pattern: Arc<TripPattern>,
    pub(super) by_service_date: BTreeMap<NaiveDate, Arc<Timetable>>,
}

impl PatternTimetables {
    pub(super) fn new(pattern: Arc<TripPattern>) -> Self {
        Self {
            pattern,
            by_service_date: BTreeMap::new(),
        }
    }

    pub fn pattern(&self) -> &Arc<TripPattern> {
        &self.pattern
    }

    pub fn get(&self, service_date: NaiveDate) -> Option<&Arc<Timetable>> {
        self.by_service_date.get(&service_date)
    }

    /// Timetables sorted by increasing service date.
    pub fn timetables(&self) -> impl Iterator<Item = &Arc<Timetable>> + '_ {
        self.by_service_date.values()
    }

    pub fn len(&self) -> usize {
        self.by_service_date.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_service_date.is_empty()
    }
}

/// A committed, immutable view of all realtime timetables.
///
/// Obtained from [`TimetableSnapshotBuffer::commit()`](super::TimetableSnapshotBuffer::commit),
/// and shared between concurrent readers through an `Arc`.
/// Nothing reachable from a snapshot is ever modified, so a reader can hold
/// it for as long as needed.
#[derive(Debug, Clone, Default)]
pub struct TimetableSnapshot {
    // patterns not modified between two commits share the same PatternTimetables
    pub(super) timetables: HashMap<FeedScopedId, Arc<PatternTimetables>>,
    pub(super) new_patterns_for_modified_trips: HashMap<TripIdAndServiceDate, Arc<TripPattern>>,
    pub(super) realtime_added_routes: HashMap<FeedScopedId, Arc<Route>>,
    pub(super) realtime_added_trips: HashMap<FeedScopedId, Arc<Trip>>,
    pub(super) realtime_added_pattern_for_trip: HashMap<FeedScopedId, Arc<TripPattern>>,
    pub(super) realtime_added_patterns_for_route: HashMap<FeedScopedId, PatternSet>,
    pub(super) realtime_added_trip_on_service_date_by_id:
        HashMap<FeedScopedId, Arc<TripOnServiceDate>>,
    pub(super) realtime_added_trip_on_service_date_for_trip_and_day:
        HashMap<TripIdAndServiceDate, Arc<TripOnServiceDate>>,
    // realtime created patterns serving each stop
    pub(super) patterns_for_stop: HashMap<FeedScopedId, PatternSet>,
}

impl TimetableSnapshot {
    /// The realtime timetable of `pattern` on `service_date` if there is one,
    /// and the scheduled timetable of `pattern` otherwise.
    pub fn resolve(&self, pattern: &TripPattern, service_date: NaiveDate) -> Arc<Timetable> {
        self.timetables
            .get(pattern.id())
            .and_then(|pattern_timetables| pattern_timetables.get(service_date))
            .unwrap_or_else(|| pattern.scheduled_timetable())
            .clone()
    }

    pub fn pattern_timetables(&self, pattern_id: &FeedScopedId) -> Option<&Arc<PatternTimetables>> {
        self.timetables.get(pattern_id)
    }

    pub fn nb_of_timetables(&self) -> usize {
        self.timetables
            .values()
            .map(|pattern_timetables| pattern_timetables.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.timetables.is_empty()
    }

    /// The realtime pattern the trip was moved onto for `service_date`, if any.
    pub fn new_trip_pattern_for_modified_trip(
        &self,
        trip_id: &FeedScopedId,
        service_date: NaiveDate,
    ) -> Option<&Arc<TripPattern>> {
        let key = TripIdAndServiceDate::new(trip_id.clone(), service_date);
        self.new_patterns_for_modified_trips.get(&key)
    }

    pub fn has_new_trip_patterns_for_modified_trips(&self) -> bool {
        !self.new_patterns_for_modified_trips.is_empty()
    }

    /// Realtime created patterns serving `stop_id`.
    pub fn patterns_for_stop<'a>(
        &'a self,
        stop_id: &FeedScopedId,
    ) -> impl Iterator<Item = &'a Arc<TripPattern>> + 'a {
        self.patterns_for_stop
            .get(stop_id)
            .into_iter()
            .flat_map(|patterns| patterns.values())
    }

    pub fn realtime_added_route(&self, route_id: &FeedScopedId) -> Option<&Arc<Route>> {
        self.realtime_added_routes.get(route_id)
    }

    pub fn list_realtime_added_routes(&self) -> impl Iterator<Item = &Arc<Route>> + '_ {
        self.realtime_added_routes.values()
    }

    pub fn realtime_added_trip(&self, trip_id: &FeedScopedId) -> Option<&Arc<Trip>> {
        self.realtime_added_trips.get(trip_id)
    }

    pub fn list_realtime_added_trips(&self) -> impl Iterator<Item = &Arc<Trip>> + '_ {
        self.realtime_added_trips.values()
    }

    pub fn realtime_added_pattern_for_trip(
        &self,
        trip_id: &FeedScopedId,
    ) -> Option<&Arc<TripPattern>> {
        self.realtime_added_pattern_for_trip.get(trip_id)
    }

    pub fn realtime_added_patterns_for_route<'a>(
        &'a self,
        route_id: &FeedScopedId,
    ) -> impl Iterator<Item = &'a Arc<TripPattern>> + 'a {
        self.realtime_added_patterns_for_route
            .get(route_id)
            .into_iter()
            .flat_map(|patterns| patterns.values())
    }

    pub fn realtime_added_trip_on_service_date_by_id(
        &self,
        id: &FeedScopedId,
    ) -> Option<&Arc<TripOnServiceDate>> {
        self.realtime_added_trip_on_service_date_by_id.get(id)
    }

    pub fn realtime_added_trip_on_service_date_for_trip_and_day(
        &self,
        trip_id: &FeedScopedId,
        service_date: NaiveDate,
    ) -> Option<&Arc<TripOnServiceDate>> {
        let key = TripIdAndServiceDate::new(trip_id.clone(), service_date);
        self.realtime_added_trip_on_service_date_for_trip_and_day
            .get(&key)
    }

    pub fn list_realtime_added_trip_on_service_dates(
        &self,
    ) -> impl Iterator<Item = &Arc<TripOnServiceDate>> + '_ {
        self.realtime_added_trip_on_service_date_by_id.values()
    }

    /// Trips canceled by realtime updates, sorted by service date then trip id.
    pub fn list_canceled_trips(&self) -> Vec<TripOnServiceDate> {
        let mut result: Vec<TripOnServiceDate> = self
            .timetables
            .values()
            .flat_map(|pattern_timetables| pattern_timetables.by_service_date.iter())
            .flat_map(|(service_date, timetable)| {
                timetable
                    .trip_times()
                    .iter()
                    .filter(|trip_times| trip_times.is_canceled())
                    .map(move |trip_times| TripOnServiceDate {
                        id: trip_times.trip_id().clone(),
                        trip: trip_times.trip().clone(),
                        service_date: *service_date,
                    })
            })
            .collect();
        result.sort_by(|lhs, rhs| {
            (lhs.service_date, &lhs.id).cmp(&(rhs.service_date, &rhs.id))
        });
        result
    }
}

impl Display for TimetableSnapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Timetable snapshot: {} timetables (committed)",
            self.nb_of_timetables()
        )
    }
}

static_assertions::assert_impl_all!(TimetableSnapshot: Send, Sync);
