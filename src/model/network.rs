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

use super::FeedScopedId;
use crate::timetables::Timetable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub id: FeedScopedId,
    pub name: String,
}

impl Route {
    pub fn new(id: FeedScopedId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trip {
    pub id: FeedScopedId,
    pub route_id: FeedScopedId,
}

impl Trip {
    pub fn new(id: FeedScopedId, route_id: FeedScopedId) -> Self {
        Self { id, route_id }
    }
}

/// A trip running on one given service date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripOnServiceDate {
    pub id: FeedScopedId,
    pub trip: Arc<Trip>,
    pub service_date: NaiveDate,
}

impl TripOnServiceDate {
    pub fn trip_id_and_service_date(&self) -> TripIdAndServiceDate {
        TripIdAndServiceDate::new(self.trip.id.clone(), self.service_date)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TripIdAndServiceDate {
    pub trip_id: FeedScopedId,
    pub service_date: NaiveDate,
}

impl TripIdAndServiceDate {
    pub fn new(trip_id: FeedScopedId, service_date: NaiveDate) -> Self {
        Self {
            trip_id,
            service_date,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PickDrop {
    Scheduled,
    NotAllowed,
    /// Cancelled by a realtime update.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accessibility {
    Possible,
    NotPossible,
    NoInformation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopPatternEntry {
    pub stop_id: FeedScopedId,
    pub pickup: PickDrop,
    pub drop_off: PickDrop,
}

/// The ordered stops served by the trips of a pattern, with pickup and
/// drop-off conditions at each stop.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StopPattern {
    entries: Vec<StopPatternEntry>,
}

impl StopPattern {
    pub fn new(entries: Vec<StopPatternEntry>) -> Self {
        Self { entries }
    }

    /// All stops allow pickup and drop-off.
    pub fn from_stop_ids<Ids>(stop_ids: Ids) -> Self
    where
        Ids: IntoIterator<Item = FeedScopedId>,
    {
        let entries = stop_ids
            .into_iter()
            .map(|stop_id| StopPatternEntry {
                stop_id,
                pickup: PickDrop::Scheduled,
                drop_off: PickDrop::Scheduled,
            })
            .collect();
        Self { entries }
    }

    pub fn nb_of_stops(&self) -> usize {
        self.entries.len()
    }

    pub fn stop_id(&self, stop_idx: usize) -> &FeedScopedId {
        &self.entries[stop_idx].stop_id
    }

    pub fn stop_ids(&self) -> impl Iterator<Item = &FeedScopedId> + '_ {
        self.entries.iter().map(|entry| &entry.stop_id)
    }

    pub fn entries(&self) -> &[StopPatternEntry] {
        &self.entries
    }

    /// Same stops, with pickup and drop-off cancelled at `cancelled_stops`.
    pub fn with_cancelled_stops(&self, cancelled_stops: &[usize]) -> Self {
        let mut entries = self.entries.clone();
        for &stop_idx in cancelled_stops {
            if let Some(entry) = entries.get_mut(stop_idx) {
                entry.pickup = PickDrop::Cancelled;
                entry.drop_off = PickDrop::Cancelled;
            }
        }
        Self { entries }
    }
}

#[derive(Debug)]
pub struct TripPattern {
    id: FeedScopedId,
    route: Arc<Route>,
    stop_pattern: Arc<StopPattern>,
    scheduled_timetable: Arc<Timetable>,
    created_by_realtime_updater: bool,
    // the scheduled pattern this one was derived from, when modified by realtime
    original_pattern: Option<Arc<TripPattern>>,
}

impl TripPattern {
    pub fn new(route: Arc<Route>, scheduled_timetable: Timetable) -> Self {
        Self {
            id: scheduled_timetable.pattern_id().clone(),
            route,
            stop_pattern: scheduled_timetable.stop_pattern().clone(),
            scheduled_timetable: Arc::new(scheduled_timetable),
            created_by_realtime_updater: false,
            original_pattern: None,
        }
    }

    /// A pattern serving trips added by realtime updates.
    pub fn new_realtime_added(route: Arc<Route>, scheduled_timetable: Timetable) -> Self {
        Self {
            created_by_realtime_updater: true,
            ..Self::new(route, scheduled_timetable)
        }
    }

    /// A pattern created by a realtime update, serving `stop_pattern`
    /// instead of the stops of `original_pattern`.
    /// Its scheduled timetable is empty.
    pub fn new_realtime_modified(
        id: FeedScopedId,
        original_pattern: Arc<TripPattern>,
        stop_pattern: StopPattern,
    ) -> Self {
        let stop_pattern = Arc::new(stop_pattern);
        let scheduled_timetable =
            crate::timetables::TimetableBuilder::new(id.clone(), stop_pattern.clone()).build();
        Self {
            id,
            route: original_pattern.route.clone(),
            stop_pattern,
            scheduled_timetable: Arc::new(scheduled_timetable),
            created_by_realtime_updater: true,
            original_pattern: Some(original_pattern),
        }
    }

    pub fn id(&self) -> &FeedScopedId {
        &self.id
    }

    pub fn route(&self) -> &Arc<Route> {
        &self.route
    }

    pub fn stop_pattern(&self) -> &Arc<StopPattern> {
        &self.stop_pattern
    }

    pub fn nb_of_stops(&self) -> usize {
        self.stop_pattern.nb_of_stops()
    }

    pub fn scheduled_timetable(&self) -> &Arc<Timetable> {
        &self.scheduled_timetable
    }

    pub fn is_created_by_realtime_updater(&self) -> bool {
        self.created_by_realtime_updater
    }

    pub fn original_trip_pattern(&self) -> Option<&Arc<TripPattern>> {
        self.original_pattern.as_ref()
    }
}
