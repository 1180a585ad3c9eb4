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

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::hash::Hash;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, trace};

use super::{
    snapshot::PatternTimetables, DirtyTimetable, RealTimeTransitDataUpdater, RealTimeTripUpdate,
    TimetableSnapshot, UpdateSuccess,
};
use crate::model::{FeedScopedId, TripIdAndServiceDate, TripPattern};
use crate::timetables::{Timetable, TimetableBuilder};

type PatternAndServiceDate = (FeedScopedId, NaiveDate);

/// The open, mutable version of a [`TimetableSnapshot`].
///
/// Accumulates realtime updates from a single writer, and publishes them
/// with [`commit()`](Self::commit). Readers only ever see committed snapshots.
#[derive(Debug, Default)]
pub struct TimetableSnapshotBuffer {
    current: TimetableSnapshot,
    dirty_timetables: HashMap<PatternAndServiceDate, DirtyTimetable>,
    // removed by clear() since the last commit
    to_be_restored: HashMap<PatternAndServiceDate, Arc<TripPattern>>,
    dirty: bool,
}

impl TimetableSnapshotBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content of the buffer, including uncommitted changes.
    pub fn view(&self) -> &TimetableSnapshot {
        &self.current
    }

    pub fn resolve(&self, pattern: &TripPattern, service_date: NaiveDate) -> Arc<Timetable> {
        self.current.resolve(pattern, service_date)
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Stores the trip times of `update` in the realtime timetable of its
    /// pattern and service date, and records the realtime created objects
    /// it carries.
    pub fn update(&mut self, update: RealTimeTripUpdate) -> UpdateSuccess {
        let RealTimeTripUpdate {
            pattern,
            updated_trip_times,
            service_date,
            added_trip_on_service_date,
            trip_creation,
            route_creation,
            producer,
        } = update;
        let trip_id = updated_trip_times.trip_id().clone();

        let timetable = self.resolve(&pattern, service_date);
        let new_timetable = TimetableBuilder::copy_of(&timetable)
            .with_service_date(service_date)
            .add_or_update_trip_times(updated_trip_times.clone())
            .build();
        self.swap_timetable(&pattern, service_date, Arc::new(new_timetable));

        let snapshot = &mut self.current;
        if pattern.is_created_by_realtime_updater() {
            snapshot.new_patterns_for_modified_trips.insert(
                TripIdAndServiceDate::new(trip_id.clone(), service_date),
                pattern.clone(),
            );
            for stop_id in pattern.stop_pattern().stop_ids() {
                snapshot
                    .patterns_for_stop
                    .entry(stop_id.clone())
                    .or_default()
                    .insert(pattern.id().clone(), pattern.clone());
            }
        }
        if route_creation {
            let route = pattern.route().clone();
            snapshot
                .realtime_added_routes
                .insert(route.id.clone(), route);
        }
        if trip_creation {
            let trip = updated_trip_times.trip().clone();
            snapshot.realtime_added_trips.insert(trip_id.clone(), trip);
            snapshot
                .realtime_added_pattern_for_trip
                .insert(trip_id.clone(), pattern.clone());
            snapshot
                .realtime_added_patterns_for_route
                .entry(pattern.route().id.clone())
                .or_default()
                .insert(pattern.id().clone(), pattern.clone());
            if let Some(trip_on_service_date) = added_trip_on_service_date {
                snapshot
                    .realtime_added_trip_on_service_date_by_id
                    .insert(trip_on_service_date.id.clone(), trip_on_service_date.clone());
                snapshot
                    .realtime_added_trip_on_service_date_for_trip_and_day
                    .insert(
                        trip_on_service_date.trip_id_and_service_date(),
                        trip_on_service_date,
                    );
            }
        }

        trace!(
            "Trip {} updated on pattern {} for {}",
            trip_id,
            pattern.id(),
            service_date
        );
        UpdateSuccess::with_producer(producer)
    }

    /// If `trip_id` was moved onto a realtime created pattern for `service_date`,
    /// removes it from this pattern, so that the trip is found again in its
    /// scheduled pattern.
    /// Returns true if the trip was reverted.
    pub fn revert_trip_to_scheduled_trip_pattern(
        &mut self,
        trip_id: &FeedScopedId,
        service_date: NaiveDate,
    ) -> bool {
        let key = TripIdAndServiceDate::new(trip_id.clone(), service_date);
        let pattern = match self.current.new_patterns_for_modified_trips.remove(&key) {
            Some(pattern) => pattern,
            None => return false,
        };

        let timetable = self
            .current
            .timetables
            .get(pattern.id())
            .and_then(|pattern_timetables| pattern_timetables.get(service_date))
            .cloned();
        if let Some(timetable) = timetable {
            if timetable.trip_times_for(trip_id).is_some() {
                let new_timetable = TimetableBuilder::copy_of(&timetable)
                    .remove_trip_times(trip_id)
                    .build();
                self.swap_timetable(&pattern, service_date, Arc::new(new_timetable));
            }
        }
        self.dirty = true;
        debug!(
            "Trip {} reverted from pattern {} to its scheduled pattern on {}",
            trip_id,
            pattern.id(),
            service_date
        );
        true
    }

    /// Removes all realtime data whose id belongs to `feed_id`.
    /// Returns true if something was removed.
    pub fn clear(&mut self, feed_id: &str) -> bool {
        let in_feed = |id: &FeedScopedId| id.feed_id() == feed_id;
        let mut modified = false;

        let cleared_patterns: Vec<FeedScopedId> = self
            .current
            .timetables
            .keys()
            .filter(|pattern_id| in_feed(pattern_id))
            .cloned()
            .collect();
        for pattern_id in cleared_patterns {
            if let Some(pattern_timetables) = self.current.timetables.remove(&pattern_id) {
                for service_date in pattern_timetables.by_service_date.keys() {
                    self.to_be_restored.insert(
                        (pattern_id.clone(), *service_date),
                        pattern_timetables.pattern.clone(),
                    );
                }
                modified = true;
            }
        }
        self.dirty_timetables
            .retain(|(pattern_id, _), _| !in_feed(pattern_id));

        let snapshot = &mut self.current;
        modified |= retain(&mut snapshot.new_patterns_for_modified_trips, |key, _| {
            !in_feed(&key.trip_id)
        });
        modified |= retain(&mut snapshot.realtime_added_routes, |id, _| !in_feed(id));
        modified |= retain(&mut snapshot.realtime_added_trips, |id, _| !in_feed(id));
        modified |= retain(&mut snapshot.realtime_added_pattern_for_trip, |id, _| {
            !in_feed(id)
        });
        modified |= retain(&mut snapshot.realtime_added_patterns_for_route, |id, _| {
            !in_feed(id)
        });
        modified |= retain(
            &mut snapshot.realtime_added_trip_on_service_date_by_id,
            |id, _| !in_feed(id),
        );
        modified |= retain(
            &mut snapshot.realtime_added_trip_on_service_date_for_trip_and_day,
            |key, _| !in_feed(&key.trip_id),
        );
        for patterns in snapshot.patterns_for_stop.values_mut() {
            let nb_of_patterns = patterns.len();
            patterns.retain(|pattern_id, _| !in_feed(pattern_id));
            modified |= patterns.len() != nb_of_patterns;
        }
        snapshot
            .patterns_for_stop
            .retain(|_, patterns| !patterns.is_empty());

        if modified {
            self.dirty = true;
            debug!("Cleared realtime data of feed {}", feed_id);
        }
        modified
    }

    /// Removes realtime timetables and trip modifications of service dates
    /// on or before `service_date`.
    /// Returns true if something was removed.
    pub fn purge_expired_data(&mut self, service_date: NaiveDate) -> bool {
        let expired = |date: &NaiveDate| *date <= service_date;
        let mut modified = false;

        let expired_patterns: Vec<FeedScopedId> = self
            .current
            .timetables
            .iter()
            .filter(|(_, pattern_timetables)| {
                pattern_timetables.by_service_date.keys().any(expired)
            })
            .map(|(pattern_id, _)| pattern_id.clone())
            .collect();
        for pattern_id in expired_patterns {
            let now_empty = match self.current.timetables.get_mut(&pattern_id) {
                Some(pattern_timetables) => {
                    let pattern_timetables = Arc::make_mut(pattern_timetables);
                    pattern_timetables
                        .by_service_date
                        .retain(|date, _| !expired(date));
                    pattern_timetables.is_empty()
                }
                None => continue,
            };
            if now_empty {
                self.current.timetables.remove(&pattern_id);
            }
            modified = true;
        }
        self.dirty_timetables.retain(|(_, date), _| !expired(date));
        self.to_be_restored.retain(|(_, date), _| !expired(date));
        modified |= retain(&mut self.current.new_patterns_for_modified_trips, |key, _| {
            !expired(&key.service_date)
        });

        if modified {
            self.dirty = true;
            debug!("Purged realtime data up to {}", service_date);
        }
        modified
    }

    /// Publishes the current content of the buffer as a new snapshot.
    ///
    /// Returns None if nothing changed since the previous commit, unless `force` is set.
    /// The buffer keeps its content and accumulates changes for the next commit.
    pub fn commit(
        &mut self,
        transit_layer_updater: Option<&mut dyn RealTimeTransitDataUpdater>,
        force: bool,
    ) -> Option<Arc<TimetableSnapshot>> {
        if !force && !self.dirty {
            debug!("No realtime change since the last commit, the snapshot is not renewed");
            return None;
        }
        let snapshot = Arc::new(self.current.clone());

        if let Some(updater) = transit_layer_updater {
            let mut dirty_timetables: Vec<DirtyTimetable> =
                self.dirty_timetables.values().cloned().collect();
            for ((pattern_id, service_date), pattern) in &self.to_be_restored {
                let key = (pattern_id.clone(), *service_date);
                if self.dirty_timetables.contains_key(&key) {
                    continue;
                }
                let timetable = pattern
                    .scheduled_timetable()
                    .copy_for_service_date(*service_date);
                dirty_timetables.push(DirtyTimetable {
                    pattern: pattern.clone(),
                    service_date: *service_date,
                    timetable: Arc::new(timetable),
                });
            }
            dirty_timetables.sort_by(|lhs, rhs| {
                (lhs.pattern.id(), lhs.service_date).cmp(&(rhs.pattern.id(), rhs.service_date))
            });
            updater.update(&dirty_timetables, &snapshot);
        }

        self.dirty_timetables.clear();
        self.to_be_restored.clear();
        self.dirty = false;
        debug!("{}", snapshot);
        Some(snapshot)
    }

    // Copy on write : the timetables of `pattern` are cloned if they are shared
    // with a committed snapshot.
    fn swap_timetable(
        &mut self,
        pattern: &Arc<TripPattern>,
        service_date: NaiveDate,
        timetable: Arc<Timetable>,
    ) {
        let pattern_timetables = self
            .current
            .timetables
            .entry(pattern.id().clone())
            .or_insert_with(|| Arc::new(PatternTimetables::new(pattern.clone())));
        Arc::make_mut(pattern_timetables)
            .by_service_date
            .insert(service_date, timetable.clone());
        self.dirty_timetables.insert(
            (pattern.id().clone(), service_date),
            DirtyTimetable {
                pattern: pattern.clone(),
                service_date,
                timetable,
            },
        );
        self.dirty = true;
    }
}

// Returns true if some entries were removed.
fn retain<K, V, F>(map: &mut HashMap<K, V>, f: F) -> bool
where
    K: Eq + Hash,
    F: FnMut(&K, &mut V) -> bool,
{
    let nb_of_entries = map.len();
    map.retain(f);
    map.len() != nb_of_entries
}

impl Display for TimetableSnapshotBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Timetable snapshot: {} timetables ({} dirty)",
            self.current.nb_of_timetables(),
            self.dirty_timetables.len()
        )
    }
}
