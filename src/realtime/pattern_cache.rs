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
use std::sync::Arc;

use tracing::debug;

use crate::model::{FeedScopedId, StopPattern, TripPattern};

/// Patterns created by realtime updates, so that all trips of a scheduled
/// pattern skipping the same stops end up on the same new pattern.
#[derive(Debug, Default)]
pub struct TripPatternCache {
    patterns: HashMap<(FeedScopedId, StopPattern), Arc<TripPattern>>,
    nb_of_created_patterns: usize,
}

impl TripPatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pattern derived from `original_pattern` serving `stop_pattern`.
    pub fn get_or_create(
        &mut self,
        original_pattern: &Arc<TripPattern>,
        stop_pattern: StopPattern,
    ) -> Arc<TripPattern> {
        let key = (original_pattern.id().clone(), stop_pattern);
        if let Some(pattern) = self.patterns.get(&key) {
            return pattern.clone();
        }
        self.nb_of_created_patterns += 1;
        let original_id = original_pattern.id();
        let id = original_id.sibling(&format!(
            "{}:rt#{}",
            original_id.id(),
            self.nb_of_created_patterns
        ));
        let pattern = Arc::new(TripPattern::new_realtime_modified(
            id,
            original_pattern.clone(),
            key.1.clone(),
        ));
        debug!(
            "Created realtime pattern {} from pattern {}",
            pattern.id(),
            original_id
        );
        self.patterns.insert(key, pattern.clone());
        pattern
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PickDrop, Route};
    use crate::timetables::TimetableBuilder;

    fn pattern(name: &str) -> Arc<TripPattern> {
        let stop_pattern = StopPattern::from_stop_ids(
            ["A", "B", "C"].iter().map(|stop| FeedScopedId::new("F", stop)),
        );
        let timetable =
            TimetableBuilder::new(FeedScopedId::new("F", name), Arc::new(stop_pattern)).build();
        let route = Arc::new(Route::new(FeedScopedId::new("F", "R"), "R"));
        Arc::new(TripPattern::new(route, timetable))
    }

    #[test]
    fn same_skipped_stops_give_same_pattern() {
        let mut cache = TripPatternCache::new();
        let p1 = pattern("P1");
        let p2 = pattern("P2");

        let skip_b = cache.get_or_create(&p1, p1.stop_pattern().with_cancelled_stops(&[1]));
        let skip_b_again = cache.get_or_create(&p1, p1.stop_pattern().with_cancelled_stops(&[1]));
        assert!(Arc::ptr_eq(&skip_b, &skip_b_again));
        assert_eq!(skip_b.id(), &FeedScopedId::new("F", "P1:rt#1"));
        assert_eq!(skip_b.stop_pattern().entries()[1].pickup, PickDrop::Cancelled);
        assert!(skip_b.scheduled_timetable().is_empty());

        let skip_c = cache.get_or_create(&p1, p1.stop_pattern().with_cancelled_stops(&[2]));
        assert_eq!(skip_c.id(), &FeedScopedId::new("F", "P1:rt#2"));
        // same stops, other original pattern
        let other = cache.get_or_create(&p2, p2.stop_pattern().with_cancelled_stops(&[1]));
        assert_eq!(other.id(), &FeedScopedId::new("F", "P2:rt#3"));
        assert_eq!(cache.len(), 3);
    }
}
