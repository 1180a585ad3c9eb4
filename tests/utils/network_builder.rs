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

use realtime_timetables::model::{
    FeedScopedId, Route, StopPattern, Trip, TripPattern,
};
use realtime_timetables::timetables::{
    ScheduledStopTime, ScheduledTripTimes, TimetableBuilder, TripTimes,
};

use super::FEED;

const DEFAULT_ROUTE_ID: &str = "default_route";

/// Patterns and trips of a test network.
pub struct Network {
    pub patterns: HashMap<String, Arc<TripPattern>>,
    /// scheduled pattern of each trip
    pub trip_patterns: HashMap<FeedScopedId, Arc<TripPattern>>,
}

impl Network {
    pub fn pattern(&self, name: &str) -> &Arc<TripPattern> {
        self.patterns
            .get(name)
            .unwrap_or_else(|| panic!("no pattern named {}", name))
    }
}

/// Builder used to easily create a `Network`
///
/// ```ignore
/// let network = NetworkBuilder::new()
///     .pattern("P1", &["A", "B", "C"], |pattern| {
///         pattern
///             .trip("t1", &[(100, 110), (200, 210), (300, 310)])
///             .trip("t2", &[(400, 410), (500, 510), (600, 610)]);
///     })
///     .build();
/// ```
pub struct NetworkBuilder {
    feed_id: String,
    patterns: Vec<(String, Vec<String>, String, Vec<ScheduledTripTimes>)>,
}

pub struct PatternBuilder<'a> {
    feed_id: &'a str,
    route_id: &'a mut String,
    trips: &'a mut Vec<ScheduledTripTimes>,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self::with_feed(FEED)
    }

    pub fn with_feed(feed_id: &str) -> Self {
        Self {
            feed_id: feed_id.to_string(),
            patterns: Vec::new(),
        }
    }

    pub fn pattern<F>(mut self, name: &str, stops: &[&str], mut pattern_initer: F) -> Self
    where
        F: FnMut(PatternBuilder),
    {
        let mut route_id = DEFAULT_ROUTE_ID.to_string();
        let mut trips = Vec::new();
        pattern_initer(PatternBuilder {
            feed_id: &self.feed_id,
            route_id: &mut route_id,
            trips: &mut trips,
        });
        let stops = stops.iter().map(|stop| stop.to_string()).collect();
        self.patterns
            .push((name.to_string(), stops, route_id, trips));
        self
    }

    pub fn build(self) -> Network {
        let mut patterns = HashMap::new();
        let mut trip_patterns = HashMap::new();
        let NetworkBuilder { feed_id, patterns: built_patterns } = self;
        let feed_id = feed_id.as_str();
        for (name, stops, route_id, trips) in built_patterns {
            let pattern_id = FeedScopedId::new(feed_id, &name);
            let stop_pattern = StopPattern::from_stop_ids(
                stops.iter().map(|stop| FeedScopedId::new(feed_id, stop)),
            );
            let route = Arc::new(Route::new(
                FeedScopedId::new(feed_id, &route_id),
                &route_id,
            ));
            let mut builder = TimetableBuilder::new(pattern_id, Arc::new(stop_pattern));
            let trip_ids: Vec<FeedScopedId> =
                trips.iter().map(|trip| trip.trip().id.clone()).collect();
            for trip in trips {
                let trip_times = TripTimes::from_scheduled(Arc::new(trip));
                builder = builder
                    .add_trip_times(Arc::new(trip_times))
                    .unwrap_or_else(|err| panic!("{}", err));
            }
            let pattern = Arc::new(TripPattern::new(route, builder.build()));
            for trip_id in trip_ids {
                trip_patterns.insert(trip_id, pattern.clone());
            }
            patterns.insert(name, pattern);
        }
        Network {
            patterns,
            trip_patterns,
        }
    }
}

impl<'a> PatternBuilder<'a> {
    pub fn route(self, route_id: &str) -> Self {
        *self.route_id = route_id.to_string();
        self
    }

    /// A trip with (arrival, departure) times at each stop, in seconds.
    /// Stop sequences are 1, 2, 3...
    pub fn trip(self, name: &str, times: &[(i32, i32)]) -> Self {
        self.add_trip(name, times, false)
    }

    /// A trip whose stops are all timepoints.
    pub fn timepoint_trip(self, name: &str, times: &[(i32, i32)]) -> Self {
        self.add_trip(name, times, true)
    }

    fn add_trip(self, name: &str, times: &[(i32, i32)], timepoint: bool) -> Self {
        let trip = Arc::new(Trip::new(
            FeedScopedId::new(self.feed_id, name),
            FeedScopedId::new(self.feed_id, self.route_id.as_str()),
        ));
        let stop_times = times
            .iter()
            .enumerate()
            .map(|(idx, &(arrival_time, departure_time))| ScheduledStopTime {
                stop_sequence: idx as u32 + 1,
                arrival_time,
                departure_time,
                timepoint,
            });
        self.trips.push(ScheduledTripTimes::new(trip, stop_times));
        self
    }
}
