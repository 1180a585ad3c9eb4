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

#![allow(dead_code)]
pub mod network_builder;

use std::sync::Arc;

use realtime_timetables::chrono::NaiveDate;
use realtime_timetables::logger::init_test_logger;
use realtime_timetables::model::FeedScopedId;
use realtime_timetables::timetables::{RealTimeState, Timetable, TripTimes};
use realtime_timetables::tracing::dispatcher::DefaultGuard;

pub const FEED: &str = "F";

#[must_use]
pub fn init_logger() -> DefaultGuard {
    init_test_logger()
}

pub fn date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap()
}

pub fn id(name: &str) -> FeedScopedId {
    FeedScopedId::new(FEED, name)
}

/// (arrival, departure) at each stop
pub fn times(trip_times: &TripTimes) -> Vec<(i32, i32)> {
    (0..trip_times.nb_of_stops())
        .map(|idx| (trip_times.arrival_time(idx), trip_times.departure_time(idx)))
        .collect()
}

/// Times of `trip`, looked up in the feed of the timetable's pattern.
pub fn trip_times_in<'a>(timetable: &'a Timetable, trip: &str) -> &'a Arc<TripTimes> {
    let trip_id = FeedScopedId::new(timetable.pattern_id().feed_id(), trip);
    timetable
        .trip_times_for(&trip_id)
        .unwrap_or_else(|| panic!("trip {} not found in timetable", trip))
}

/// Realtime times of `trip_times`, with `delay` applied at every stop.
pub fn delayed(trip_times: &TripTimes, delay: i32) -> Arc<TripTimes> {
    let mut new_times = trip_times.copy_scheduled_times();
    for stop_idx in 0..new_times.nb_of_stops() {
        new_times.update_arrival_delay(stop_idx, delay);
        new_times.update_departure_delay(stop_idx, delay);
    }
    new_times.set_real_time_state(RealTimeState::Updated);
    Arc::new(new_times.freeze())
}
