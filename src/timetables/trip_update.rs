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

//! Realtime message for one trip, as handed over by the feed decoder.

use chrono::NaiveDate;
use std::sync::Arc;

use super::TripTimes;
use crate::model::Accessibility;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleRelationship {
    Scheduled,
    Skipped,
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TripScheduleRelationship {
    Scheduled,
    Canceled,
    Deleted,
    Added,
    Unscheduled,
}

/// Arrival or departure at a stop, given as a delay in seconds,
/// or as a unix timestamp, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StopTimeEvent {
    pub delay: Option<i32>,
    pub time: Option<i64>,
}

impl StopTimeEvent {
    pub fn delay(delay: i32) -> Self {
        Self {
            delay: Some(delay),
            time: None,
        }
    }

    pub fn time(time: i64) -> Self {
        Self {
            delay: None,
            time: Some(time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopTimeUpdate {
    pub stop_sequence: Option<u32>,
    pub stop_id: Option<String>,
    pub schedule_relationship: ScheduleRelationship,
    pub arrival: Option<StopTimeEvent>,
    pub departure: Option<StopTimeEvent>,
    /// The times were observed, not predicted.
    pub recorded: bool,
}

impl StopTimeUpdate {
    pub fn for_stop_sequence(stop_sequence: u32) -> Self {
        Self {
            stop_sequence: Some(stop_sequence),
            stop_id: None,
            schedule_relationship: ScheduleRelationship::Scheduled,
            arrival: None,
            departure: None,
            recorded: false,
        }
    }

    pub fn for_stop_id(stop_id: &str) -> Self {
        Self {
            stop_sequence: None,
            stop_id: Some(stop_id.to_string()),
            schedule_relationship: ScheduleRelationship::Scheduled,
            arrival: None,
            departure: None,
            recorded: false,
        }
    }

    pub fn arrival(mut self, event: StopTimeEvent) -> Self {
        self.arrival = Some(event);
        self
    }

    pub fn departure(mut self, event: StopTimeEvent) -> Self {
        self.departure = Some(event);
        self
    }

    pub fn skipped(mut self) -> Self {
        self.schedule_relationship = ScheduleRelationship::Skipped;
        self
    }

    pub fn no_data(mut self) -> Self {
        self.schedule_relationship = ScheduleRelationship::NoData;
        self
    }

    pub fn recorded(mut self) -> Self {
        self.recorded = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripUpdate {
    pub trip_id: Option<String>,
    /// Service date of the trip. Defaults to the current date of the feed timezone.
    pub start_date: Option<NaiveDate>,
    pub schedule_relationship: TripScheduleRelationship,
    pub stop_time_updates: Vec<StopTimeUpdate>,
    pub wheelchair_accessibility: Option<Accessibility>,
    /// Source of the update, reported with its outcome.
    pub producer: Option<String>,
}

impl TripUpdate {
    pub fn new(trip_id: &str) -> Self {
        Self {
            trip_id: Some(trip_id.to_string()),
            start_date: None,
            schedule_relationship: TripScheduleRelationship::Scheduled,
            stop_time_updates: Vec::new(),
            wheelchair_accessibility: None,
            producer: None,
        }
    }

    pub fn on_date(mut self, start_date: NaiveDate) -> Self {
        self.start_date = Some(start_date);
        self
    }

    pub fn with_relationship(mut self, schedule_relationship: TripScheduleRelationship) -> Self {
        self.schedule_relationship = schedule_relationship;
        self
    }

    pub fn stop_time_update(mut self, stop_time_update: StopTimeUpdate) -> Self {
        self.stop_time_updates.push(stop_time_update);
        self
    }

    pub fn with_wheelchair_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.wheelchair_accessibility = Some(accessibility);
        self
    }

    pub fn with_producer(mut self, producer: &str) -> Self {
        self.producer = Some(producer.to_string());
        self
    }
}

/// Result of patching a trip: its new times, and the stops it no longer serves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripTimesPatch {
    pub trip_times: Arc<TripTimes>,
    pub skipped_stop_indices: Vec<usize>,
}
