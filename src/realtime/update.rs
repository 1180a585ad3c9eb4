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
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::{UpdateError, UpdateErrorType};
use crate::model::{TripOnServiceDate, TripPattern};
use crate::timetables::TripTimes;

/// New times of one trip on one service date, ready to be stored
/// in a [`TimetableSnapshotBuffer`](super::TimetableSnapshotBuffer).
#[derive(Debug, Clone)]
pub struct RealTimeTripUpdate {
    pub pattern: Arc<TripPattern>,
    pub updated_trip_times: Arc<TripTimes>,
    pub service_date: NaiveDate,
    pub added_trip_on_service_date: Option<Arc<TripOnServiceDate>>,
    /// The trip does not exist in the schedule.
    pub trip_creation: bool,
    /// The route of the trip does not exist in the schedule.
    pub route_creation: bool,
    pub producer: Option<String>,
}

impl RealTimeTripUpdate {
    pub fn new(
        pattern: Arc<TripPattern>,
        updated_trip_times: Arc<TripTimes>,
        service_date: NaiveDate,
    ) -> Self {
        Self {
            pattern,
            updated_trip_times,
            service_date,
            added_trip_on_service_date: None,
            trip_creation: false,
            route_creation: false,
            producer: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpdateSuccess {
    pub producer: Option<String>,
}

impl UpdateSuccess {
    pub fn with_producer(producer: Option<String>) -> Self {
        Self { producer }
    }
}

/// Outcome of a batch of trip updates.
#[derive(Debug, Clone, Default)]
pub struct UpdateResult {
    pub successful: usize,
    pub failures: Vec<UpdateError>,
}

impl UpdateResult {
    pub fn from_results<Results>(results: Results) -> Self
    where
        Results: IntoIterator<Item = Result<UpdateSuccess, UpdateError>>,
    {
        let mut update_result = UpdateResult::default();
        for result in results {
            match result {
                Ok(_) => update_result.successful += 1,
                Err(err) => update_result.failures.push(err),
            }
        }
        update_result
    }

    pub fn nb_of_updates(&self) -> usize {
        self.successful + self.failures.len()
    }

    pub fn failures_by_type(&self) -> BTreeMap<UpdateErrorType, usize> {
        let mut result = BTreeMap::new();
        for failure in &self.failures {
            *result.entry(failure.error_type).or_insert(0) += 1;
        }
        result
    }

    pub fn log_summary(&self, feed_id: &str) {
        info!("Feed {} : {}", feed_id, self);
        for failure in &self.failures {
            debug!("Feed {} : {}", feed_id, failure);
        }
    }
}

impl Display for UpdateResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} trip updates applied",
            self.successful,
            self.nb_of_updates()
        )?;
        for (error_type, count) in self.failures_by_type() {
            write!(f, ", {} {}", count, error_type)?;
        }
        Ok(())
    }
}
