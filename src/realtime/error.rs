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

use crate::model::FeedScopedId;
use crate::timetables::{TimetableValidationError, ValidationErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UpdateErrorType {
    InvalidInputStructure,
    TripNotFound,
    TripNotFoundInPattern,
    NoTripForCancellationFound,
    TooFewStops,
    InvalidStopSequence,
    InvalidArrivalTime,
    InvalidDepartureTime,
    NegativeDwellTime,
    NegativeHopTime,
    NotImplementedUnscheduled,
}

impl Display for UpdateErrorType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use UpdateErrorType::*;
        let name = match self {
            InvalidInputStructure => "invalid input structure",
            TripNotFound => "trip not found",
            TripNotFoundInPattern => "trip not found in pattern",
            NoTripForCancellationFound => "no trip found for cancellation",
            TooFewStops => "too few stops",
            InvalidStopSequence => "invalid stop sequence",
            InvalidArrivalTime => "invalid arrival time",
            InvalidDepartureTime => "invalid departure time",
            NegativeDwellTime => "negative dwell time",
            NegativeHopTime => "negative hop time",
            NotImplementedUnscheduled => "unscheduled trips are not handled",
        };
        write!(f, "{}", name)
    }
}

/// A realtime update that was rejected.
/// The state of the timetables is left unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateError {
    pub trip_id: Option<FeedScopedId>,
    pub error_type: UpdateErrorType,
    pub stop_idx: Option<usize>,
    pub producer: Option<String>,
}

impl UpdateError {
    pub fn new(trip_id: FeedScopedId, error_type: UpdateErrorType) -> Self {
        Self {
            trip_id: Some(trip_id),
            error_type,
            stop_idx: None,
            producer: None,
        }
    }

    pub fn at_stop(trip_id: FeedScopedId, error_type: UpdateErrorType, stop_idx: usize) -> Self {
        Self {
            stop_idx: Some(stop_idx),
            ..Self::new(trip_id, error_type)
        }
    }

    pub fn without_trip_id(error_type: UpdateErrorType) -> Self {
        Self {
            trip_id: None,
            error_type,
            stop_idx: None,
            producer: None,
        }
    }

    pub fn with_producer(mut self, producer: Option<String>) -> Self {
        self.producer = producer;
        self
    }
}

impl std::error::Error for UpdateError {}

impl Display for UpdateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.trip_id {
            Some(trip_id) => write!(f, "Update of trip {} rejected : {}", trip_id, self.error_type)?,
            None => write!(f, "Update rejected : {}", self.error_type)?,
        }
        if let Some(stop_idx) = self.stop_idx {
            write!(f, " at stop {}", stop_idx)?;
        }
        if let Some(producer) = &self.producer {
            write!(f, " (producer {})", producer)?;
        }
        Ok(())
    }
}

impl From<TimetableValidationError> for UpdateError {
    fn from(error: TimetableValidationError) -> Self {
        let error_type = match error.code {
            ValidationErrorCode::NegativeDwellTime => UpdateErrorType::NegativeDwellTime,
            ValidationErrorCode::NegativeHopTime => UpdateErrorType::NegativeHopTime,
        };
        UpdateError::at_stop(error.trip_id, error_type, error.stop_idx)
    }
}
