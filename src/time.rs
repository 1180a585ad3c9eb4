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

use chrono::{NaiveDate, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};

// Stop times are stored as seconds since the start of the service day,
// and accepted between -48:00:00 and 48:00:00
const MAX_SECONDS_SINCE_SERVICE_DAY_START: i64 = 48 * 60 * 60; // 48h

/// Unix timestamp of the start of the service day `date` in `timezone`.
///
/// The service day starts at "noon minus 12 hours", which is midnight
/// except on days with a daylight saving time change.
/// This corresponds to the "Time" notion found in gtfs stop_times.txt
pub fn service_day_start(date: NaiveDate, timezone: &Tz) -> Option<i64> {
    let noon = date.and_hms_opt(12, 0, 0)?;
    let local_noon = timezone.from_local_datetime(&noon).earliest()?;
    Some(local_noon.timestamp() - 12 * 60 * 60)
}

/// Converts a unix timestamp into seconds since `service_day_start`.
/// Returns None if the result is not within 48 hours of the service day start.
pub fn seconds_since_service_day_start(timestamp: i64, service_day_start: i64) -> Option<i32> {
    let seconds = timestamp.checked_sub(service_day_start)?;
    if seconds.abs() > MAX_SECONDS_SINCE_SERVICE_DAY_START {
        return None;
    }
    Some(seconds as i32)
}

/// Delays are accepted between -48:00:00 and 48:00:00.
pub fn is_valid_delay(delay: i32) -> bool {
    i64::from(delay).abs() <= MAX_SECONDS_SINCE_SERVICE_DAY_START
}

/// `time` shifted by `delay`, or None if the delay is out of bounds
/// or the result does not fit.
pub fn delayed_time(time: i32, delay: i32) -> Option<i32> {
    if !is_valid_delay(delay) {
        return None;
    }
    time.checked_add(delay)
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, PartialOrd, Ord)]
pub struct PositiveDuration {
    seconds: u32,
}

impl PositiveDuration {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> PositiveDuration {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        PositiveDuration {
            seconds: total_seconds,
        }
    }

    /// None if the duration does not fit in u32 seconds.
    pub fn checked_from_hms(hours: u32, minutes: u32, seconds: u32) -> Option<PositiveDuration> {
        let total_seconds = hours
            .checked_mul(60 * 60)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)?;
        Some(PositiveDuration {
            seconds: total_seconds,
        })
    }

    pub fn total_seconds(&self) -> u64 {
        self.seconds as u64
    }

    pub fn to_std(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.total_seconds())
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        if hours != 0 {
            write!(f, "{}h{:02}m{:02}s", hours, minutes, seconds)
        } else if minutes != 0 {
            write!(f, "{}m{:02}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositiveDurationError {
    input: String,
}

impl std::error::Error for PositiveDurationError {}

impl Display for PositiveDurationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Could not parse `{}` as a duration. Expected format is `hh:mm:ss`",
            self.input
        )
    }
}

impl std::str::FromStr for PositiveDuration {
    type Err = PositiveDurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || PositiveDurationError {
            input: s.to_string(),
        };
        let mut parts = s.split(':');
        let mut next_part = || -> Result<u32, PositiveDurationError> {
            parts
                .next()
                .and_then(|part| part.trim().parse::<u32>().ok())
                .ok_or_else(error)
        };
        let hours = next_part()?;
        let minutes = next_part()?;
        let seconds = next_part()?;
        if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
            return Err(error());
        }
        PositiveDuration::checked_from_hms(hours, minutes, seconds).ok_or_else(error)
    }
}

impl Serialize for PositiveDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let hours = self.seconds / (60 * 60);
        let minutes = (self.seconds % (60 * 60)) / 60;
        let seconds = self.seconds % 60;
        serializer.serialize_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds))
    }
}

impl<'de> Deserialize<'de> for PositiveDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
