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

use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::{parse_env_var, BackwardsDelayPropagationType};
use crate::PositiveDuration;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct TimetableSnapshotParams {
    /// how delays are applied to the stops before the first updated one
    pub backwards_delay_propagation_type: BackwardsDelayPropagationType,

    /// minimum duration between two publications of a new snapshot
    #[serde(default = "default_max_snapshot_frequency")]
    pub max_snapshot_frequency: PositiveDuration,

    /// remove realtime data of past service dates
    #[serde(default = "default_purge_expired_data")]
    pub purge_expired_data: bool,
}

pub fn default_max_snapshot_frequency() -> PositiveDuration {
    PositiveDuration::from_hms(0, 0, 1)
}

pub fn default_purge_expired_data() -> bool {
    true
}

impl TimetableSnapshotParams {
    pub fn new(backwards_delay_propagation_type: BackwardsDelayPropagationType) -> Self {
        Self {
            backwards_delay_propagation_type,
            max_snapshot_frequency: default_max_snapshot_frequency(),
            purge_expired_data: default_purge_expired_data(),
        }
    }

    pub fn new_from_env_vars() -> Result<Self, anyhow::Error> {
        let backwards_delay_propagation_type =
            std::env::var("RT_BACKWARDS_DELAY_PROPAGATION_TYPE")
                .context("Could not read mandatory env var RT_BACKWARDS_DELAY_PROPAGATION_TYPE")
                .and_then(|s| {
                    BackwardsDelayPropagationType::from_str(&s).with_context(|| {
                        format!(
                            "Could not parse env var RT_BACKWARDS_DELAY_PROPAGATION_TYPE `{}`",
                            s
                        )
                    })
                })?;

        let max_snapshot_frequency = parse_env_var(
            "RT_MAX_SNAPSHOT_FREQUENCY",
            default_max_snapshot_frequency(),
            PositiveDuration::from_str,
        );
        let purge_expired_data = parse_env_var(
            "RT_PURGE_EXPIRED_DATA",
            default_purge_expired_data(),
            bool::from_str,
        );

        Ok(Self {
            backwards_delay_propagation_type,
            max_snapshot_frequency,
            purge_expired_data,
        })
    }
}
