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

use serde::{Deserialize, Serialize};

/// How the delay of the first updated stop of a trip is applied
/// to the stops before it.
///
/// No default is provided: the policy must be chosen explicitly.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BackwardsDelayPropagationType {
    /// Previous stops keep their scheduled times.
    None,
    /// Delay is propagated only if the times would otherwise be decreasing,
    /// and the previous stops are flagged as having no realtime data.
    RequiredNoData,
    /// Delay is propagated only if the times would otherwise be decreasing.
    Required,
    /// Delay is always propagated.
    Always,
}

impl std::str::FromStr for BackwardsDelayPropagationType {
    type Err = BackwardsDelayPropagationTypeConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let propagation_type = match s {
            "none" => BackwardsDelayPropagationType::None,
            "required_no_data" => BackwardsDelayPropagationType::RequiredNoData,
            "required" => BackwardsDelayPropagationType::Required,
            "always" => BackwardsDelayPropagationType::Always,
            _ => {
                return Err(BackwardsDelayPropagationTypeConfigError {
                    propagation_type_name: s.to_string(),
                })
            }
        };
        Ok(propagation_type)
    }
}

impl std::fmt::Display for BackwardsDelayPropagationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackwardsDelayPropagationType::None => write!(f, "none"),
            BackwardsDelayPropagationType::RequiredNoData => write!(f, "required_no_data"),
            BackwardsDelayPropagationType::Required => write!(f, "required"),
            BackwardsDelayPropagationType::Always => write!(f, "always"),
        }
    }
}

#[derive(Debug)]
pub struct BackwardsDelayPropagationTypeConfigError {
    propagation_type_name: String,
}

impl std::error::Error for BackwardsDelayPropagationTypeConfigError {}

impl std::fmt::Display for BackwardsDelayPropagationTypeConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bad backwards delay propagation type : `{}`",
            self.propagation_type_name
        )
    }
}
