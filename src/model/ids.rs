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
use std::sync::Arc;

/// Identifier of an object of the network, scoped by the id of the feed
/// that produced it.
///
/// Ordering is by feed id, then by id. This ordering is used wherever a
/// deterministic iteration order is needed, for example when a timetable
/// sorts its trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeedScopedId {
    feed_id: Arc<str>,
    id: Arc<str>,
}

impl FeedScopedId {
    pub fn new(feed_id: &str, id: &str) -> Self {
        Self {
            feed_id: Arc::from(feed_id),
            id: Arc::from(id),
        }
    }

    pub fn feed_id(&self) -> &str {
        &self.feed_id
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Another id of the same feed.
    pub fn sibling(&self, id: &str) -> Self {
        Self {
            feed_id: self.feed_id.clone(),
            id: Arc::from(id),
        }
    }
}

impl Display for FeedScopedId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.feed_id, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedScopedIdError {
    input: String,
}

impl std::error::Error for FeedScopedIdError {}

impl Display for FeedScopedIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "`{}` is not a feed scoped id, expected `feed_id:id`",
            self.input
        )
    }
}

impl std::str::FromStr for FeedScopedId {
    type Err = FeedScopedIdError;

    // the feed id may not contain ':', the id may
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((feed_id, id)) if !feed_id.is_empty() && !id.is_empty() => {
                Ok(FeedScopedId::new(feed_id, id))
            }
            _ => Err(FeedScopedIdError {
                input: s.to_string(),
            }),
        }
    }
}
