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
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use arc_swap::ArcSwap;
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::{debug, info};

use super::{
    RealTimeTransitDataUpdater, RealTimeTripUpdate, TimetableSnapshot, TimetableSnapshotBuffer,
    TripPatternCache, UpdateError, UpdateErrorType, UpdateResult, UpdateSuccess,
};
use crate::config::TimetableSnapshotParams;
use crate::model::{FeedScopedId, TripPattern};
use crate::timetables::{RealTimeState, TripScheduleRelationship, TripUpdate};

/// Gives the scheduled pattern of a trip.
pub trait ScheduledTripPatterns {
    fn pattern_for_trip(&self, trip_id: &FeedScopedId) -> Option<Arc<TripPattern>>;
}

impl ScheduledTripPatterns for HashMap<FeedScopedId, Arc<TripPattern>> {
    fn pattern_for_trip(&self, trip_id: &FeedScopedId) -> Option<Arc<TripPattern>> {
        self.get(trip_id).cloned()
    }
}

type LocalDateSupplier = Box<dyn Fn() -> NaiveDate + Send + Sync>;

struct Writer {
    buffer: TimetableSnapshotBuffer,
    pattern_cache: TripPatternCache,
    last_commit: Option<Instant>,
    last_purge_date: Option<NaiveDate>,
    transit_layer_updater: Option<Box<dyn RealTimeTransitDataUpdater>>,
}

/// Applies realtime trip updates and publishes timetable snapshots.
///
/// Updates are applied by a single writer at a time on an open buffer.
/// Readers get the last published snapshot without ever waiting for the writer.
pub struct TimetableSnapshotSource {
    writer: Mutex<Writer>,
    published: ArcSwap<TimetableSnapshot>,
    params: TimetableSnapshotParams,
    timezone: Tz,
    local_date_now: LocalDateSupplier,
}

impl TimetableSnapshotSource {
    pub fn new(params: TimetableSnapshotParams, timezone: Tz) -> Self {
        let local_date_now: LocalDateSupplier =
            Box::new(move || Utc::now().with_timezone(&timezone).naive_local().date());
        Self {
            writer: Mutex::new(Writer {
                buffer: TimetableSnapshotBuffer::new(),
                pattern_cache: TripPatternCache::new(),
                last_commit: None,
                last_purge_date: None,
                transit_layer_updater: None,
            }),
            published: ArcSwap::from_pointee(TimetableSnapshot::default()),
            params,
            timezone,
            local_date_now,
        }
    }

    /// Replaces the clock giving the current date in the feed timezone.
    pub fn with_local_date_supplier<F>(mut self, local_date_now: F) -> Self
    where
        F: Fn() -> NaiveDate + Send + Sync + 'static,
    {
        self.local_date_now = Box::new(local_date_now);
        self
    }

    pub fn with_transit_layer_updater<U>(self, updater: U) -> Self
    where
        U: RealTimeTransitDataUpdater + 'static,
    {
        self.lock_writer().transit_layer_updater = Some(Box::new(updater));
        self
    }

    pub fn params(&self) -> &TimetableSnapshotParams {
        &self.params
    }

    /// The last published snapshot.
    ///
    /// If the writer is idle and the buffer holds changes older than
    /// `max_snapshot_frequency`, they are published first.
    pub fn timetable_snapshot(&self) -> Arc<TimetableSnapshot> {
        if let Ok(mut writer) = self.writer.try_lock() {
            self.commit_timetable_snapshot(&mut writer, false);
        }
        self.published.load_full()
    }

    /// Applies `updates` from feed `feed_id`.
    ///
    /// With `full_dataset`, all realtime data of the feed is cleared first.
    pub fn apply_trip_updates(
        &self,
        patterns: &dyn ScheduledTripPatterns,
        full_dataset: bool,
        updates: &[TripUpdate],
        feed_id: &str,
    ) -> UpdateResult {
        let mut guard = self.lock_writer();
        let writer = &mut *guard;
        if full_dataset {
            writer.buffer.clear(feed_id);
        }
        debug!("Applying {} trip updates of feed {}", updates.len(), feed_id);

        let results = updates
            .iter()
            .map(|update| {
                self.apply_trip_update(writer, patterns, update, feed_id)
                    .map_err(|err| err.with_producer(update.producer.clone()))
            })
            .collect::<Vec<_>>();
        let update_result = UpdateResult::from_results(results);
        update_result.log_summary(feed_id);

        self.purge_and_commit(writer, false);
        update_result
    }

    /// Publishes pending changes now.
    pub fn flush_buffer(&self) {
        let mut guard = self.lock_writer();
        let writer = &mut *guard;
        let force = writer.buffer.is_dirty();
        self.purge_and_commit(writer, force);
    }

    /// Removes all realtime data of `feed_id`, and publishes the result.
    /// Returns true if something was removed.
    pub fn clear(&self, feed_id: &str) -> bool {
        let mut guard = self.lock_writer();
        let writer = &mut *guard;
        let modified = writer.buffer.clear(feed_id);
        if modified {
            self.commit_timetable_snapshot(writer, true);
        }
        modified
    }

    fn lock_writer(&self) -> MutexGuard<'_, Writer> {
        self.writer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn apply_trip_update(
        &self,
        writer: &mut Writer,
        patterns: &dyn ScheduledTripPatterns,
        update: &TripUpdate,
        feed_id: &str,
    ) -> Result<UpdateSuccess, UpdateError> {
        let trip_id = match update.trip_id.as_deref() {
            Some(trip_id) => FeedScopedId::new(feed_id, trip_id),
            None => {
                debug!("Feed {} : trip update without trip id", feed_id);
                return Err(UpdateError::without_trip_id(
                    UpdateErrorType::InvalidInputStructure,
                ));
            }
        };
        let service_date = update
            .start_date
            .unwrap_or_else(|| (self.local_date_now)());

        if let TripScheduleRelationship::Added | TripScheduleRelationship::Unscheduled =
            update.schedule_relationship
        {
            return Err(UpdateError::new(
                trip_id,
                UpdateErrorType::NotImplementedUnscheduled,
            ));
        }

        // each message describes the whole trip, and replaces the previous ones
        writer
            .buffer
            .revert_trip_to_scheduled_trip_pattern(&trip_id, service_date);

        let pattern = patterns.pattern_for_trip(&trip_id).ok_or_else(|| {
            debug!("Trip {} not found in the schedule", trip_id);
            UpdateError::new(trip_id.clone(), UpdateErrorType::TripNotFound)
        })?;

        match update.schedule_relationship {
            TripScheduleRelationship::Canceled => self.cancel_scheduled_trip(
                writer,
                &pattern,
                &trip_id,
                service_date,
                RealTimeState::Canceled,
            ),
            TripScheduleRelationship::Deleted => self.cancel_scheduled_trip(
                writer,
                &pattern,
                &trip_id,
                service_date,
                RealTimeState::Deleted,
            ),
            _ => self.handle_scheduled_trip(writer, pattern, &trip_id, update, service_date),
        }
    }

    fn handle_scheduled_trip(
        &self,
        writer: &mut Writer,
        pattern: Arc<TripPattern>,
        trip_id: &FeedScopedId,
        update: &TripUpdate,
        service_date: NaiveDate,
    ) -> Result<UpdateSuccess, UpdateError> {
        let timetable = writer.buffer.resolve(&pattern, service_date);
        let patch = timetable.create_updated_trip_times(
            update,
            &self.timezone,
            service_date,
            self.params.backwards_delay_propagation_type,
        )?;

        if patch.skipped_stop_indices.is_empty() {
            let rt_update = RealTimeTripUpdate {
                producer: update.producer.clone(),
                ..RealTimeTripUpdate::new(pattern, patch.trip_times, service_date)
            };
            return Ok(writer.buffer.update(rt_update));
        }

        // the trip no longer serves some stops : it moves to a pattern
        // where these stops are cancelled
        let stop_pattern = pattern
            .stop_pattern()
            .with_cancelled_stops(&patch.skipped_stop_indices);
        let new_pattern = writer.pattern_cache.get_or_create(&pattern, stop_pattern);
        self.cancel_scheduled_trip(
            writer,
            &pattern,
            trip_id,
            service_date,
            RealTimeState::Deleted,
        )?;
        let mut trip_times = patch.trip_times.copy();
        trip_times.set_real_time_state(RealTimeState::Modified);
        let rt_update = RealTimeTripUpdate {
            producer: update.producer.clone(),
            ..RealTimeTripUpdate::new(new_pattern, Arc::new(trip_times.freeze()), service_date)
        };
        Ok(writer.buffer.update(rt_update))
    }

    fn cancel_scheduled_trip(
        &self,
        writer: &mut Writer,
        pattern: &Arc<TripPattern>,
        trip_id: &FeedScopedId,
        service_date: NaiveDate,
        state: RealTimeState,
    ) -> Result<UpdateSuccess, UpdateError> {
        let timetable = writer.buffer.resolve(pattern, service_date);
        let trip_times = timetable.trip_times_for(trip_id).ok_or_else(|| {
            debug!(
                "Trip {} to cancel not found in pattern {}",
                trip_id,
                pattern.id()
            );
            UpdateError::new(trip_id.clone(), UpdateErrorType::NoTripForCancellationFound)
        })?;
        let mut new_times = trip_times.copy_scheduled_times();
        match state {
            RealTimeState::Deleted => new_times.delete_trip(),
            _ => new_times.cancel_trip(),
        }
        let rt_update =
            RealTimeTripUpdate::new(pattern.clone(), Arc::new(new_times.freeze()), service_date);
        Ok(writer.buffer.update(rt_update))
    }

    fn purge_and_commit(&self, writer: &mut Writer, force: bool) {
        let purged = self.params.purge_expired_data && self.purge_expired_data(writer);
        self.commit_timetable_snapshot(writer, force || purged);
    }

    // Data is kept two days after its service date, and purged once a day.
    fn purge_expired_data(&self, writer: &mut Writer) -> bool {
        let today = (self.local_date_now)();
        let previously = match today.pred_opt().and_then(|date| date.pred_opt()) {
            Some(date) => date,
            None => return false,
        };
        if writer
            .last_purge_date
            .map_or(false, |last_purge_date| last_purge_date >= previously)
        {
            return false;
        }
        info!("Purging realtime data of service dates up to {}", previously);
        writer.last_purge_date = Some(previously);
        writer.buffer.purge_expired_data(previously)
    }

    fn commit_timetable_snapshot(&self, writer: &mut Writer, force: bool) {
        let now = Instant::now();
        let frequency = self.params.max_snapshot_frequency.to_std();
        let due = writer
            .last_commit
            .map_or(true, |last_commit| now.duration_since(last_commit) >= frequency);
        if !force && !due {
            return;
        }
        if !force && !writer.buffer.is_dirty() {
            debug!("Buffer unchanged, keeping the published snapshot");
            return;
        }
        let updater = writer
            .transit_layer_updater
            .as_mut()
            .map(|updater| updater.as_mut() as &mut dyn RealTimeTransitDataUpdater);
        if let Some(snapshot) = writer.buffer.commit(updater, force) {
            self.published.store(snapshot);
            writer.last_commit = Some(now);
        }
    }
}

static_assertions::assert_impl_all!(TimetableSnapshotSource: Send, Sync);
