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

mod utils;

use realtime_timetables::chrono_tz;
use realtime_timetables::config::BackwardsDelayPropagationType;
use realtime_timetables::model::Accessibility;
use realtime_timetables::realtime::{UpdateError, UpdateErrorType};
use realtime_timetables::time::service_day_start;
use realtime_timetables::timetables::{
    RealTimeState, StopTimeEvent, StopTimeUpdate, TripTimesPatch, TripUpdate,
};
use utils::network_builder::{Network, NetworkBuilder};
use utils::{date, id, times, trip_times_in};

use rstest::rstest;

const SERVICE_DATE: &str = "2021-06-15";

fn network() -> Network {
    NetworkBuilder::new()
        .pattern("P1", &["A", "B", "C"], |pattern| {
            pattern
                .trip("t1", &[(100, 110), (200, 210), (300, 310)])
                .timepoint_trip("tp", &[(100, 110), (200, 210), (300, 310)]);
        })
        .pattern("P4", &["A", "B", "C", "D"], |pattern| {
            pattern.trip("t4", &[(0, 0), (100, 100), (200, 200), (300, 300)]);
        })
        .build()
}

fn apply(
    network: &Network,
    pattern: &str,
    update: &TripUpdate,
    backwards_delay_propagation_type: BackwardsDelayPropagationType,
) -> Result<TripTimesPatch, UpdateError> {
    network
        .pattern(pattern)
        .scheduled_timetable()
        .create_updated_trip_times(
            update,
            &chrono_tz::UTC,
            date(SERVICE_DATE),
            backwards_delay_propagation_type,
        )
}

// unix timestamp of `seconds` after the start of the service day
fn timestamp(seconds: i64) -> i64 {
    service_day_start(date(SERVICE_DATE), &chrono_tz::UTC).unwrap() + seconds
}

fn error_type(result: Result<TripTimesPatch, UpdateError>) -> UpdateErrorType {
    match result {
        Ok(patch) => panic!("update should be rejected, got {:?}", patch),
        Err(err) => err.error_type,
    }
}

#[test]
fn late_arrival_is_propagated_to_next_stops() -> Result<(), UpdateError> {
    let _log_guard = utils::init_logger();
    let network = network();
    let update = TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent::delay(60)));

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None)?;

    assert_eq!(
        times(&patch.trip_times),
        vec![(100, 110), (260, 260), (360, 370)]
    );
    assert!(patch.skipped_stop_indices.is_empty());
    assert_eq!(patch.trip_times.real_time_state(), RealTimeState::Updated);
    assert_eq!(patch.trip_times.arrival_delay(2), 60);
    Ok(())
}

#[test]
fn skipped_stop_without_known_delay() -> Result<(), UpdateError> {
    let _log_guard = utils::init_logger();
    let network = network();
    let update =
        TripUpdate::new("t1").stop_time_update(StopTimeUpdate::for_stop_sequence(2).skipped());

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None)?;

    assert_eq!(patch.skipped_stop_indices, vec![1]);
    assert!(patch.trip_times.is_cancelled_stop(1));
    assert!(!patch.trip_times.is_cancelled_stop(2));
    assert_eq!(
        times(&patch.trip_times),
        vec![(100, 110), (200, 210), (300, 310)]
    );
    Ok(())
}

#[test]
fn skipped_stop_times_are_interpolated() -> Result<(), UpdateError> {
    let _log_guard = utils::init_logger();
    let network = network();
    let update = TripUpdate::new("t4")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(3).skipped())
        .stop_time_update(StopTimeUpdate::for_stop_sequence(4).arrival(StopTimeEvent::delay(120)));

    let patch = apply(&network, "P4", &update, BackwardsDelayPropagationType::None)?;

    assert_eq!(patch.skipped_stop_indices, vec![2]);
    assert_eq!(
        times(&patch.trip_times),
        vec![(0, 0), (100, 100), (260, 260), (420, 420)]
    );
    Ok(())
}

#[test]
fn scheduled_timetable_is_never_modified() -> Result<(), UpdateError> {
    let network = network();
    let update = TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(1).arrival(StopTimeEvent::delay(30)))
        .with_wheelchair_accessibility(Accessibility::NotPossible);

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::Always)?;

    assert_eq!(
        patch.trip_times.wheelchair_accessibility(),
        Accessibility::NotPossible
    );
    let scheduled = trip_times_in(network.pattern("P1").scheduled_timetable(), "t1");
    assert!(scheduled.is_scheduled());
    assert_eq!(
        scheduled.wheelchair_accessibility(),
        Accessibility::NoInformation
    );
    assert_eq!(times(scheduled), vec![(100, 110), (200, 210), (300, 310)]);
    Ok(())
}

#[test]
fn stop_matched_by_stop_id() -> Result<(), UpdateError> {
    let network = network();
    let update = TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_id("B").arrival(StopTimeEvent::delay(30)));

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None)?;

    assert_eq!(
        times(&patch.trip_times),
        vec![(100, 110), (230, 230), (330, 340)]
    );
    Ok(())
}

#[test]
fn departure_only_update() -> Result<(), UpdateError> {
    let network = network();
    let update = TripUpdate::new("t1").stop_time_update(
        StopTimeUpdate::for_stop_sequence(2).departure(StopTimeEvent::delay(30)),
    );

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None)?;

    assert_eq!(
        times(&patch.trip_times),
        vec![(100, 110), (200, 240), (330, 340)]
    );
    Ok(())
}

#[test]
fn departure_only_update_clamps_arrival() -> Result<(), UpdateError> {
    let network = network();
    let update = TripUpdate::new("t1")
        .stop_time_update(
            StopTimeUpdate::for_stop_sequence(1)
                .arrival(StopTimeEvent::delay(100))
                .departure(StopTimeEvent::delay(100)),
        )
        .stop_time_update(
            StopTimeUpdate::for_stop_sequence(2).departure(StopTimeEvent::delay(5)),
        );

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None)?;

    // the previous delay would make the vehicle arrive at 300, after its departure
    assert_eq!(
        times(&patch.trip_times),
        vec![(200, 210), (215, 215), (305, 315)]
    );
    Ok(())
}

#[rstest]
#[case("t1", vec![(100, 110), (180, 190), (280, 290)])]
#[case("tp", vec![(100, 110), (180, 210), (300, 310)])]
fn early_arrival(#[case] trip: &str, #[case] expected_times: Vec<(i32, i32)>) {
    let network = network();
    let update = TripUpdate::new(trip)
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent::delay(-20)));

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None).unwrap();

    assert_eq!(times(&patch.trip_times), expected_times);
}

#[test]
fn no_data_resets_delay() -> Result<(), UpdateError> {
    let network = network();
    let update = TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(1).arrival(StopTimeEvent::delay(60)))
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).no_data());

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None)?;

    assert_eq!(
        times(&patch.trip_times),
        vec![(160, 160), (200, 210), (300, 310)]
    );
    assert!(patch.trip_times.is_no_data_stop(1));
    assert!(!patch.trip_times.is_no_data_stop(2));
    Ok(())
}

#[test]
fn absolute_time_sets_time_and_delay_is_carried() -> Result<(), UpdateError> {
    let network = network();
    let arrival = StopTimeEvent {
        delay: Some(60),
        time: Some(timestamp(250)),
    };
    let update = TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).arrival(arrival));

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None)?;

    assert_eq!(
        times(&patch.trip_times),
        vec![(100, 110), (250, 250), (360, 370)]
    );
    Ok(())
}

// the vehicle arrives at the second stop at 105, before its scheduled departure
// from the first stop at 110
#[rstest]
#[case(BackwardsDelayPropagationType::None, None)]
#[case(BackwardsDelayPropagationType::RequiredNoData, Some(((5, 15), true)))]
#[case(BackwardsDelayPropagationType::Required, Some(((5, 15), false)))]
#[case(BackwardsDelayPropagationType::Always, Some(((5, 15), false)))]
fn backwards_propagation_of_early_arrival(
    #[case] backwards_delay_propagation_type: BackwardsDelayPropagationType,
    #[case] expected_first_stop: Option<((i32, i32), bool)>,
) {
    let _log_guard = utils::init_logger();
    let network = network();
    let update = TripUpdate::new("t1").stop_time_update(
        StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent::time(timestamp(105))),
    );

    let result = apply(&network, "P1", &update, backwards_delay_propagation_type);

    match expected_first_stop {
        None => {
            let err = result.unwrap_err();
            assert_eq!(err.error_type, UpdateErrorType::NegativeHopTime);
            assert_eq!(err.stop_idx, Some(1));
            assert_eq!(err.trip_id, Some(id("t1")));
        }
        Some((expected_times, no_data)) => {
            let patch = result.unwrap();
            assert_eq!(times(&patch.trip_times)[0], expected_times);
            assert_eq!(patch.trip_times.is_no_data_stop(0), no_data);
            assert_eq!(
                times(&patch.trip_times)[1..],
                [(105, 115), (205, 215)]
            );
        }
    }
}

// the vehicle arrives at the third stop at 105, before the scheduled departure
// from the first stop, and the stop in between has no time of its own
#[rstest]
#[case(StopTimeUpdate::for_stop_sequence(2).skipped(), BackwardsDelayPropagationType::Required)]
#[case(StopTimeUpdate::for_stop_sequence(2).skipped(), BackwardsDelayPropagationType::Always)]
#[case(
    StopTimeUpdate::for_stop_sequence(2).skipped(),
    BackwardsDelayPropagationType::RequiredNoData
)]
#[case(StopTimeUpdate::for_stop_sequence(2).no_data(), BackwardsDelayPropagationType::Required)]
#[case(StopTimeUpdate::for_stop_sequence(2).no_data(), BackwardsDelayPropagationType::Always)]
#[case(
    StopTimeUpdate::for_stop_sequence(2).no_data(),
    BackwardsDelayPropagationType::RequiredNoData
)]
fn backwards_propagation_starts_at_first_stop_with_a_time(
    #[case] first_update: StopTimeUpdate,
    #[case] backwards_delay_propagation_type: BackwardsDelayPropagationType,
) {
    let _log_guard = utils::init_logger();
    let network = network();
    let update = TripUpdate::new("t1")
        .stop_time_update(first_update)
        .stop_time_update(
            StopTimeUpdate::for_stop_sequence(3).arrival(StopTimeEvent::time(timestamp(105))),
        );

    let patch = apply(&network, "P1", &update, backwards_delay_propagation_type)
        .expect("the early arrival should be propagated to the first stops");

    assert_eq!(
        times(&patch.trip_times),
        vec![(-95, -85), (5, 15), (105, 115)]
    );
    assert_eq!(patch.trip_times.arrival_delay(0), -195);
    assert_eq!(
        patch.trip_times.is_no_data_stop(0),
        backwards_delay_propagation_type == BackwardsDelayPropagationType::RequiredNoData
    );

    let without_propagation =
        apply(&network, "P1", &update, BackwardsDelayPropagationType::None).unwrap_err();
    assert_eq!(
        without_propagation.error_type,
        UpdateErrorType::NegativeHopTime
    );
    assert_eq!(without_propagation.stop_idx, Some(2));
}

#[test]
fn recorded_stops_are_flagged() -> Result<(), UpdateError> {
    let network = network();
    let update = TripUpdate::new("t1")
        .stop_time_update(
            StopTimeUpdate::for_stop_sequence(1)
                .departure(StopTimeEvent::delay(20))
                .recorded(),
        )
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent::delay(20)));

    let patch = apply(&network, "P1", &update, BackwardsDelayPropagationType::None)?;

    assert!(patch.trip_times.is_recorded_stop(0));
    assert!(!patch.trip_times.is_recorded_stop(1));
    assert_eq!(
        times(&patch.trip_times),
        vec![(100, 130), (220, 220), (320, 330)]
    );
    Ok(())
}

#[rstest]
#[case(BackwardsDelayPropagationType::None, (100, 110))]
#[case(BackwardsDelayPropagationType::RequiredNoData, (100, 110))]
#[case(BackwardsDelayPropagationType::Required, (100, 110))]
#[case(BackwardsDelayPropagationType::Always, (160, 170))]
fn backwards_propagation_of_late_arrival(
    #[case] backwards_delay_propagation_type: BackwardsDelayPropagationType,
    #[case] expected_first_stop: (i32, i32),
) {
    let network = network();
    let update = TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent::delay(60)));

    let patch = apply(&network, "P1", &update, backwards_delay_propagation_type).unwrap();

    assert_eq!(times(&patch.trip_times)[0], expected_first_stop);
    assert!(!patch.trip_times.is_no_data_stop(0));
}

#[test]
fn negative_dwell_time_is_rejected() {
    let network = network();
    let update = TripUpdate::new("t1").stop_time_update(
        StopTimeUpdate::for_stop_sequence(2)
            .arrival(StopTimeEvent::delay(0))
            .departure(StopTimeEvent::time(timestamp(150))),
    );

    let err = apply(&network, "P1", &update, BackwardsDelayPropagationType::None).unwrap_err();

    assert_eq!(err.error_type, UpdateErrorType::NegativeDwellTime);
    assert_eq!(err.stop_idx, Some(1));
}

#[rstest]
#[case(TripUpdate::new("unknown"), UpdateErrorType::TripNotFoundInPattern)]
#[case(
    TripUpdate { trip_id: None, ..TripUpdate::new("t1") },
    UpdateErrorType::TripNotFound
)]
#[case(TripUpdate::new("t1"), UpdateErrorType::TooFewStops)]
#[case(
    TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(3).arrival(StopTimeEvent::delay(10)))
        .stop_time_update(StopTimeUpdate::for_stop_sequence(1).arrival(StopTimeEvent::delay(10))),
    UpdateErrorType::InvalidStopSequence
)]
#[case(
    TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_id("Z").arrival(StopTimeEvent::delay(10))),
    UpdateErrorType::InvalidStopSequence
)]
#[case(
    TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent::default())),
    UpdateErrorType::InvalidArrivalTime
)]
#[case(
    TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).departure(StopTimeEvent::time(0))),
    UpdateErrorType::InvalidDepartureTime
)]
#[case(
    TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent::delay(i32::MAX))),
    UpdateErrorType::InvalidArrivalTime
)]
#[case(
    TripUpdate::new("t1")
        .stop_time_update(StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent::delay(i32::MIN))),
    UpdateErrorType::InvalidArrivalTime
)]
#[case(
    TripUpdate::new("t1").stop_time_update(
        StopTimeUpdate::for_stop_sequence(2).departure(StopTimeEvent::delay(48 * 3600 + 1))
    ),
    UpdateErrorType::InvalidDepartureTime
)]
#[case(
    TripUpdate::new("t1").stop_time_update(
        StopTimeUpdate::for_stop_sequence(2).arrival(StopTimeEvent {
            delay: Some(i32::MAX),
            time: Some(timestamp(250)),
        })
    ),
    UpdateErrorType::InvalidArrivalTime
)]
fn invalid_updates_are_rejected(
    #[case] update: TripUpdate,
    #[case] expected_error_type: UpdateErrorType,
) {
    let _log_guard = utils::init_logger();
    let network = network();
    let result = apply(&network, "P1", &update, BackwardsDelayPropagationType::None);
    assert_eq!(error_type(result), expected_error_type);
}
