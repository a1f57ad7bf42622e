//! Change detection and override behaviour of the router

mod common;

use common::*;
use tangible_router::{Coordinate, Lifecycle, ProxyState, RouterError, Snapshot, StateValue};

#[test]
fn first_seat_emits_point_at_adjusted_position() {
    let mut router = router();

    sensor(&mut router, 2, &format!("{},x", TILE5_ROW2_COL1));

    assert_eq!(router.sink().commands(), vec![point(6, 5)]);
    let proxy = router.proxy(2).unwrap();
    assert_eq!(proxy.position(), Some(Coordinate::new(6, 5)));
    assert!(proxy.is_plugged_in());
    assert!(!proxy.is_overridden());
    assert_eq!(proxy.state(), None);
    assert_eq!(
        router.snapshot(2),
        Some(Snapshot::Emitted {
            position: Some(Coordinate::new(6, 5)),
            state: None
        })
    );
}

#[test]
fn repeated_identical_update_emits_once() {
    let mut router = router();
    let payload = format!("{},1", TILE5_ROW2_COL1);

    sensor(&mut router, 2, &payload);
    sensor(&mut router, 2, &payload);
    sensor(&mut router, 2, &payload);

    assert_eq!(router.sink().commands(), vec![point(6, 5)]);
    assert_eq!(router.proxy(2).unwrap().state(), Some(StateValue::Active));
}

#[test]
fn state_only_change_pulses_self_path() {
    let mut router = router();
    sensor(&mut router, 2, &format!("{},0", TILE5_ROW2_COL1));
    router.sink().take();

    sensor(&mut router, 2, &format!("{},2", TILE5_ROW2_COL1));

    assert_eq!(router.sink().commands(), vec![path(6, 5, 6, 5)]);
    assert_eq!(router.snapshot(2).unwrap().state(), Some(StateValue::Alert));
}

#[test]
fn position_change_emits_new_point() {
    let mut router = router();
    sensor(&mut router, 1, &format!("{},0", TILE5_ROW2_COL1));
    sensor(&mut router, 1, &format!("{},0", TILE1_ROW4_COL4));

    assert_eq!(router.sink().commands(), vec![point(6, 5), point(4, 4)]);
}

#[test]
fn hub_state_change_draws_path_from_origin() {
    let mut router = router();
    sensor(&mut router, 0, &format!("{},0", TILE1_ROW4_COL4));
    sensor(&mut router, 2, &format!("{},0", TILE5_ROW2_COL1));
    router.sink().take();

    hub(&mut router, 2, "1");

    assert_eq!(router.sink().take(), vec![path(4, 4, 6, 5)]);
    assert_eq!(router.snapshot(2).unwrap().state(), Some(StateValue::Active));
    assert_eq!(router.proxy(2).unwrap().position(), Some(Coordinate::new(6, 5)));

    // Out of range state is dropped
    let result = router.process_message("hub_state_update_proxy_2", b"5");
    assert_eq!(result, Err(RouterError::InvalidState("5".into())));
    hub(&mut router, 2, "on");
    assert!(router.sink().commands().is_empty());
    assert_eq!(router.proxy(2).unwrap().state(), Some(StateValue::Active));

    // Same state again is a no-op
    hub(&mut router, 2, "1");
    assert!(router.sink().commands().is_empty());
}

#[test]
fn hub_state_for_unseated_proxy_refreshes_snapshot_without_emitting() {
    let mut router = router();

    hub(&mut router, 1, "2");

    assert!(router.sink().commands().is_empty());
    let proxy = router.proxy(1).unwrap();
    assert_eq!(proxy.lifecycle(), Lifecycle::SeenUnplugged);
    assert_eq!(
        router.snapshot(1),
        Some(Snapshot::Emitted {
            position: None,
            state: Some(StateValue::Alert)
        })
    );
}

#[test]
fn override_pins_position_and_emits_point() {
    let mut router = router();

    router.on_message("dashboardOverride", b"3,10,12");

    assert_eq!(router.sink().commands(), vec![point(10, 12)]);
    let proxy = router.proxy(3).unwrap();
    assert_eq!(proxy.position(), Some(Coordinate::new(10, 12)));
    assert!(proxy.is_plugged_in());
    assert!(proxy.is_overridden());
    assert_eq!(proxy.lifecycle(), Lifecycle::Overridden);
}

#[test]
fn override_suppresses_sensor_positions() {
    let mut router = router();
    sensor(&mut router, 3, &format!("{},0", TILE1_ROW4_COL4));
    router.on_message("dashboardOverride", b"3,10,12");
    router.sink().take();

    // Snapshot still holds (4, 4), so the pinned position differs: pinned cue
    sensor(&mut router, 3, &format!("{},1", TILE5_ROW2_COL1));
    assert_eq!(router.sink().take(), vec![path(10, 12, 10, 12)]);

    sensor(&mut router, 3, &format!("{},2", TILE1_ROW4_COL4));
    assert_eq!(router.sink().take(), vec![path(10, 12, 10, 12)]);

    sensor(&mut router, 3, &format!("{},2", TILE5_ROW2_COL1));
    assert!(router.sink().take().is_empty());

    let proxy = router.proxy(3).unwrap();
    assert_eq!(proxy.position(), Some(Coordinate::new(10, 12)));
    assert_eq!(proxy.state(), Some(StateValue::Alert));
    assert!(proxy.is_overridden());
}

#[test]
fn reseat_clears_override() {
    let mut router = router();
    router.on_message("dashboardOverride", b"1,10,12");
    router.sink().take();

    sensor(&mut router, 1, &format!("{},x", TILE5_ROW2_COL1));

    let proxy = router.proxy(1).unwrap();
    assert!(!proxy.is_overridden());
    assert_eq!(proxy.position(), Some(Coordinate::new(6, 5)));
    assert_eq!(router.sink().commands(), vec![point(6, 5)]);

    // Sensor positions apply again
    sensor(&mut router, 1, &format!("{},0", TILE1_ROW4_COL4));
    assert_eq!(router.proxy(1).unwrap().position(), Some(Coordinate::new(4, 4)));
}

#[test]
fn reseat_keeps_previous_state() {
    let mut router = router();
    sensor(&mut router, 2, &format!("{},2", TILE5_ROW2_COL1));
    sensor(&mut router, 2, &format!("{},x", TILE1_ROW4_COL4));

    assert_eq!(router.proxy(2).unwrap().state(), Some(StateValue::Alert));
    assert_eq!(router.sink().commands(), vec![point(6, 5), point(4, 4)]);
}

#[test]
fn first_observation_always_differs_from_sentinel() {
    let router = router();
    for id in router.proxy_ids() {
        assert!(router.snapshot(id).unwrap().is_sentinel());
        assert_eq!(router.proxy(id).unwrap(), &ProxyState::new(id));
    }
}
