//! Bad input is dropped without touching state

mod common;

use common::*;
use tangible_config::TileOffset;
use tangible_router::{ProxyState, RouterError, Snapshot};

fn assert_untouched(router: &tangible_router::Router<RecordingSink>) {
    for id in router.proxy_ids() {
        assert_eq!(router.proxy(id).unwrap(), &ProxyState::new(id));
        assert_eq!(router.snapshot(id), Some(Snapshot::Sentinel));
    }
    assert!(router.sink().commands().is_empty());
}

#[test]
fn three_field_sensor_payload_is_dropped() {
    let mut router = router();

    let result = router.process_message("proxy_state_update_proxy_2", TILE5_ROW2_COL1.as_bytes());
    assert!(matches!(result, Err(RouterError::MalformedPayload { .. })));

    sensor(&mut router, 2, TILE5_ROW2_COL1);
    sensor(&mut router, 2, "1,2,3,4,5");
    sensor(&mut router, 2, "a,b,c,x");
    sensor(&mut router, 2, "");

    assert_untouched(&router);
}

#[test]
fn invalid_sensor_state_is_dropped() {
    let mut router = router();
    let result = router.process_message(
        "proxy_state_update_proxy_2",
        format!("{},9", TILE5_ROW2_COL1).as_bytes(),
    );
    assert_eq!(result, Err(RouterError::InvalidState("9".into())));
    assert_untouched(&router);
}

#[test]
fn unknown_proxy_and_topic_are_dropped() {
    let mut router = router();

    let result = router.process_message(
        "proxy_state_update_proxy_9",
        format!("{},x", TILE5_ROW2_COL1).as_bytes(),
    );
    assert_eq!(result, Err(RouterError::UnknownProxy(9)));

    let result = router.process_message("lamp_state_update_proxy_1", b"1");
    assert!(matches!(result, Err(RouterError::UnknownTopic(_))));

    router.on_message("hub_state_update_proxy_42", b"1");
    router.on_message("dashboardOverride", b"42,1,1");
    router.on_message("proxy_state_update_proxy_x", b"1,2,3,x");

    assert_untouched(&router);
}

#[test]
fn malformed_override_is_dropped() {
    let mut router = router();
    router.on_message("dashboardOverride", b"3,10");
    router.on_message("dashboardOverride", b"3,10,12,1");
    router.on_message("dashboardOverride", b"three,10,12");
    assert_untouched(&router);
}

#[test]
fn non_text_payload_is_dropped() {
    let mut router = router();
    router.on_message("proxy_state_update_proxy_1", &[0xc3, 0x28, 0x2c, 0x31]);
    assert_untouched(&router);
}

#[test]
fn calibration_defect_fails_only_that_event() {
    let mut config = board_config();
    config.calibration.tile_adjustments = vec![TileOffset::new(0, 0); 4];
    let mut router = router_with(&config);

    let result = router.process_message(
        "proxy_state_update_proxy_1",
        format!("{},x", TILE5_ROW2_COL1).as_bytes(),
    );
    let err = result.unwrap_err();
    assert!(err.is_configuration_defect());
    assert_eq!(router.proxy(1).unwrap(), &ProxyState::new(1));

    // Same event through the infallible entry point, then another proxy
    sensor(&mut router, 1, &format!("{},0", TILE5_ROW2_COL1));
    sensor(&mut router, 0, &format!("{},x", TILE1_ROW4_COL4));

    assert_eq!(router.sink().commands(), vec![point(4, 4)]);
    assert_eq!(router.proxy(1).unwrap(), &ProxyState::new(1));
}

#[test]
fn overflowing_tile_offset_is_a_calibration_defect() {
    let mut config = board_config();
    config.calibration.tile_adjustments[4] = TileOffset::new(i32::MAX, 0);
    let mut router = router_with(&config);

    let err = router
        .process_message(
            "proxy_state_update_proxy_2",
            format!("{},x", TILE5_ROW2_COL1).as_bytes(),
        )
        .unwrap_err();
    assert!(err.is_configuration_defect());

    // Infallible entry point keeps serving other proxies
    sensor(&mut router, 2, &format!("{},1", TILE5_ROW2_COL1));
    sensor(&mut router, 0, &format!("{},x", TILE1_ROW4_COL4));

    assert_eq!(router.proxy(2).unwrap(), &ProxyState::new(2));
    assert_eq!(router.sink().commands(), vec![point(4, 4)]);
}
