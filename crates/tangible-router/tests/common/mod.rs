//! Shared fixtures for router integration tests

#![allow(dead_code)]

use std::sync::Arc;

use parking_lot::Mutex;
use tangible_config::{DashboardConfig, TileOffset};
use tangible_router::{AnimationCommand, AnimationSink, Router};

/// Raw samples decoding to tile 5, row 2, column 1
pub const TILE5_ROW2_COL1: &str = "2593,2876,3534";

/// Raw samples decoding to tile 1, row 4, column 4
pub const TILE1_ROW4_COL4: &str = "2807,0,0";

/// Sink that records every submitted command
#[derive(Clone, Default)]
pub struct RecordingSink {
    commands: Arc<Mutex<Vec<AnimationCommand>>>,
}

impl RecordingSink {
    pub fn commands(&self) -> Vec<AnimationCommand> {
        self.commands.lock().clone()
    }

    pub fn take(&self) -> Vec<AnimationCommand> {
        std::mem::take(&mut *self.commands.lock())
    }
}

impl AnimationSink for RecordingSink {
    fn submit(&self, command: AnimationCommand) {
        self.commands.lock().push(command);
    }
}

/// Board whose tile 5 sits at offset (4, 4)
pub fn board_config() -> DashboardConfig {
    let mut config = DashboardConfig::default();
    config.calibration.tile_adjustments[4] = TileOffset::new(4, 4);
    config
}

pub fn router() -> Router<RecordingSink> {
    router_with(&board_config())
}

pub fn router_with(config: &DashboardConfig) -> Router<RecordingSink> {
    Router::from_config(config, RecordingSink::default()).expect("router from fixture config")
}

pub fn sensor(router: &mut Router<RecordingSink>, id: u32, payload: &str) {
    router.on_message(&format!("proxy_state_update_proxy_{}", id), payload.as_bytes());
}

pub fn hub(router: &mut Router<RecordingSink>, id: u32, payload: &str) {
    router.on_message(&format!("hub_state_update_proxy_{}", id), payload.as_bytes());
}

pub fn point(row: i32, col: i32) -> AnimationCommand {
    AnimationCommand::ShowPoint { row, col }
}

pub fn path(start_row: i32, start_col: i32, end_row: i32, end_col: i32) -> AnimationCommand {
    AnimationCommand::ShowPath {
        start_row,
        start_col,
        end_row,
        end_col,
    }
}
