// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Animation commands and the sink they are handed to

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use tangible_calibration::Coordinate;

/// Abstract light animation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationCommand {
    ShowPoint {
        row: i32,
        col: i32,
    },
    ShowPath {
        start_row: i32,
        start_col: i32,
        end_row: i32,
        end_col: i32,
    },
    PlayBootSequence,
}

impl AnimationCommand {
    pub fn point(at: Coordinate) -> Self {
        Self::ShowPoint {
            row: at.row,
            col: at.col,
        }
    }

    pub fn path(from: Coordinate, to: Coordinate) -> Self {
        Self::ShowPath {
            start_row: from.row,
            start_col: from.col,
            end_row: to.row,
            end_col: to.col,
        }
    }

    /// Frame understood by the light controller firmware
    ///
    /// Point and path frames are newline terminated; the boot frame is not.
    pub fn encode(&self) -> String {
        match self {
            Self::ShowPoint { row, col } => format!("{},{}\n", row, col),
            Self::ShowPath {
                start_row,
                start_col,
                end_row,
                end_col,
            } => format!("{},{},{},{}\n", start_row, start_col, end_row, end_col),
            Self::PlayBootSequence => "boot".to_string(),
        }
    }
}

impl Display for AnimationCommand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ShowPoint { row, col } => write!(f, "point ({}, {})", row, col),
            Self::ShowPath {
                start_row,
                start_col,
                end_row,
                end_col,
            } => write!(
                f,
                "path ({}, {}) -> ({}, {})",
                start_row, start_col, end_row, end_col
            ),
            Self::PlayBootSequence => f.write_str("boot sequence"),
        }
    }
}

/// Receiver of animation commands
///
/// `submit` is fire-and-forget: it must not block, and any queueing or rate
/// limiting is the sink's own business.
pub trait AnimationSink: Send + Sync {
    fn submit(&self, command: AnimationCommand);

    fn show_point(&self, row: i32, col: i32) {
        self.submit(AnimationCommand::ShowPoint { row, col });
    }

    fn show_path(&self, start_row: i32, start_col: i32, end_row: i32, end_col: i32) {
        self.submit(AnimationCommand::ShowPath {
            start_row,
            start_col,
            end_row,
            end_col,
        });
    }

    fn play_boot_sequence(&self) {
        self.submit(AnimationCommand::PlayBootSequence);
    }
}

impl<T: AnimationSink + ?Sized> AnimationSink for Arc<T> {
    fn submit(&self, command: AnimationCommand) {
        (**self).submit(command);
    }
}
