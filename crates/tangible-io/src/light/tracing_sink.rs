use tangible_router::{AnimationCommand, AnimationSink};
use tracing::info;

/// Sink for dry runs: logs each command and the frame it would send
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AnimationSink for TracingSink {
    fn submit(&self, command: AnimationCommand) {
        info!(%command, frame = ?command.encode(), "Animation (dry run)");
    }
}
