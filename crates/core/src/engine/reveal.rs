//! Line-by-line reveal of the stage currently executing.

use super::Shared;
use crate::state::transitions::advance_reveal;
use ps_protocol::ipc::Event;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;
use uuid::Uuid;

/// Reveals the lines of `stage_id` until finished or cancelled.
///
/// The first line appears after `reveal_start`, the next ones every
/// `reveal_line`. The loop also ends as soon as a tick no longer applies,
/// e.g. after the stage advanced.
pub(super) async fn reveal_loop(
    shared: Arc<Shared>,
    run_id: Uuid,
    stage_id: String,
    token: CancellationToken,
) {
    let mut delay = shared.timing.reveal_start();

    loop {
        tokio::select! {
            _ = token.cancelled() => return,
            _ = tokio::time::sleep(delay) => {}
        }

        let events = shared.apply(|state| advance_reveal(state, run_id, &stage_id));
        match events.last() {
            Some(Event::RevealProgress { revealed_lines, .. }) => {
                trace!(%run_id, stage_id = %stage_id, revealed_lines, "Revealed line");
                delay = shared.timing.reveal_line();
            }
            _ => return,
        }
    }
}
