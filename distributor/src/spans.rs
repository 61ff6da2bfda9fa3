//! Pre-built [`tracing::Span`] constructors for a distribution run.
//!
//! Consistent span names make it easy to follow one run, one step, or one
//! confirmation wait through aggregated logs.

use tokenholder_types::{EventTime, TxHash};
use tracing::{info_span, Span};

use crate::error::Stage;

/// Span covering a whole run, keyed by the triggering event's time.
pub fn run_span(event_time: &EventTime) -> Span {
    info_span!("distribution_run", event_time = %event_time)
}

/// Span covering one orchestrator step.
pub fn step_span(stage: Stage) -> Span {
    info_span!("step", stage = %stage)
}

/// Span covering the confirmation wait of one transaction.
pub fn wait_span(hash: &TxHash) -> Span {
    info_span!("wait_for_tx", hash = %hash)
}
