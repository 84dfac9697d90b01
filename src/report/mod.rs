//! Run reporting module
//!
//! Accumulates outcome rows for the whole run and delivers them to the
//! remote log sink exactly once at run completion.

mod run_log;
mod sink;

pub use run_log::{OutcomeRow, RunLog, COLUMNS};
pub use sink::SheetSink;
