//! Display configuration driver.
//!
//! Queries `wlr-randr --json` for the connected outputs and sweeps each one
//! through every supported mode, every transform and a fixed set of scales,
//! re-querying after each change to verify it and restoring the original
//! value at the end of each phase.

pub mod errors;
pub mod handler;
pub mod operations;
pub mod parse;
pub mod tool;
pub mod types;

pub use errors::DisplayError;
pub use operations::DisplayClient;
pub use tool::{DisplayTool, WlrRandr};
pub use types::{
    ApplyOutcome, DisplayMode, DisplayOptions, DisplaySnapshot, Displays, Phase, PhaseReport,
    Position, Transform,
};
