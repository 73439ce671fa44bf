//! Resolution Engine
//!
//! All board resolution code. 100% deterministic for a given seed.
//!
//! ## Module Structure
//!
//! - `events`: Change log vocabulary handed to the presentation layer
//! - `matcher`: Prioritized, cell-exclusive pattern search
//! - `gravity`: One-step falls and spawning
//! - `shuffle`: Random rearrangement of dead boards
//! - `swap`: Player swap validation
//! - `phases`: Orchestration to a stable board

pub mod events;
pub mod matcher;
pub mod gravity;
pub mod shuffle;
pub mod swap;
pub mod phases;

// Re-export key types
pub use events::{ChangeAction, ChangeLog, ChangeLogEntry};
pub use matcher::{PatternFound, PatternSearchResult};
pub use phases::{MatchResolution, PhasesOutcome, PhasesReport, ResolveOutcome};
