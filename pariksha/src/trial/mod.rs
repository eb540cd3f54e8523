//! Trial sequencing: reset → goal dispatch → monitoring → scoring → record.
//!
//! Phases run strictly one after another on the caller's thread. Every wait
//! polls the simulator; nothing subscribes to events.
//!
//! ```text
//!  ┌───────────┐   ┌──────────┐   ┌────────────────┐   ┌─────────┐   ┌────────┐
//!  │ Resetting │──▶│ Dispatch │──▶│ Motion start   │──▶│ Monitor │──▶│ Score  │
//!  │ (settle)  │   │ (goal)   │   │ (Phase A)      │   │(Phase B)│   │+record │
//!  └───────────┘   └──────────┘   └────────────────┘   └─────────┘   └────────┘
//! ```

mod dispatch;
mod monitor;
mod pacer;
mod reset;
mod runner;

pub use dispatch::{GoalDispatch, dispatch_goal, trial_goal};
pub use monitor::{Monitor, MonitorResult, TrialState};
pub use pacer::{Pacer, StallGuard};
pub use reset::{ResetReport, ResetSequencer, ResetState};
pub use runner::{TrialReport, TrialRunner};
