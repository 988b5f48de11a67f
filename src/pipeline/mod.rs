//! The resumable batch pipeline.
//!
//! Submission chunks a document into sections; the scheduler then walks
//! each job section by section, one unit of work per tick, parking the
//! job between sections and recovering interrupted work after restarts.

mod clock;
mod scheduler;
mod section;

pub use clock::{Clock, ManualClock, SystemClock};
pub use scheduler::{Scheduler, SchedulerConfig, TickOutcome};
pub use section::{SectionOutcome, SectionPipeline, SectionPipelineConfig, FAILURE_MARKER};
