//! Application Services
//!
//! Application services coordinate use cases as long-running background
//! tasks.

mod matching_scheduler;

pub use matching_scheduler::{
    MatchingSchedulerConfig, MatchingSchedulerService, SchedulerError, TickSummary,
};
