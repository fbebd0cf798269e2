pub mod batch_planner;
pub mod job_runner;
pub mod progress;
pub mod result_assembler;

pub use batch_planner::{BatchPlan, BatchPlanner, SplitAxis};
pub use job_runner::JobRunner;
pub use progress::{
    notify, FeedHandle, FeedStatus, FnProgress, JobFeed, LogProgress, MemoryProgress,
    PrefixedProgress, ProgressSink,
};
