pub mod batch;
pub mod job;
pub mod loaders;
pub mod payload;

pub use batch::{BatchDescriptor, SimilarityOptions, SimilarityResult};
pub use job::{JobHandle, JobRequest, JobStatus, JobStatusBody, SubmitResponse, DEFAULT_POLL_INTERVAL};
pub use loaders::{load_comparison_request, ComparisonRequest};
pub use payload::ApiPayload;
