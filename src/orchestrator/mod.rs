//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `similarity` - 分析编排器
//! - 调用方入口，持有任务执行器、批次规划器和配置
//! - 决定单次请求还是拆分执行
//! - 合并批次结果
//!
//! ### `concurrent_executor` - 并发批次执行器
//! - 控制并发数量（Semaphore）
//! - 按位置收集每个批次的结果或错误
//! - 汇总进度百分比
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::similarity (处理整体比较)
//!     ↓
//! orchestrator::concurrent_executor (处理 Vec<BatchDescriptor>)
//!     ↓
//! services (能力层：job_runner / batch_planner / result_assembler / progress)
//!     ↓
//! clients (基础设施：ApiClient / TokenProvider)
//! ```

pub mod concurrent_executor;
pub mod similarity;

pub use concurrent_executor::{BatchResults, ConcurrentExecutor, DEFAULT_CONCURRENCY};
pub use similarity::{AnalyticsOrchestrator, SIMILARITY_OPERATION};
