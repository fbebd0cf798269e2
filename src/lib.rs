//! # Analytics Jobs
//!
//! 远程分析服务的客户端编排器：提交请求、轮询排队任务、取回结果，
//! 并在两两比较过大时自动拆分、并发执行、合并结果。
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - HTTP 传输与访问令牌
//! - `ApiClient` - 拼接地址、附加 bearer token、读回响应
//! - `TokenProvider` - 外部注入的令牌来源
//!
//! ### ② 业务能力层（Services）
//! - `JobRunner` - 提交 → 轮询 → 取结果的状态机
//! - `BatchPlanner` - 拆分决策与均衡分块
//! - `result_assembler` - 一维还原与矩阵拼接
//! - `progress` - 进度回调与外部任务列表钩子
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/concurrent_executor` - 并发受限的批次执行器
//! - `orchestrator/similarity` - 调用方入口 `AnalyticsOrchestrator`
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use clients::{ApiClient, FnTokenProvider, StaticToken, TokenProvider};
pub use config::Config;
pub use error::{JobError, JobResult};
pub use models::{ApiPayload, BatchDescriptor, JobRequest, JobStatus, SimilarityOptions, SimilarityResult};
pub use orchestrator::{AnalyticsOrchestrator, ConcurrentExecutor};
pub use services::{BatchPlan, BatchPlanner, JobRunner, LogProgress, ProgressSink, SplitAxis};
