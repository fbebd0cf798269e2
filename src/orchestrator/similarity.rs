//! 分析编排器 - 编排层
//!
//! 调用方的唯一入口：
//!
//! ```text
//! compute_similarity
//!     ↓
//! BatchPlanner ──不拆分──▶ JobRunner ──▶ result_assembler::to_similarity
//!     │
//!     └──拆分──▶ ConcurrentExecutor ──▶ result_assembler::merge
//! ```

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

use crate::clients::{ApiClient, TokenProvider};
use crate::config::Config;
use crate::error::JobResult;
use crate::models::{ApiPayload, BatchDescriptor, JobRequest, SimilarityOptions, SimilarityResult};
use crate::orchestrator::concurrent_executor::ConcurrentExecutor;
use crate::services::progress::{JobFeed, ProgressSink};
use crate::services::{result_assembler, BatchPlan, BatchPlanner, JobRunner};
use crate::utils::logging::{log_batch_plan, print_final_stats};

/// 相似度操作名称
pub const SIMILARITY_OPERATION: &str = "similarity";

/// 分析编排器
pub struct AnalyticsOrchestrator {
    runner: JobRunner,
    planner: BatchPlanner,
    concurrency: usize,
    interval: Duration,
    progress: Option<Arc<dyn ProgressSink>>,
}

impl AnalyticsOrchestrator {
    /// 根据配置创建编排器
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> JobResult<Self> {
        config.validate()?;
        let client = ApiClient::new(config, tokens)?;
        let runner = JobRunner::new(client).with_poll_timeout(config.poll_timeout());

        Ok(Self {
            runner,
            planner: BatchPlanner::from_config(config),
            concurrency: config.max_concurrent_batches,
            interval: config.poll_interval(),
            progress: None,
        })
    }

    /// 设置进度回调
    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = Some(sink);
        self
    }

    /// 接入外部任务列表
    pub fn with_feed(mut self, feed: Arc<dyn JobFeed>) -> Self {
        self.runner = self.runner.with_feed(feed);
        self
    }

    pub fn planner(&self) -> &BatchPlanner {
        &self.planner
    }

    fn request(&self, operation: &str, body: Value, task_name: &str) -> JobRequest {
        let url = self.runner.client().operation_url(operation);
        let request = JobRequest::new(url, body, task_name).with_interval(self.interval);
        match &self.progress {
            Some(sink) => request.with_progress(sink.clone()),
            None => request,
        }
    }

    /// 执行任意操作：`POST /v1/<operation>`
    ///
    /// # 返回
    /// 解码后的负载（矩阵、结果列表、主题列表等）
    pub async fn run_operation(
        &self,
        operation: &str,
        body: Value,
        task_name: &str,
    ) -> JobResult<ApiPayload> {
        let request = self.request(operation, body, task_name);
        self.runner.run(&request).await
    }

    /// 计算两组文本的相似度矩阵
    ///
    /// 过大时自动拆分并发执行，结果始终按原输入顺序排列为 `|set_a| × |set_b|`。
    pub async fn compute_similarity(
        &self,
        task_name: &str,
        set_a: &[String],
        set_b: &[String],
        options: &SimilarityOptions,
    ) -> JobResult<SimilarityResult> {
        let (n, m) = (set_a.len(), set_b.len());

        match self.planner.plan(set_a, set_b, options) {
            BatchPlan::Single => {
                info!("🔍 {}: {} × {}，单次请求", task_name, n, m);
                let body =
                    BatchDescriptor::new(set_a.to_vec(), set_b.to_vec(), options.clone()).to_body();
                let payload = self.run_operation(SIMILARITY_OPERATION, body, task_name).await?;
                result_assembler::to_similarity(payload, n, m)
            }
            BatchPlan::Split { axis, batches } => {
                let fixed = n.min(m);
                let chunk = self.planner.chunk_size(fixed, n.max(m));
                log_batch_plan(task_name, batches.len(), fixed, chunk);

                let started = Instant::now();
                let executor = ConcurrentExecutor::new(
                    self.runner.clone(),
                    self.runner.client().operation_url(SIMILARITY_OPERATION),
                    self.concurrency,
                )
                .with_interval(self.interval);

                let results = executor
                    .execute(&batches, task_name, self.progress.clone())
                    .await;
                let failed = results.failed_count();
                print_final_stats(results.len() - failed, failed, started.elapsed());

                let parts = results.into_successes()?;
                result_assembler::merge(axis, parts, n, m)
            }
        }
    }
}
