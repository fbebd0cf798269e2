//! 并发批次执行器 - 编排层
//!
//! ## 职责
//!
//! 1. **并发控制**：使用 Semaphore 限制同时在途的任务执行器数量
//! 2. **位置对齐**：第 `i` 个结果永远对应第 `i` 个批次，与完成顺序无关
//! 3. **不提前中止**：某个批次失败时其余批次继续执行，全部结束后再汇总
//! 4. **进度汇总**：每个批次结束时报告整体百分比

use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::info;

use crate::error::{JobError, JobResult};
use crate::models::{BatchDescriptor, JobRequest, SimilarityResult, DEFAULT_POLL_INTERVAL};
use crate::services::progress::{notify, PrefixedProgress, ProgressSink};
use crate::services::result_assembler::to_similarity;
use crate::services::JobRunner;
use crate::utils::logging::log_batch_settled;

/// 默认并发数
pub const DEFAULT_CONCURRENCY: usize = 4;

/// 所有批次的执行结果，顺序与提交顺序一致
#[derive(Debug)]
pub struct BatchResults {
    results: Vec<JobResult<SimilarityResult>>,
}

impl BatchResults {
    pub fn results(&self) -> &[JobResult<SimilarityResult>] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_err()).count()
    }

    /// 全部成功时返回按序排列的结果，否则返回汇总错误
    pub fn into_successes(self) -> JobResult<Vec<SimilarityResult>> {
        let total = self.results.len();
        let mut successes = Vec::with_capacity(total);
        let mut errors = Vec::new();

        for result in self.results {
            match result {
                Ok(result) => successes.push(result),
                Err(e) => errors.push(e),
            }
        }

        if errors.is_empty() {
            Ok(successes)
        } else {
            Err(JobError::aggregate(total, errors))
        }
    }
}

/// 并发批次执行器
pub struct ConcurrentExecutor {
    runner: JobRunner,
    url: String,
    concurrency: usize,
    interval: Duration,
}

impl ConcurrentExecutor {
    /// 创建执行器
    ///
    /// # 参数
    /// - `runner`: 任务执行器
    /// - `url`: 每个批次提交的操作地址
    /// - `concurrency`: 同时在途的批次数量上限
    pub fn new(runner: JobRunner, url: impl Into<String>, concurrency: usize) -> Self {
        Self {
            runner,
            url: url.into(),
            concurrency: concurrency.max(1),
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 执行所有批次并等待全部结束
    ///
    /// # 参数
    /// - `batches`: 批次列表
    /// - `task_name`: 任务名称
    /// - `progress`: 外层进度回调
    pub async fn execute(
        &self,
        batches: &[BatchDescriptor],
        task_name: &str,
        progress: Option<Arc<dyn ProgressSink>>,
    ) -> BatchResults {
        let total = batches.len();
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let processed = Arc::new(AtomicUsize::new(0));

        info!("📋 共 {} 个批次，最大并发数: {}", total, self.concurrency);

        let mut handles = Vec::with_capacity(total);

        for (index, batch) in batches.iter().enumerate() {
            let batch_number = index + 1;
            let (n, m) = batch.dims();

            let mut request = JobRequest::new(self.url.clone(), batch.to_body(), task_name)
                .with_interval(self.interval)
                .with_batch(batch_number, total);
            if let Some(outer) = &progress {
                request = request.with_progress(Arc::new(PrefixedProgress::for_batch(
                    batch_number,
                    total,
                    outer.clone(),
                )));
            }

            let runner = self.runner.clone();
            let semaphore = semaphore.clone();
            let processed = processed.clone();
            let progress = progress.clone();

            let handle = tokio::spawn(async move {
                let outcome: JobResult<SimilarityResult> = async {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|e| JobError::Task(e.to_string()))?;
                    let payload = runner.run(&request).await?;
                    to_similarity(payload, n, m)
                }
                .await;

                let done = processed.fetch_add(1, Ordering::SeqCst) + 1;
                log_batch_settled(batch_number, total, outcome.is_ok());
                if let Some(sink) = &progress {
                    let percent = done as f64 / total as f64 * 100.0;
                    notify(
                        sink.as_ref(),
                        &format!("Processed {}/{} batches ({:.0}%)", done, total, percent),
                    );
                }

                outcome
            });
            handles.push(handle);
        }

        // join_all 保持提交顺序
        let results = join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.unwrap_or_else(|e| Err(JobError::Task(e.to_string()))))
            .collect();

        BatchResults { results }
    }
}
