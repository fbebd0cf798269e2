//! 任务执行器 - 业务能力层
//!
//! 给定地址和请求体，返回最终解码后的负载。
//!
//! ## 状态流转
//!
//! ```text
//! SUBMITTED ──200──▶ IMMEDIATE_DONE
//!     │
//!     └──202──▶ POLLING ──completed──▶ FETCHING ──▶ DONE
//!
//! 任意阶段 ──▶ FAILED
//! ```
//!
//! 轮询是正常的异步进度，不是失败重试；本模块不做任何自动重试。

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, error, info};

use crate::clients::ApiClient;
use crate::error::{JobError, JobResult};
use crate::models::{ApiPayload, JobHandle, JobRequest, JobStatus, JobStatusBody, SubmitResponse};
use crate::services::progress::{feed_create, feed_update, notify_opt, FeedHandle, FeedStatus, JobFeed};
use crate::utils::{format_elapsed, truncate_text};

/// 任务执行器
///
/// 职责：
/// - 提交请求并区分立即结果（200）与排队任务（202）
/// - 按固定间隔轮询任务状态，直到终止状态
/// - 从结果地址取回最终负载
/// - 每个失败路径先报告进度再返回错误
#[derive(Clone)]
pub struct JobRunner {
    client: ApiClient,
    feed: Option<Arc<dyn JobFeed>>,
    poll_timeout: Option<Duration>,
}

impl JobRunner {
    /// 创建新的任务执行器
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            feed: None,
            poll_timeout: None,
        }
    }

    /// 接入外部任务列表
    pub fn with_feed(mut self, feed: Arc<dyn JobFeed>) -> Self {
        self.feed = Some(feed);
        self
    }

    /// 设置轮询最长等待时间，`None` 表示不限制
    pub fn with_poll_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// 执行一个任务直到终止
    ///
    /// # 返回
    /// 立即结果或轮询完成后取回的负载
    pub async fn run(&self, request: &JobRequest) -> JobResult<ApiPayload> {
        let name = request.display_name();
        let item = feed_create(self.feed.as_ref(), &name);

        match self.drive(request, &name, item.as_ref()).await {
            Ok(payload) => {
                info!("✓ {} 完成 ({})", name, payload.kind());
                notify_opt(request.on_progress.as_ref(), &format!("{} complete", name));
                feed_update(
                    self.feed.as_ref(),
                    item.as_ref(),
                    &format!("{} complete", name),
                    Some(FeedStatus::Completed),
                );
                Ok(payload)
            }
            Err(e) => {
                error!("❌ {} 失败: {}", name, e);
                let message = format!("{} failed: {}", name, e);
                notify_opt(request.on_progress.as_ref(), &message);
                feed_update(self.feed.as_ref(), item.as_ref(), &message, Some(FeedStatus::Failed));
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        request: &JobRequest,
        name: &str,
        item: Option<&FeedHandle>,
    ) -> JobResult<ApiPayload> {
        info!("🚀 提交 {}", name);
        notify_opt(request.on_progress.as_ref(), &format!("Submitting {}...", name));

        match self.submit(request).await? {
            SubmitResponse::Immediate(value) => ApiPayload::from_value(value),
            SubmitResponse::Queued(handle) => {
                info!("⏳ {} 已排队 (jobId={})，开始轮询", name, handle);
                let message = format!("{} job submitted, polling...", name);
                notify_opt(request.on_progress.as_ref(), &message);
                feed_update(self.feed.as_ref(), item, &message, Some(FeedStatus::Running));

                let result_url = self.poll(request, &handle, name, item).await?;
                self.fetch_result(&result_url).await
            }
        }
    }

    /// 提交请求并解释首个响应
    pub async fn submit(&self, request: &JobRequest) -> JobResult<SubmitResponse> {
        let response = self.client.post_json(&request.url, &request.body).await?;

        match response.status.as_u16() {
            200 => {
                let value: Value = serde_json::from_str(&response.body).map_err(|e| {
                    JobError::unexpected(format!("invalid JSON: {}", e), response.body.clone())
                })?;
                Ok(SubmitResponse::Immediate(value))
            }
            202 => {
                let job_id = serde_json::from_str::<Value>(&response.body)
                    .ok()
                    .and_then(|v| v.get("job_id").and_then(Value::as_str).map(str::to_string));

                match job_id {
                    Some(id) => Ok(SubmitResponse::Queued(JobHandle::new(id))),
                    None => Err(JobError::unexpected("missing job_id", response.body)),
                }
            }
            _ => Err(JobError::http(response.status, response.body)),
        }
    }

    /// 轮询直到终止状态，返回结果地址
    async fn poll(
        &self,
        request: &JobRequest,
        handle: &JobHandle,
        name: &str,
        item: Option<&FeedHandle>,
    ) -> JobResult<String> {
        let started = Instant::now();
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            let elapsed = format_elapsed(started.elapsed());

            if attempt % 2 == 0 {
                notify_opt(
                    request.on_progress.as_ref(),
                    &format!("Waiting for {} to complete... ({})", name, elapsed),
                );
            }

            let status_message = format!("{} running for {} (check #{})", name, elapsed, attempt);
            debug!("{}", status_message);
            feed_update(self.feed.as_ref(), item, &status_message, Some(FeedStatus::Running));

            if let Some(limit) = self.poll_timeout {
                if started.elapsed() >= limit {
                    return Err(JobError::PollTimeout {
                        job_id: handle.to_string(),
                        waited: elapsed,
                    });
                }
            }

            sleep(request.interval).await;

            let status = self.job_status(handle).await?;
            if !status.is_terminal() {
                continue;
            }

            match status {
                JobStatus::Completed {
                    result_url: Some(url),
                } => {
                    debug!("任务 {} 已完成，结果地址: {}", handle, url);
                    return Ok(url);
                }
                JobStatus::Completed { result_url: None } => {
                    return Err(JobError::unexpected(
                        "missing resultUrl",
                        format!("job {} reported completed without a result_url", handle),
                    ));
                }
                other => {
                    return Err(JobError::JobFailed {
                        status: other.name().to_string(),
                    });
                }
            }
        }
    }

    /// 查询一次任务状态
    pub async fn job_status(&self, handle: &JobHandle) -> JobResult<JobStatus> {
        let response = self.client.get_job(handle).await?;
        if !response.is_success() {
            return Err(JobError::http(response.status, response.body));
        }

        let body: JobStatusBody = serde_json::from_str(&response.body).map_err(|e| {
            JobError::unexpected(format!("invalid job status: {}", e), response.body.clone())
        })?;
        Ok(body.into())
    }

    /// 取回最终结果
    pub async fn fetch_result(&self, url: &str) -> JobResult<ApiPayload> {
        let response = self.client.get(url).await?;
        if !response.is_success() {
            return Err(JobError::http(response.status, response.body));
        }

        debug!("结果响应: {}", truncate_text(&response.body, 200));
        ApiPayload::from_body(&response.body)
    }
}
