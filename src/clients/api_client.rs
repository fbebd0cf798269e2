/// 分析服务 HTTP 客户端
///
/// 只负责传输：拼接地址、附加 bearer token 和 JSON 头、读回状态码与响应文本。
/// 响应含义由 `services::job_runner` 解释。
use crate::clients::token::TokenProvider;
use crate::config::Config;
use crate::error::{JobError, JobResult};
use crate::models::JobHandle;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// 原始 HTTP 响应
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// 分析服务客户端
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    /// 创建新的客户端
    pub fn new(config: &Config, tokens: Arc<dyn TokenProvider>) -> JobResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| JobError::transport(&config.api_base_url, e))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 操作地址：`{base}/v1/{operation}`
    pub fn operation_url(&self, operation: &str) -> String {
        format!("{}/v1/{}", self.base_url, operation.trim_start_matches('/'))
    }

    /// 轮询地址：`{base}/v1/jobs`
    pub fn jobs_url(&self) -> String {
        self.operation_url("jobs")
    }

    async fn bearer(&self) -> JobResult<String> {
        self.tokens
            .token()
            .await
            .map_err(|e| JobError::Auth(e.to_string()))
    }

    /// POST JSON 请求体
    pub async fn post_json(&self, url: &str, body: &Value) -> JobResult<RawResponse> {
        let token = self.bearer().await?;
        debug!("POST {}", url);

        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| JobError::transport(url, e))?;

        Self::read(url, response).await
    }

    /// 查询任务状态：`GET {base}/v1/jobs?jobId=<id>`
    pub async fn get_job(&self, handle: &JobHandle) -> JobResult<RawResponse> {
        let url = self.jobs_url();
        let token = self.bearer().await?;
        debug!("GET {} (jobId={})", url, handle);

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .query(&[("jobId", handle.as_str())])
            .send()
            .await
            .map_err(|e| JobError::transport(&url, e))?;

        Self::read(&url, response).await
    }

    /// GET 任意地址（结果地址）
    pub async fn get(&self, url: &str) -> JobResult<RawResponse> {
        let token = self.bearer().await?;
        debug!("GET {}", url);

        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| JobError::transport(url, e))?;

        Self::read(url, response).await
    }

    async fn read(url: &str, response: reqwest::Response) -> JobResult<RawResponse> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| JobError::transport(url, e))?;
        Ok(RawResponse { status, body })
    }
}
