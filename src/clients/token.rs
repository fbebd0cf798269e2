/// 访问令牌提供者
///
/// 令牌获取属于外部协作方，核心只通过这个接口拿到 bearer token。
use anyhow::Result;
use async_trait::async_trait;
use std::future::Future;

#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// 返回当前可用的 bearer token
    async fn token(&self) -> Result<String>;
}

/// 固定令牌
#[derive(Debug, Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

/// 基于异步闭包的令牌提供者
pub struct FnTokenProvider<F> {
    fetch: F,
}

impl<F, Fut> FnTokenProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

#[async_trait]
impl<F, Fut> TokenProvider for FnTokenProvider<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = Result<String>> + Send,
{
    async fn token(&self) -> Result<String> {
        (self.fetch)().await
    }
}
