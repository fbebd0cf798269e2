//! 进度通知 - 业务能力层
//!
//! 核心只通过两个窄接口对外报告状态：
//! - `ProgressSink`：人类可读的状态字符串
//! - `JobFeed`：外部任务列表的创建 / 更新钩子
//!
//! 两者都是"发出即忘"：回调返回的错误和 panic 都在 `notify` / `feed_*` 中被吞掉，
//! 永远不会打断任务状态机。

use anyhow::Result;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

/// 进度回调
pub trait ProgressSink: Send + Sync {
    fn report(&self, message: &str) -> Result<()>;
}

/// 安全地发送进度消息
pub fn notify(sink: &dyn ProgressSink, message: &str) {
    match catch_unwind(AssertUnwindSafe(|| sink.report(message))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("进度回调返回错误，已忽略: {}", e),
        Err(_) => warn!("进度回调发生 panic，已忽略"),
    }
}

/// 对可选的回调发送进度消息
pub fn notify_opt(sink: Option<&Arc<dyn ProgressSink>>, message: &str) {
    if let Some(sink) = sink {
        notify(sink.as_ref(), message);
    }
}

/// 写入 tracing 日志的回调
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, message: &str) -> Result<()> {
        info!("📣 {}", message);
        Ok(())
    }
}

/// 基于闭包的回调
pub struct FnProgress<F>(pub F);

impl<F> ProgressSink for FnProgress<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn report(&self, message: &str) -> Result<()> {
        (self.0)(message);
        Ok(())
    }
}

/// 在内存中收集所有消息
#[derive(Debug, Default)]
pub struct MemoryProgress {
    messages: Mutex<Vec<String>>,
}

impl MemoryProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.to_vec())
            .unwrap_or_default()
    }
}

impl ProgressSink for MemoryProgress {
    fn report(&self, message: &str) -> Result<()> {
        self.messages
            .lock()
            .map_err(|_| anyhow::anyhow!("progress buffer poisoned"))?
            .push(message.to_string());
        Ok(())
    }
}

/// 给每条消息加上批次前缀后转发给外层回调
pub struct PrefixedProgress {
    prefix: String,
    inner: Arc<dyn ProgressSink>,
}

impl PrefixedProgress {
    pub fn new(prefix: impl Into<String>, inner: Arc<dyn ProgressSink>) -> Self {
        Self {
            prefix: prefix.into(),
            inner,
        }
    }

    /// `[Batch i/n]` 前缀
    pub fn for_batch(batch_number: usize, batch_count: usize, inner: Arc<dyn ProgressSink>) -> Self {
        Self::new(format!("[Batch {}/{}] ", batch_number, batch_count), inner)
    }
}

impl ProgressSink for PrefixedProgress {
    fn report(&self, message: &str) -> Result<()> {
        self.inner.report(&format!("{}{}", self.prefix, message))
    }
}

// ========== 外部任务列表 ==========

/// 外部任务列表中的条目句柄
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedHandle(pub String);

/// 条目状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus {
    Running,
    Completed,
    Failed,
}

/// 外部任务列表钩子
pub trait JobFeed: Send + Sync {
    fn create_item(&self, title: &str) -> Result<FeedHandle>;
    fn update_item(&self, handle: &FeedHandle, message: &str, status: Option<FeedStatus>) -> Result<()>;
}

/// 安全地创建条目，失败时返回 `None`
pub fn feed_create(feed: Option<&Arc<dyn JobFeed>>, title: &str) -> Option<FeedHandle> {
    let feed = feed?;
    match catch_unwind(AssertUnwindSafe(|| feed.create_item(title))) {
        Ok(Ok(handle)) => Some(handle),
        Ok(Err(e)) => {
            warn!("创建任务条目失败，已忽略: {}", e);
            None
        }
        Err(_) => {
            warn!("创建任务条目时发生 panic，已忽略");
            None
        }
    }
}

/// 安全地更新条目
pub fn feed_update(
    feed: Option<&Arc<dyn JobFeed>>,
    handle: Option<&FeedHandle>,
    message: &str,
    status: Option<FeedStatus>,
) {
    let (Some(feed), Some(handle)) = (feed, handle) else {
        return;
    };
    match catch_unwind(AssertUnwindSafe(|| feed.update_item(handle, message, status))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!("更新任务条目失败，已忽略: {}", e),
        Err(_) => warn!("更新任务条目时发生 panic，已忽略"),
    }
}
