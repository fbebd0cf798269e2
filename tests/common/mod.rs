#![allow(dead_code)]

use analytics_jobs::{ApiClient, Config, JobRunner, StaticToken};
use std::sync::Arc;

pub const TOKEN: &str = "test-token";

/// 指向 mock 服务器的测试配置，轮询间隔缩短到 10ms
pub fn test_config(base_url: &str) -> Config {
    Config {
        api_base_url: base_url.to_string(),
        api_token: TOKEN.to_string(),
        poll_interval_ms: 10,
        request_timeout_secs: 10,
        ..Config::default()
    }
}

pub fn runner(base_url: &str) -> JobRunner {
    let config = test_config(base_url);
    let client = ApiClient::new(&config, Arc::new(StaticToken::new(TOKEN))).unwrap();
    JobRunner::new(client)
}

pub fn items(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{}{}", prefix, i)).collect()
}

/// 元素名形如 `a12` / `b7`，分数编码两侧下标，便于校验合并后的位置
pub fn score(a: &str, b: &str) -> f64 {
    let i: f64 = a[1..].parse().unwrap();
    let j: f64 = b[1..].parse().unwrap();
    i * 100_000.0 + j
}
