//! 响应体解码
//!
//! 在 API 边界一次性把 `matrix` / `flattened` / `results` / `themes` 等动态结构
//! 解码为 `ApiPayload`，后续组件只做模式匹配。

use serde_json::Value;

use crate::error::{JobError, JobResult};

/// 最终结果负载
#[derive(Debug, Clone, PartialEq)]
pub enum ApiPayload {
    /// 二维相似度矩阵
    Matrix(Vec<Vec<f64>>),
    /// 行优先展开的一维矩阵
    Flattened(Vec<f64>),
    /// 通用结果列表
    Results(Vec<Value>),
    /// 主题列表
    Themes(Vec<Value>),
    /// 其他无法归类的负载，原样保留
    Other(Value),
}

impl ApiPayload {
    /// 从 JSON 值解码
    ///
    /// 字段存在但类型不符时返回 `UnexpectedResponse`。
    pub fn from_value(value: Value) -> JobResult<Self> {
        let Some(object) = value.as_object() else {
            return Ok(ApiPayload::Other(value));
        };

        if let Some(matrix) = object.get("matrix") {
            return serde_json::from_value(matrix.clone())
                .map(ApiPayload::Matrix)
                .map_err(|e| JobError::unexpected(format!("malformed matrix: {}", e), value.to_string()));
        }
        if let Some(flattened) = object.get("flattened") {
            return serde_json::from_value(flattened.clone())
                .map(ApiPayload::Flattened)
                .map_err(|e| {
                    JobError::unexpected(format!("malformed flattened: {}", e), value.to_string())
                });
        }
        if let Some(Value::Array(results)) = object.get("results") {
            return Ok(ApiPayload::Results(results.clone()));
        }
        if let Some(Value::Array(themes)) = object.get("themes") {
            return Ok(ApiPayload::Themes(themes.clone()));
        }

        Ok(ApiPayload::Other(value))
    }

    /// 从原始响应文本解码
    pub fn from_body(body: &str) -> JobResult<Self> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| JobError::unexpected(format!("invalid JSON: {}", e), body))?;
        Self::from_value(value)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiPayload::Matrix(_) => "matrix",
            ApiPayload::Flattened(_) => "flattened",
            ApiPayload::Results(_) => "results",
            ApiPayload::Themes(_) => "themes",
            ApiPayload::Other(_) => "other",
        }
    }
}
