//! 两两比较的请求与结果模型

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// 相似度计算选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityOptions {
    /// 同步低精度模式，同时关闭自动拆分
    #[serde(default)]
    pub fast: bool,
    /// 要求服务端返回行优先的一维结果
    #[serde(default)]
    pub flattened: bool,
    /// 调用方的拆分选项，原样透传给服务端
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split: Option<Value>,
}

/// 一个批次：整体比较的一个切片
///
/// 在批次列表中的位置有意义，执行和合并时都按位置对应。
#[derive(Debug, Clone, PartialEq)]
pub struct BatchDescriptor {
    pub set_a: Vec<String>,
    pub set_b: Vec<String>,
    pub options: SimilarityOptions,
}

impl BatchDescriptor {
    pub fn new(set_a: Vec<String>, set_b: Vec<String>, options: SimilarityOptions) -> Self {
        Self {
            set_a,
            set_b,
            options,
        }
    }

    /// 本批次的单元格数量
    pub fn cells(&self) -> usize {
        self.set_a.len() * self.set_b.len()
    }

    /// 本批次结果的维度 `(n, m)`
    pub fn dims(&self) -> (usize, usize) {
        (self.set_a.len(), self.set_b.len())
    }

    /// 构建请求体
    pub fn to_body(&self) -> Value {
        let mut body = json!({
            "set_a": self.set_a,
            "set_b": self.set_b,
            "fast": self.options.fast,
            "flattened": self.options.flattened,
        });
        if let Some(split) = &self.options.split {
            body["split"] = split.clone();
        }
        body
    }
}

/// 相似度结果：`n × m` 矩阵
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityResult {
    pub matrix: Vec<Vec<f64>>,
}

impl SimilarityResult {
    pub fn new(matrix: Vec<Vec<f64>>) -> Self {
        Self { matrix }
    }

    pub fn rows(&self) -> usize {
        self.matrix.len()
    }

    pub fn cols(&self) -> usize {
        self.matrix.first().map_or(0, Vec::len)
    }
}
