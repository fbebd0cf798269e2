//! 批次规划 - 业务能力层
//!
//! 决定一次两两比较是否需要拆分；需要时，较短的一侧作为固定侧完整出现在
//! 每个批次里，较长的一侧（可变侧）按原顺序切成大小接近的块。

use crate::config::Config;
use crate::models::{BatchDescriptor, SimilarityOptions};

/// 默认拆分阈值（严格大于才拆分）
pub const DEFAULT_SPLIT_THRESHOLD: usize = 10_000;
/// 默认单批次最大单元格数
pub const DEFAULT_MAX_BATCH_CELLS: usize = 50_000;

/// 被切分的轴
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    /// `set_a` 被切分：各批次结果按行拼接
    Rows,
    /// `set_b` 被切分：各批次结果按列拼接
    Columns,
}

/// 规划结果
#[derive(Debug, Clone, PartialEq)]
pub enum BatchPlan {
    /// 不拆分，单次请求
    Single,
    /// 拆分为多个批次，顺序与可变侧原顺序一致
    Split {
        axis: SplitAxis,
        batches: Vec<BatchDescriptor>,
    },
}

impl BatchPlan {
    pub fn batches(&self) -> &[BatchDescriptor] {
        match self {
            BatchPlan::Single => &[],
            BatchPlan::Split { batches, .. } => batches,
        }
    }
}

/// 批次规划器
#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    split_threshold: usize,
    max_batch_cells: usize,
}

impl Default for BatchPlanner {
    fn default() -> Self {
        Self::new(DEFAULT_SPLIT_THRESHOLD, DEFAULT_MAX_BATCH_CELLS)
    }
}

impl BatchPlanner {
    pub fn new(split_threshold: usize, max_batch_cells: usize) -> Self {
        Self {
            split_threshold,
            max_batch_cells: max_batch_cells.max(1),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.split_threshold, config.max_batch_cells)
    }

    /// 是否需要拆分：`n * m > threshold` 且非 fast 模式
    pub fn needs_split(&self, n: usize, m: usize, fast: bool) -> bool {
        !fast && n.saturating_mul(m) > self.split_threshold
    }

    /// 规划批次
    ///
    /// 每个批次携带完整的固定侧和一块可变侧，`fast` / `flattened` 固定为 `false`，
    /// 调用方的 `split` 选项原样透传。
    pub fn plan(&self, set_a: &[String], set_b: &[String], options: &SimilarityOptions) -> BatchPlan {
        if !self.needs_split(set_a.len(), set_b.len(), options.fast) {
            return BatchPlan::Single;
        }

        // 长度相等时固定 set_a
        let (fixed, variable, axis) = if set_a.len() <= set_b.len() {
            (set_a, set_b, SplitAxis::Columns)
        } else {
            (set_b, set_a, SplitAxis::Rows)
        };

        let chunk_size = self.chunk_size(fixed.len(), variable.len());
        let batch_options = SimilarityOptions {
            fast: false,
            flattened: false,
            split: options.split.clone(),
        };

        let batches = variable
            .chunks(chunk_size)
            .map(|chunk| match axis {
                SplitAxis::Columns => {
                    BatchDescriptor::new(fixed.to_vec(), chunk.to_vec(), batch_options.clone())
                }
                SplitAxis::Rows => {
                    BatchDescriptor::new(chunk.to_vec(), fixed.to_vec(), batch_options.clone())
                }
            })
            .collect();

        BatchPlan::Split { axis, batches }
    }

    /// 均衡的块大小
    ///
    /// `max_chunk = floor(max_cells / fixed)`，`batches = ceil(variable / max_chunk)`，
    /// `chunk = ceil(variable / batches)`。固定侧超过单批上限时每块只放一项。
    pub fn chunk_size(&self, fixed_len: usize, variable_len: usize) -> usize {
        let max_chunk = (self.max_batch_cells / fixed_len.max(1)).max(1);
        let batches_needed = variable_len.div_ceil(max_chunk).max(1);
        variable_len.div_ceil(batches_needed).max(1)
    }
}
