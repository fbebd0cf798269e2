//! 结果合并 - 业务能力层
//!
//! 把单次请求的负载或多个批次的部分矩阵整理成调用方期望的 `n × m` 矩阵。

use crate::error::{JobError, JobResult};
use crate::models::{ApiPayload, SimilarityResult};
use crate::services::batch_planner::SplitAxis;

/// 把行优先的一维数组还原为 `n × m` 矩阵
///
/// `matrix[i] = flattened[i*m .. (i+1)*m]`
pub fn reshape_flattened(flattened: &[f64], n: usize, m: usize) -> JobResult<Vec<Vec<f64>>> {
    if flattened.len() != n * m {
        return Err(JobError::unexpected(
            format!(
                "flattened length {} does not match {}x{}",
                flattened.len(),
                n,
                m
            ),
            format!("{} values", flattened.len()),
        ));
    }

    Ok((0..n).map(|i| flattened[i * m..(i + 1) * m].to_vec()).collect())
}

/// 校验矩阵恰好为 `n` 行、每行 `m` 列
pub fn check_shape(matrix: &[Vec<f64>], n: usize, m: usize) -> JobResult<()> {
    if matrix.len() != n {
        return Err(JobError::unexpected(
            format!("matrix has {} rows, expected {}x{}", matrix.len(), n, m),
            format!("{} rows", matrix.len()),
        ));
    }
    if let Some((row, cols)) = matrix
        .iter()
        .map(Vec::len)
        .enumerate()
        .find(|&(_, cols)| cols != m)
    {
        return Err(JobError::unexpected(
            format!("row {} has {} columns, expected {}x{}", row, cols, n, m),
            format!("{} rows", matrix.len()),
        ));
    }
    Ok(())
}

/// 把解码后的负载转换为相似度结果
///
/// # 参数
/// - `payload`: 单次请求的负载
/// - `n`: `set_a` 长度
/// - `m`: `set_b` 长度
pub fn to_similarity(payload: ApiPayload, n: usize, m: usize) -> JobResult<SimilarityResult> {
    match payload {
        ApiPayload::Matrix(matrix) => {
            check_shape(&matrix, n, m)?;
            Ok(SimilarityResult::new(matrix))
        }
        ApiPayload::Flattened(flattened) => {
            reshape_flattened(&flattened, n, m).map(SimilarityResult::new)
        }
        other => Err(JobError::unexpected(
            format!("expected matrix or flattened payload, got {}", other.kind()),
            format!("{:?}", other),
        )),
    }
}

/// 按切分轴合并各批次的部分矩阵
///
/// `parts` 的顺序必须与批次提交顺序一致；合并结果必须是完整的 `n × m`。
pub fn merge(
    axis: SplitAxis,
    parts: Vec<SimilarityResult>,
    n: usize,
    m: usize,
) -> JobResult<SimilarityResult> {
    let merged = concat(axis, parts)?;
    check_shape(&merged.matrix, n, m)?;
    Ok(merged)
}

fn concat(axis: SplitAxis, parts: Vec<SimilarityResult>) -> JobResult<SimilarityResult> {
    match axis {
        SplitAxis::Rows => Ok(SimilarityResult::new(
            parts.into_iter().flat_map(|part| part.matrix).collect(),
        )),
        SplitAxis::Columns => {
            let mut parts = parts.into_iter();
            let Some(first) = parts.next() else {
                return Ok(SimilarityResult::default());
            };
            let mut matrix = first.matrix;

            for (index, part) in parts.enumerate() {
                if part.rows() != matrix.len() {
                    return Err(JobError::unexpected(
                        format!(
                            "batch {} has {} rows, expected {}",
                            index + 2,
                            part.rows(),
                            matrix.len()
                        ),
                        format!("{:?}", part.matrix.first()),
                    ));
                }
                for (row, extra) in matrix.iter_mut().zip(part.matrix) {
                    row.extend(extra);
                }
            }

            Ok(SimilarityResult::new(matrix))
        }
    }
}
