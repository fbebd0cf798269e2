/// 日志工具模块
///
/// 提供日志初始化、耗时格式化和输出的辅助函数
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；否则默认 `info`，详细模式为 `debug`。重复调用是安全的。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 格式化耗时为 `{h}h {m}m {s}s`
///
/// 小时或分钟为 0 时整段省略，秒始终显示。
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    let mut parts = Vec::with_capacity(3);
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    parts.push(format!("{}s", seconds));
    parts.join(" ")
}

/// 记录拆分计划
///
/// # 参数
/// - `task_name`: 任务名称
/// - `batch_count`: 批次数量
/// - `fixed_len`: 固定侧长度
/// - `chunk_size`: 每批可变侧长度
pub fn log_batch_plan(task_name: &str, batch_count: usize, fixed_len: usize, chunk_size: usize) {
    info!("{}", "=".repeat(60));
    info!("📦 {} 拆分为 {} 个批次", task_name, batch_count);
    info!("📐 固定侧 {} 项，每批可变侧最多 {} 项", fixed_len, chunk_size);
    info!("{}", "=".repeat(60));
}

/// 记录单个批次完成信息
pub fn log_batch_settled(batch_number: usize, batch_count: usize, ok: bool) {
    if ok {
        info!("✓ 第 {}/{} 批完成", batch_number, batch_count);
    } else {
        info!("✗ 第 {}/{} 批失败", batch_number, batch_count);
    }
}

/// 打印批量执行统计
///
/// # 参数
/// - `success`: 成功数量
/// - `failed`: 失败数量
/// - `elapsed`: 总耗时
pub fn print_final_stats(success: usize, failed: usize, elapsed: Duration) {
    info!("\n{}", "─".repeat(60));
    info!("📊 批量执行完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("✅ 成功: {}/{}", success, success + failed);
    info!("❌ 失败: {}", failed);
    info!("⏱️ 耗时: {}", format_elapsed(elapsed));
    info!("{}", "─".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
