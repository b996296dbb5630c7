use anyhow::Result;
/// 日志工具模块
///
/// 提供日志文件初始化和文本截断的辅助函数
use std::fs;

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
///
/// # 返回
/// 返回是否成功初始化
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n记录校验日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 截断长文本用于日志显示
///
/// 按字符截断而不是按字节，避免把多字节字符切成半个。
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        // 5 个汉字 15 个字节，按字符数截断
        assert_eq!(truncate_text("一二三四五", 3), "一二三...");
    }
}
