//! 裁决解析
//!
//! LLM 返回的文本不保证是干净的 JSON：可能裹着客套话、markdown
//! 代码块，或带单引号、尾逗号。解析按固定顺序尝试多个纯函数
//! 策略，第一个成功者胜出，全部失败时返回最后一个错误。

use thiserror::Error;
use tracing::debug;

use crate::models::Verdict;

/// 裁决解析错误
#[derive(Debug, Error)]
pub enum VerdictParseError {
    #[error("严格 JSON 解析失败: {0}")]
    Strict(String),
    #[error("宽松 JSON5 解析失败: {0}")]
    Relaxed(String),
    #[error("前缀解析失败: {0}")]
    Prefix(String),
    #[error("响应中没有可解析的内容")]
    Empty,
}

/// 截取响应中第一个 `{` 到最后一个 `}` 的片段
///
/// 去掉模型在 JSON 前后包裹的说明文字；找不到完整的花括号对时
/// 原样返回，交给解析策略报错。
pub fn extract_json_span(reply: &str) -> &str {
    match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if end > start => &reply[start..=end],
        _ => reply,
    }
}

/// 解析策略：纯函数，文本进、裁决出
type ParseStage = fn(&str) -> Result<Verdict, VerdictParseError>;

/// 按顺序尝试的解析策略
const PARSE_STAGES: &[(&str, ParseStage)] = &[
    ("strict", parse_strict),
    ("relaxed", parse_relaxed),
    ("prefix", parse_prefix),
];

/// 解析裁决文本
pub fn parse_verdict(text: &str) -> Result<Verdict, VerdictParseError> {
    if text.trim().is_empty() {
        return Err(VerdictParseError::Empty);
    }

    let mut last_error = VerdictParseError::Empty;
    for (stage_name, stage) in PARSE_STAGES {
        match stage(text) {
            Ok(verdict) => {
                debug!("裁决解析成功（{} 策略）", stage_name);
                return Ok(verdict);
            }
            Err(e) => {
                debug!("{} 策略解析失败: {}", stage_name, e);
                last_error = e;
            }
        }
    }
    Err(last_error)
}

/// 严格 JSON 解析：拒绝尾逗号、单引号、注释
fn parse_strict(text: &str) -> Result<Verdict, VerdictParseError> {
    serde_json::from_str(text).map_err(|e| VerdictParseError::Strict(e.to_string()))
}

/// 宽松解析：接受单引号、尾逗号、未加引号的键等 JSON5 写法
fn parse_relaxed(text: &str) -> Result<Verdict, VerdictParseError> {
    json5::from_str(text).map_err(|e| VerdictParseError::Relaxed(e.to_string()))
}

/// 前缀解析：取文本开头的第一个完整 JSON 值，忽略其后的杂质
///
/// 覆盖"合法 JSON 后面还跟着含 `}` 的废话"这种花括号截取
/// 兜不住的情况。
fn parse_prefix(text: &str) -> Result<Verdict, VerdictParseError> {
    let mut stream = serde_json::Deserializer::from_str(text).into_iter::<Verdict>();
    match stream.next() {
        Some(Ok(verdict)) => Ok(verdict),
        Some(Err(e)) => Err(VerdictParseError::Prefix(e.to_string())),
        None => Err(VerdictParseError::Empty),
    }
}
