//! 记录与校验结论模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 数据集中的一条记录
///
/// 键名完全开放，序列化时保留原始键顺序。
pub type Record = Map<String, Value>;

/// 校验结论写入记录时使用的保留键
pub const VALIDATION_KEY: &str = "_validation";

/// LLM 返回的裁决
///
/// 只在单条记录的校验过程中存在，不单独落盘。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verdict {
    /// 答案是否正确
    #[serde(default)]
    pub valid: bool,
    /// 判定理由
    #[serde(default)]
    pub reason: String,
    /// 修正后的答案（答案正确时为 null）
    #[serde(default)]
    pub corrected_answer: Option<String>,
}

impl Verdict {
    /// 服务调用失败时的兜底裁决
    pub fn service_failure(err: impl std::fmt::Display) -> Self {
        Self {
            valid: false,
            reason: format!("LLM API error: {}", err),
            corrected_answer: None,
        }
    }

    /// 响应无法解析时的兜底裁决
    pub fn unparseable(err: impl std::fmt::Display) -> Self {
        Self {
            valid: false,
            reason: format!("LLM reply parse error: {}", err),
            corrected_answer: None,
        }
    }

    /// 取出非空的修正答案
    ///
    /// 空字符串视为"没有给出修正"。
    pub fn correction(&self) -> Option<&str> {
        self.corrected_answer.as_deref().filter(|s| !s.is_empty())
    }
}

/// 写入输出记录的 `_validation` 注解
///
/// 答案正确时不携带 `corrected` 字段。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationAnnotation {
    pub valid: bool,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected: Option<bool>,
}

impl ValidationAnnotation {
    /// 答案正确
    pub fn passed(reason: String) -> Self {
        Self {
            valid: true,
            reason,
            corrected: None,
        }
    }

    /// 答案错误，已替换为修正值
    pub fn corrected(reason: String) -> Self {
        Self {
            valid: false,
            reason,
            corrected: Some(true),
        }
    }

    /// 答案错误，未能修正
    pub fn uncorrected(reason: String) -> Self {
        Self {
            valid: false,
            reason,
            corrected: Some(false),
        }
    }
}

/// 把注解追加到记录末尾
///
/// 记录已有 `_validation` 键时先移除再插入，保证该键总是序列化在最后。
/// 必须用平移删除：`remove` 在 preserve_order 下是交换删除，会把
/// 末位键换进删除位，打乱其余键的相对顺序。
pub fn attach_annotation(mut record: Record, annotation: &ValidationAnnotation) -> Record {
    record.shift_remove(VALIDATION_KEY);
    record.insert(
        VALIDATION_KEY.to_string(),
        serde_json::to_value(annotation).unwrap_or(Value::Null),
    );
    record
}
