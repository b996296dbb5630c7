//! 字段映射
//!
//! 把一条记录的物理键解析到四个逻辑字段：
//! question / answer / question_type / language。
//! 先查语言首选键位，未命中再逐个试跨语言兜底词表。
//! 解析不到的字段留空字符串，这一层不报错。

use std::collections::HashMap;

use serde_json::Value;

use crate::mapping::normalize_key;
use crate::models::{keymap_for, FieldSlot, Language, Record, ENGLISH_KEYMAP};

/// 映射结果
///
/// `answer_key` 是答案所在的物理键，修正答案时按它写回；
/// 记录里探测不到答案键时退回英语键位，修正值会作为新键插入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedFields {
    pub question: String,
    pub answer: String,
    pub question_type: String,
    pub language: String,
    pub answer_key: String,
}

/// 规范化键 → (物理键, 字符串化的值)
type KeyLookup<'a> = HashMap<String, (&'a str, String)>;

/// 按语言键位映射一条记录
pub fn map_fields(record: &Record, language: Language) -> MappedFields {
    let keymap = keymap_for(language);
    let lookup = build_lookup(record);

    let question = probe(&lookup, keymap.question, FieldSlot::Question.fallbacks());
    let answer = probe(&lookup, keymap.answer, FieldSlot::Answer.fallbacks());
    let question_type = probe(&lookup, keymap.question_type, FieldSlot::QuestionType.fallbacks());
    let declared_language = probe(&lookup, keymap.language, FieldSlot::Language.fallbacks());

    let answer_key = answer
        .as_ref()
        .map(|(key, _)| key.clone())
        .unwrap_or_else(|| ENGLISH_KEYMAP.answer.to_string());

    MappedFields {
        question: question.map(|(_, value)| value).unwrap_or_default(),
        answer: answer.map(|(_, value)| value).unwrap_or_default(),
        question_type: question_type.map(|(_, value)| value).unwrap_or_default(),
        language: declared_language.map(|(_, value)| value).unwrap_or_default(),
        answer_key,
    }
}

/// 解析记录声明的语言
///
/// 只探测语言字段的兜底词表；未声明或名称不认识时回落到英语。
pub fn resolve_declared_language(record: &Record) -> Language {
    let lookup = build_lookup(record);
    probe(&lookup, ENGLISH_KEYMAP.language, FieldSlot::Language.fallbacks())
        .and_then(|(_, value)| Language::from_name(&value))
        .unwrap_or(Language::English)
}

/// 把记录的全部键规范化成一张查找表
///
/// 同一规范化键出现多次时保留先出现的物理键。
fn build_lookup(record: &Record) -> KeyLookup<'_> {
    let mut lookup = KeyLookup::new();
    for (key, value) in record {
        lookup
            .entry(normalize_key(key))
            .or_insert_with(|| (key.as_str(), stringify_value(value)));
    }
    lookup
}

/// JSON 值转文本：字符串取原文，null 视为缺失，其余紧凑序列化
fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 探测一个字段：先试首选键，再依次试兜底词表，空值跳过
fn probe(lookup: &KeyLookup<'_>, primary: &str, fallbacks: &[&str]) -> Option<(String, String)> {
    std::iter::once(primary)
        .chain(fallbacks.iter().copied())
        .find_map(|candidate| {
            lookup
                .get(&normalize_key(candidate))
                .filter(|(_, value)| !value.is_empty())
                .map(|(key, value)| ((*key).to_string(), value.clone()))
        })
}
