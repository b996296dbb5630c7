//! 语言枚举与语言探测

use serde_json::Value;

use crate::models::Record;

/// 支持的语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    English,
    Spanish,
    German,
    French,
    Chinese,
    Arabic,
    Hindi,
    Russian,
}

/// 探测时采样的记录数
const SAMPLE_RECORDS: usize = 5;

/// 采样文本的最大字符数
const SAMPLE_CHAR_CAP: usize = 2000;

/// 非拉丁文字系统的码位区间
///
/// 按固定优先级排列，整段样本里先命中哪个区间就判为哪种语言。
const SCRIPT_RANGES: &[(Language, &[(char, char)])] = &[
    (
        Language::Chinese,
        &[('\u{4E00}', '\u{9FFF}'), ('\u{3400}', '\u{4DBF}')],
    ),
    (Language::Arabic, &[('\u{0600}', '\u{06FF}')]),
    (Language::Hindi, &[('\u{0900}', '\u{097F}')]),
    (Language::Russian, &[('\u{0400}', '\u{04FF}')]),
];

/// 拉丁语种的标志词（全部小写，按检查顺序排列）
const LATIN_MARKERS: &[(Language, &[&str])] = &[
    (
        Language::Spanish,
        &["el", "los", "las", "es", "una", "qué", "cuál", "pregunta", "respuesta"],
    ),
    (
        Language::German,
        &["der", "die", "das", "und", "ist", "nicht", "eine", "frage", "antwort"],
    ),
    (
        Language::French,
        &["le", "les", "est", "une", "quel", "quelle", "c'est", "réponse", "pourquoi"],
    ),
];

impl Language {
    pub const ALL: [Language; 8] = [
        Language::English,
        Language::Spanish,
        Language::German,
        Language::French,
        Language::Chinese,
        Language::Arabic,
        Language::Hindi,
        Language::Russian,
    ];

    /// 标准名称
    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::German => "German",
            Language::French => "French",
            Language::Chinese => "Chinese",
            Language::Arabic => "Arabic",
            Language::Hindi => "Hindi",
            Language::Russian => "Russian",
        }
    }

    /// 从名称解析语言（首字母大写后精确匹配）
    pub fn from_name(s: &str) -> Option<Self> {
        let titled = title_case(s.trim());
        Self::ALL.iter().copied().find(|language| language.name() == titled)
    }

    /// 从记录内容探测语言
    ///
    /// 采样前几条记录的字符串字段：先按文字系统区间判断，
    /// 再按拉丁标志词判断，都未命中则回落到英语。
    /// 混合语言的样本可能误判，英语兜底保证总有结果。
    pub fn sniff(records: &[Record]) -> Self {
        let sample = collect_sample(records);

        for (language, ranges) in SCRIPT_RANGES {
            if sample
                .chars()
                .any(|c| ranges.iter().any(|&(lo, hi)| (lo..=hi).contains(&c)))
            {
                return *language;
            }
        }

        let lowered = sample.to_lowercase();
        let words: std::collections::HashSet<&str> = lowered
            .split_whitespace()
            .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\''))
            .filter(|word| !word.is_empty())
            .collect();

        for (language, markers) in LATIN_MARKERS {
            if markers.iter().any(|marker| words.contains(marker)) {
                return *language;
            }
        }

        Language::English
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 拼接采样文本：前几条记录的全部字符串字段值，封顶截断
fn collect_sample(records: &[Record]) -> String {
    let mut sample = String::new();
    for record in records.iter().take(SAMPLE_RECORDS) {
        for value in record.values() {
            if let Value::String(text) = value {
                if !sample.is_empty() {
                    sample.push(' ');
                }
                sample.push_str(text);
            }
            if sample.chars().count() >= SAMPLE_CHAR_CAP {
                return sample.chars().take(SAMPLE_CHAR_CAP).collect();
            }
        }
    }
    sample
}

/// 首字母大写、其余小写
fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}
