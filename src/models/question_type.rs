//! 题型枚举与题型识别

use phf::phf_map;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionType {
    /// 解释/论述题
    Explanation,
    /// 简答题
    ShortAnswer,
    /// 选择题
    MultipleChoice,
    /// 判断题
    TrueFalse,
    /// 未标注题型
    Unspecified,
}

/// 题型同义词表
///
/// 键为规范化（小写、连字符和下划线折叠为空格）后的写法。
static TYPE_SYNONYMS: phf::Map<&'static str, QuestionType> = phf_map! {
    "explanation" => QuestionType::Explanation,
    "explain" => QuestionType::Explanation,
    "essay" => QuestionType::Explanation,
    "open ended" => QuestionType::Explanation,
    "解释" => QuestionType::Explanation,
    "解答题" => QuestionType::Explanation,
    "论述题" => QuestionType::Explanation,
    "explicación" => QuestionType::Explanation,
    "erklärung" => QuestionType::Explanation,
    "explication" => QuestionType::Explanation,
    "short answer" => QuestionType::ShortAnswer,
    "short" => QuestionType::ShortAnswer,
    "fill in the blank" => QuestionType::ShortAnswer,
    "简答" => QuestionType::ShortAnswer,
    "简答题" => QuestionType::ShortAnswer,
    "填空题" => QuestionType::ShortAnswer,
    "respuesta corta" => QuestionType::ShortAnswer,
    "kurzantwort" => QuestionType::ShortAnswer,
    "réponse courte" => QuestionType::ShortAnswer,
    "multiple choice" => QuestionType::MultipleChoice,
    "mcq" => QuestionType::MultipleChoice,
    "choice" => QuestionType::MultipleChoice,
    "选择题" => QuestionType::MultipleChoice,
    "单选题" => QuestionType::MultipleChoice,
    "多选题" => QuestionType::MultipleChoice,
    "opción múltiple" => QuestionType::MultipleChoice,
    "choix multiple" => QuestionType::MultipleChoice,
    "true/false" => QuestionType::TrueFalse,
    "true false" => QuestionType::TrueFalse,
    "true or false" => QuestionType::TrueFalse,
    "judgment" => QuestionType::TrueFalse,
    "判断" => QuestionType::TrueFalse,
    "判断题" => QuestionType::TrueFalse,
    "verdadero/falso" => QuestionType::TrueFalse,
    "wahr/falsch" => QuestionType::TrueFalse,
    "vrai/faux" => QuestionType::TrueFalse,
};

impl QuestionType {
    /// 识别题型标签
    ///
    /// 大小写、首尾空白、连字符/下划线写法不敏感；认不出的标签
    /// 归入 [`QuestionType::Unspecified`]，仍然走通用判分提示词。
    pub fn detect(label: &str) -> Self {
        let normalized = normalize_label(label);
        if normalized.is_empty() {
            return QuestionType::Unspecified;
        }
        TYPE_SYNONYMS
            .get(normalized.as_str())
            .copied()
            .unwrap_or(QuestionType::Unspecified)
    }

    /// 标准名称（用于日志）
    pub fn name(self) -> &'static str {
        match self {
            QuestionType::Explanation => "explanation",
            QuestionType::ShortAnswer => "short answer",
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::TrueFalse => "true/false",
            QuestionType::Unspecified => "unspecified",
        }
    }

    /// 该题型附加的判分规则，拼接在基础 system prompt 之后
    pub fn grading_rule(self) -> &'static str {
        match self {
            QuestionType::Explanation => {
                "This is an explanation question: judge whether the answer explains the \
                 underlying reasoning correctly and completely; tolerate differences in wording."
            }
            QuestionType::ShortAnswer => {
                "This is a short-answer question: judge factual correctness only; \
                 a terse answer is acceptable when it states the right fact or value."
            }
            QuestionType::MultipleChoice => {
                "This is a multiple-choice question: judge whether the chosen option is the \
                 correct one; corrected_answer must name the correct option."
            }
            QuestionType::TrueFalse => {
                "This is a true/false question: judge whether the stated judgment is correct; \
                 corrected_answer must be the opposite judgment when the answer is wrong."
            }
            QuestionType::Unspecified => {
                "The question type is unspecified: judge overall correctness of the answer \
                 against the question."
            }
        }
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 标签规范化：小写、去首尾空白、'-'/'_' 折叠为空格、压缩连续空白
fn normalize_label(label: &str) -> String {
    let folded: String = label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
