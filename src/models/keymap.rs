//! 字段键位表
//!
//! 每种语言一张首选键位表，外加跨语言的兜底词表。
//! 新增语言只需要在这里补表项，不需要新代码路径。

use phf::phf_map;

use crate::models::Language;

/// 单个语言的字段键位
#[derive(Debug, Clone, Copy)]
pub struct KeyMap {
    pub question: &'static str,
    pub answer: &'static str,
    pub question_type: &'static str,
    pub language: &'static str,
}

/// 英语键位（语言无法识别时的兜底）
pub static ENGLISH_KEYMAP: KeyMap = KeyMap {
    question: "question",
    answer: "answer",
    question_type: "question_type",
    language: "language",
};

/// 各语言的首选键位，键为标准语言名
///
/// 表中的键名都已是规范化写法（小写）。
pub static KEYMAPS: phf::Map<&'static str, KeyMap> = phf_map! {
    "English" => KeyMap {
        question: "question",
        answer: "answer",
        question_type: "question_type",
        language: "language",
    },
    "Spanish" => KeyMap {
        question: "pregunta",
        answer: "respuesta",
        question_type: "tipo_de_pregunta",
        language: "idioma",
    },
    "German" => KeyMap {
        question: "frage",
        answer: "antwort",
        question_type: "fragetyp",
        language: "sprache",
    },
    "French" => KeyMap {
        question: "question",
        answer: "réponse",
        question_type: "type_de_question",
        language: "langue",
    },
    "Chinese" => KeyMap {
        question: "问题",
        answer: "答案",
        question_type: "题型",
        language: "语言",
    },
    "Arabic" => KeyMap {
        question: "سؤال",
        answer: "إجابة",
        question_type: "نوع_السؤال",
        language: "لغة",
    },
    "Hindi" => KeyMap {
        question: "प्रश्न",
        answer: "उत्तर",
        question_type: "प्रश्न_प्रकार",
        language: "भाषा",
    },
    "Russian" => KeyMap {
        question: "вопрос",
        answer: "ответ",
        question_type: "тип_вопроса",
        language: "язык",
    },
};

/// 取语言对应的键位表
pub fn keymap_for(language: Language) -> &'static KeyMap {
    KEYMAPS.get(language.name()).unwrap_or(&ENGLISH_KEYMAP)
}

/// 记录中的逻辑字段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSlot {
    Question,
    Answer,
    QuestionType,
    Language,
}

/// 各字段的跨语言兜底键名
///
/// 首选键位未命中时按顺序逐个探测；混入常见的英文缩写，
/// 覆盖字段命名不一致的数据集。
static QUESTION_FALLBACKS: &[&str] = &[
    "question", "pregunta", "frage", "问题", "题目", "سؤال", "प्रश्न", "вопрос", "query", "prompt", "q",
];

static ANSWER_FALLBACKS: &[&str] = &[
    "answer", "respuesta", "antwort", "réponse", "答案", "回答", "إجابة", "उत्तर", "ответ", "solution", "a",
];

static TYPE_FALLBACKS: &[&str] = &[
    "question_type", "type", "tipo_de_pregunta", "tipo", "fragetyp", "type_de_question",
    "题型", "类型", "نوع_السؤال", "प्रश्न_प्रकार", "тип_вопроса", "qtype", "category",
];

static LANGUAGE_FALLBACKS: &[&str] = &[
    "language", "idioma", "sprache", "langue", "语言", "لغة", "भाषा", "язык", "lang", "locale",
];

impl FieldSlot {
    /// 该字段的兜底键名（按优先级）
    pub fn fallbacks(self) -> &'static [&'static str] {
        match self {
            FieldSlot::Question => QUESTION_FALLBACKS,
            FieldSlot::Answer => ANSWER_FALLBACKS,
            FieldSlot::QuestionType => TYPE_FALLBACKS,
            FieldSlot::Language => LANGUAGE_FALLBACKS,
        }
    }
}
