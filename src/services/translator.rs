//! 翻译服务 - 业务能力层（次级能力）
//!
//! 把整条记录（键和值）翻译到目标语言。翻译是尽力而为的：
//! 服务错误、解析失败都回落到原记录，绝不向上抛错。

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{Language, Record};
use crate::services::verdict::extract_json_span;

/// 翻译的 system prompt
const TRANSLATE_PROMPT: &str =
    "You are a professional translator. Translate every key and every value of the JSON object \
     provided by the user into the target language, keeping exactly the same JSON structure. \
     Do not add, remove, or reorder fields. \
     Return valid JSON ONLY, with keys and string values enclosed in double quotes.";

/// 翻译服务
///
/// 职责：
/// - 把单条记录整体翻译到目标语言
/// - 把所有失败折叠成"原样返回"
/// - 不出现 batch_num / record_index
/// - 不关心流程顺序
pub struct Translator {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl Translator {
    /// 创建新的翻译服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 默认翻译目标：从记录内容探测语言
    ///
    /// 记录自己声明的语言只用于校验流程；翻译目标靠内容探测。
    pub fn sniff_target(records: &[Record]) -> Language {
        Language::sniff(records)
    }

    /// 把一条记录翻译到目标语言
    ///
    /// 任何失败（序列化、网络、解析）都返回原记录的副本。
    pub async fn translate_record(&self, record: &Record, target: Language) -> Record {
        let payload = match serde_json::to_string_pretty(record) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("记录序列化失败，跳过翻译: {}", e);
                return record.clone();
            }
        };

        let user_message = format!("Target language: {}\n\nJSON:\n{}", target.name(), payload);

        let reply = match self.send_to_llm(&user_message, TRANSLATE_PROMPT).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("翻译调用失败，返回原记录: {}", e);
                return record.clone();
            }
        };

        match parse_translated(&reply) {
            Some(translated) => translated,
            None => {
                warn!("翻译结果无法解析，返回原记录");
                record.clone()
            }
        }
    }

    /// 批量翻译，输出顺序与输入一致
    pub async fn translate_records(
        &self,
        records: &[Record],
        target: Language,
        max_parallel: usize,
    ) -> Vec<Record> {
        let tasks = records.iter().enumerate().map(|(idx, record)| async move {
            (idx, self.translate_record(record, target).await)
        });

        let mut translated: Vec<(usize, Record)> = stream::iter(tasks)
            .buffer_unordered(max_parallel.max(1))
            .collect()
            .await;

        // 完成顺序不定，按原始下标恢复输入顺序
        translated.sort_by_key(|(idx, _)| *idx);
        translated.into_iter().map(|(_, record)| record).collect()
    }

    /// 通用的 LLM 调用函数
    async fn send_to_llm(&self, user_message: &str, system_message: &str) -> anyhow::Result<String> {
        debug!("调用 LLM API（翻译），模型: {}", self.model_name);

        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(system_message)
            .build()?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(user_message)
            .build()?;

        let messages = vec![
            ChatCompletionRequestMessage::System(system_msg),
            ChatCompletionRequestMessage::User(user_msg),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .temperature(0.0)
            .max_tokens(1000u32)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            anyhow::anyhow!("LLM API 调用失败: {}", e)
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }
}

/// 解析翻译结果：花括号截取后，严格解析失败再试宽松解析
fn parse_translated(reply: &str) -> Option<Record> {
    let span = extract_json_span(reply);

    if let Ok(record) = serde_json::from_str::<Record>(span) {
        return Some(record);
    }

    match json5::from_str::<Record>(span) {
        Ok(record) => Some(record),
        Err(e) => {
            debug!("翻译结果解析失败: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn create_unreachable_translator() -> Translator {
        let config = OpenAIConfig::new()
            .with_api_key("test-key")
            .with_api_base("http://127.0.0.1:1/v1");

        let client = Client::with_config(config);

        Translator {
            client,
            model_name: "gpt-4.1".to_string(),
        }
    }

    fn sample_record() -> Record {
        let mut record = Record::new();
        record.insert("question".to_string(), Value::String("What is 2+2?".to_string()));
        record.insert("answer".to_string(), Value::String("4".to_string()));
        record
    }

    #[test]
    fn test_parse_translated_strict() {
        let reply = r#"{"pregunta": "¿Cuánto es 2+2?", "respuesta": "4"}"#;
        let record = parse_translated(reply).unwrap();

        assert_eq!(record["pregunta"], Value::String("¿Cuánto es 2+2?".to_string()));
    }

    #[test]
    fn test_parse_translated_relaxed_with_wrapper() {
        let reply = "Here is the translation:\n{'pregunta': '¿Por qué?', 'respuesta': 'porque'}";
        let record = parse_translated(reply).unwrap();

        assert_eq!(record.len(), 2);
    }

    #[test]
    fn test_parse_translated_garbage() {
        assert!(parse_translated("not json at all").is_none());
        assert!(parse_translated("").is_none());
    }

    /// 连不上服务时原样返回输入记录
    #[test]
    fn test_translate_falls_back_on_service_failure() {
        let translator = create_unreachable_translator();
        let record = sample_record();

        let translated =
            tokio_test::block_on(translator.translate_record(&record, Language::Spanish));

        assert_eq!(translated, record);
    }

    /// 批量翻译失败时长度与顺序不变
    #[test]
    fn test_translate_records_keeps_length_and_order() {
        let translator = create_unreachable_translator();
        let records: Vec<Record> = (0..4)
            .map(|i| {
                let mut record = Record::new();
                record.insert("question".to_string(), Value::String(format!("q{}", i)));
                record
            })
            .collect();

        let translated =
            tokio_test::block_on(translator.translate_records(&records, Language::French, 2));

        assert_eq!(translated.len(), records.len());
        for (i, record) in translated.iter().enumerate() {
            assert_eq!(record["question"], Value::String(format!("q{}", i)));
        }
    }

    #[test]
    fn test_sniff_target_prefers_content() {
        let mut record = Record::new();
        record.insert("题目".to_string(), Value::String("太阳有多大？".to_string()));

        assert_eq!(Translator::sniff_target(&[record]), Language::Chinese);
    }

    /// 测试真实翻译
    ///
    /// 运行方式：
    /// ```bash
    /// LLM_API_KEY=... cargo test test_translate_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_translate_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env();
        let translator = Translator::new(&config);
        let record = sample_record();

        println!("\n========== 测试真实翻译 ==========");
        println!("原记录: {:?}", record);
        println!("==================================\n");

        let translated = translator.translate_record(&record, Language::Spanish).await;

        println!("\n========== 翻译结果 ==========");
        println!("{:?}", translated);
        println!("==============================\n");

        assert_eq!(translated.len(), record.len());
    }
}
