//! 判分服务 - 业务能力层
//!
//! 只负责"判一条记录"的能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::models::{QuestionType, Verdict};
use crate::services::verdict::{extract_json_span, parse_verdict};
use crate::utils::logging::truncate_text;

/// 判分的基础 system prompt，题型专属规则拼接在其后
const SYSTEM_PROMPT: &str =
    "You are an expert educator and grader in mathematics, physics, and theoretical subjects. \
     Given a single question and its provided answer, evaluate correctness, \
     reasoning in the same language as the question. \
     Return valid JSON ONLY, with keys and string values enclosed in double quotes, \
     in the form: {\"valid\": bool, \"reason\": str, \"corrected_answer\": str or null}. \
     If valid, corrected_answer must be null. \
     Preserve LaTeX formatting exactly.";

/// 判分能力接口
///
/// 流程层和编排层只依赖这个 trait，测试时换成脚本化实现。
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// 判定一条记录的答案
    ///
    /// 永不失败：服务错误和解析错误都折叠成 invalid 裁决返回。
    async fn evaluate(&self, question: &str, answer: &str, question_type: QuestionType) -> Verdict;
}

/// 基于 LLM 的判分能力
///
/// 职责：
/// - 调用 LLM API 判定单条记录的答案
/// - 把 API 错误与解析错误折叠成兜底裁决
/// - 只处理单条记录
/// - 不出现 Vec<Record>
/// - 不出现 batch_num / record_index
/// - 不关心流程顺序
pub struct LlmEvaluator {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl LlmEvaluator {
    /// 创建新的判分能力
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
        }
    }

    /// 通用的 LLM 调用函数
    ///
    /// # 参数
    /// - `user_message`: 用户消息内容
    /// - `system_message`: 系统消息
    ///
    /// # 返回
    /// 返回 LLM 的响应内容（字符串）
    pub async fn send_to_llm(
        &self,
        user_message: &str,
        system_message: &str,
    ) -> anyhow::Result<String> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("用户消息长度: {} 字符", user_message.len());

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

        // 判分要求确定性输出，温度固定为 0
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

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| anyhow::anyhow!("LLM 返回内容为空"))?;

        Ok(content.trim().to_string())
    }

    /// 构建判分消息
    ///
    /// 返回 (user_message, system_message)
    fn build_grading_messages(
        &self,
        question: &str,
        answer: &str,
        question_type: QuestionType,
    ) -> (String, String) {
        let system_message = format!("{} {}", SYSTEM_PROMPT, question_type.grading_rule());
        let user_message = format!("Question:\n{}\n\nAnswer:\n{}", question, answer);
        (user_message, system_message)
    }
}

#[async_trait]
impl Evaluator for LlmEvaluator {
    /// 判定一条记录的答案
    ///
    /// 调用本身没有超时也不重试：挂起的请求只占住自己的并发槽位，
    /// 不影响同批其他记录。
    async fn evaluate(&self, question: &str, answer: &str, question_type: QuestionType) -> Verdict {
        debug!(
            "开始判分，题型: {}，题目: {}",
            question_type.name(),
            truncate_text(question, 80)
        );

        let (user_message, system_message) =
            self.build_grading_messages(question, answer, question_type);

        let reply = match self.send_to_llm(&user_message, &system_message).await {
            Ok(reply) => reply,
            Err(e) => return Verdict::service_failure(e),
        };

        debug!("LLM 原始响应: {}", truncate_text(&reply, 150));

        match parse_verdict(extract_json_span(&reply)) {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!("无法解析 LLM 响应: {}", e);
                Verdict::unparseable(e)
            }
        }
    }
}
