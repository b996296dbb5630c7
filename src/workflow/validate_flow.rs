//! 记录校验流程 - 流程层
//!
//! 核心职责：定义"一条记录"的完整校验流程
//!
//! 流程顺序：
//! 1. 解析声明语言 → 选键位表 → 映射字段
//! 2. 识别题型 → LLM 判分
//! 3. 按裁决分三路注解（通过 / 已修正 / 未修正）

use serde_json::Value;
use tracing::{info, warn};

use crate::config::Config;
use crate::mapping::{map_fields, resolve_declared_language};
use crate::models::{attach_annotation, QuestionType, Record, ValidationAnnotation};
use crate::services::{Evaluator, LlmEvaluator};
use crate::utils::logging::truncate_text;
use crate::workflow::record_ctx::RecordCtx;

/// 记录校验流程
///
/// - 编排单条记录的完整校验
/// - 不持有任何批量状态
/// - 只依赖判分能力（[`Evaluator`]）
/// - 永不失败：所有异常路径都落在"未通过且未修正"分支
pub struct ValidateFlow<E> {
    evaluator: E,
    verbose_logging: bool,
}

impl ValidateFlow<LlmEvaluator> {
    /// 用配置创建基于 LLM 的校验流程
    pub fn from_config(config: &Config) -> Self {
        Self {
            evaluator: LlmEvaluator::new(config),
            verbose_logging: config.verbose_logging,
        }
    }
}

impl<E: Evaluator> ValidateFlow<E> {
    /// 用指定的判分能力创建校验流程
    pub fn new(evaluator: E, verbose_logging: bool) -> Self {
        Self {
            evaluator,
            verbose_logging,
        }
    }

    /// 校验一条记录，返回带 `_validation` 注解的副本
    pub async fn run(&self, record: &Record, ctx: &RecordCtx) -> Record {
        // 声明语言优先；内容探测只服务于翻译场景
        let language = resolve_declared_language(record);
        let fields = map_fields(record, language);
        let question_type = QuestionType::detect(&fields.question_type);

        self.log_question(ctx, &fields.question);

        if self.verbose_logging {
            info!(
                "[记录 {}] 语言: {}，题型: {}，答案键: {}",
                ctx.record_index, language, question_type, fields.answer_key
            );
        }

        if fields.question.is_empty() {
            // 映射不到题目不算错误，空内容照常送检，由模型判不可答
            warn!("[记录 {}] ⚠️ 未能解析出题目字段", ctx.record_index);
        }

        let verdict = self
            .evaluator
            .evaluate(&fields.question, &fields.answer, question_type)
            .await;

        let mut output = record.clone();

        let annotation = if verdict.valid {
            info!("[记录 {}] ✓ 校验通过", ctx.record_index);
            ValidationAnnotation::passed(verdict.reason)
        } else if let Some(correction) = verdict.correction().map(str::to_string) {
            info!(
                "[记录 {}] 🔧 答案已修正（写回键: {}）",
                ctx.record_index, fields.answer_key
            );
            output.insert(fields.answer_key.clone(), Value::String(correction));
            ValidationAnnotation::corrected(verdict.reason)
        } else {
            warn!(
                "[记录 {}] ⚠️ 校验未通过且无修正: {}",
                ctx.record_index,
                truncate_text(&verdict.reason, 120)
            );
            ValidationAnnotation::uncorrected(verdict.reason)
        };

        attach_annotation(output, &annotation)
    }

    // ========== 日志辅助方法 ==========

    /// 显示题目预览
    fn log_question(&self, ctx: &RecordCtx, question: &str) {
        info!("[记录 {}] 题目: {}", ctx.record_index, truncate_text(question, 80));
    }
}
