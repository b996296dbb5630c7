//! 校验管线集成测试
//!
//! 用脚本化的 Evaluator 替身驱动完整的 流程层 + 编排层，
//! 不依赖真实 LLM 服务。题目文本里的标记决定裁决走向：
//!
//! - `[对]`   答案正确
//! - `[可修]` 答案错误，给出修正
//! - `[崩]`   模拟服务调用失败（被吸收为兜底裁决）
//! - 其他     答案错误，无修正

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use qa_validator::{
    dispatch_batch, parse_dataset, render_dataset, Evaluator, QuestionType, Record, ValidateFlow,
    Verdict, VALIDATION_KEY,
};

/// 脚本化判卷替身
///
/// 按题目内容出裁决；睡一段由内容哈希决定的抖动时间，
/// 让任务以乱序完成，检验结果落位是否仍按原始顺序。
struct ScriptedEvaluator;

fn jitter_ms(text: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    text.hash(&mut hasher);
    hasher.finish() % 40
}

#[async_trait]
impl Evaluator for ScriptedEvaluator {
    async fn evaluate(&self, question: &str, answer: &str, _question_type: QuestionType) -> Verdict {
        tokio::time::sleep(Duration::from_millis(jitter_ms(question))).await;

        if question.contains("[崩]") {
            return Verdict::service_failure("connection refused");
        }
        if question.contains("[对]") {
            return Verdict {
                valid: true,
                reason: "answer is correct".to_string(),
                corrected_answer: None,
            };
        }
        if question.contains("[可修]") {
            return Verdict {
                valid: false,
                reason: "answer is wrong".to_string(),
                corrected_answer: Some(format!("corrected({})", answer)),
            };
        }
        Verdict {
            valid: false,
            reason: "answer is wrong and beyond repair".to_string(),
            corrected_answer: None,
        }
    }
}

fn scripted_flow() -> Arc<ValidateFlow<ScriptedEvaluator>> {
    Arc::new(ValidateFlow::new(ScriptedEvaluator, false))
}

fn record(question: &str, answer: &str) -> Record {
    let mut r = Record::new();
    r.insert("question".to_string(), Value::String(question.to_string()));
    r.insert("answer".to_string(), Value::String(answer.to_string()));
    r
}

#[tokio::test]
async fn test_batch_keeps_input_order_under_jittered_concurrency() {
    let flow = scripted_flow();

    // 20 条记录、5 个并发，抖动睡眠保证完成顺序和提交顺序不同
    let records: Vec<Record> = (0..20)
        .map(|i| {
            let mut r = record(&format!("[对] 第 {} 题", i), "42");
            r.insert("seq".to_string(), Value::from(i));
            r
        })
        .collect();

    let output = dispatch_batch(flow, &records, 5, 1, 0)
        .await
        .expect("批次调度不应失败");

    assert_eq!(output.len(), 20);
    for (i, rec) in output.iter().enumerate() {
        // 每个下标恰好收到自己的记录
        assert_eq!(rec["seq"], Value::from(i as u64), "第 {} 个槽位错位", i);
        assert_eq!(rec[VALIDATION_KEY]["valid"], Value::Bool(true));
        // 注解总在最后一个键位
        assert_eq!(rec.keys().last().map(|k| k.as_str()), Some(VALIDATION_KEY));
    }
}

#[tokio::test]
async fn test_three_way_annotation_shapes() {
    let flow = scripted_flow();

    let records = vec![
        record("[对] 1+1=?", "2"),
        record("[可修] 1+1=?", "3"),
        record("无标记 1+1=?", "5"),
    ];

    let output = dispatch_batch(flow, &records, 3, 1, 0)
        .await
        .expect("批次调度不应失败");

    // 通过：valid=true，不携带 corrected 字段
    let passed = &output[0][VALIDATION_KEY];
    assert_eq!(passed["valid"], Value::Bool(true));
    assert!(passed.get("corrected").is_none());
    assert_eq!(output[0]["answer"], Value::String("2".to_string()));

    // 已修正：valid=false + corrected=true，答案被替换
    let fixed = &output[1][VALIDATION_KEY];
    assert_eq!(fixed["valid"], Value::Bool(false));
    assert_eq!(fixed["corrected"], Value::Bool(true));
    assert_eq!(output[1]["answer"], Value::String("corrected(3)".to_string()));

    // 未能修正：valid=false + corrected=false，答案原样保留
    let failed = &output[2][VALIDATION_KEY];
    assert_eq!(failed["valid"], Value::Bool(false));
    assert_eq!(failed["corrected"], Value::Bool(false));
    assert_eq!(output[2]["answer"], Value::String("5".to_string()));
}

#[tokio::test]
async fn test_correction_lands_on_localized_answer_key() {
    let flow = scripted_flow();

    // 西班牙语记录：修正必须写回 respuesta，不能冒出英文 answer 键
    let mut rec = Record::new();
    rec.insert(
        "pregunta".to_string(),
        Value::String("[可修] ¿Cuánto es 2+2?".to_string()),
    );
    rec.insert("respuesta".to_string(), Value::String("5".to_string()));
    rec.insert("idioma".to_string(), Value::String("Spanish".to_string()));

    let output = dispatch_batch(flow, &[rec], 1, 1, 0)
        .await
        .expect("批次调度不应失败");

    assert_eq!(
        output[0]["respuesta"],
        Value::String("corrected(5)".to_string())
    );
    assert!(output[0].get("answer").is_none());
}

#[tokio::test]
async fn test_untouched_fields_survive_byte_for_byte() {
    let flow = scripted_flow();

    // 额外字段：嵌套对象、数字、带 LaTeX 反斜杠的字符串
    let mut rec = record("[对] 求导", "$\\frac{d}{dx}x^2 = 2x$");
    rec.insert("difficulty".to_string(), Value::from(3));
    rec.insert(
        "meta".to_string(),
        serde_json::json!({"source": "教材", "page": 42}),
    );

    let original = rec.clone();
    let output = dispatch_batch(flow, &[rec], 1, 1, 0)
        .await
        .expect("批次调度不应失败");

    // 原有键逐一原样保留，顺序不变
    let out_keys: Vec<&str> = output[0].keys().map(|k| k.as_str()).collect();
    let mut expected_keys: Vec<&str> = original.keys().map(|k| k.as_str()).collect();
    expected_keys.push(VALIDATION_KEY);
    assert_eq!(out_keys, expected_keys);

    for (key, value) in &original {
        assert_eq!(output[0].get(key), Some(value), "字段 {} 被改动", key);
    }
}

#[tokio::test]
async fn test_revalidation_keeps_sibling_key_order() {
    let flow = scripted_flow();

    // 已带旧注解的记录再次校验：旧注解换新并挪到末尾，
    // 其余键的相对顺序不动
    let mut rec = Record::new();
    rec.insert(
        "question".to_string(),
        Value::String("[对] 再校验一次".to_string()),
    );
    rec.insert(
        VALIDATION_KEY.to_string(),
        serde_json::json!({"valid": false, "reason": "旧", "corrected": false}),
    );
    rec.insert("answer".to_string(), Value::String("42".to_string()));
    rec.insert("difficulty".to_string(), Value::from(2));

    let output = dispatch_batch(flow, &[rec], 1, 1, 0)
        .await
        .expect("批次调度不应失败");

    let keys: Vec<&str> = output[0].keys().map(|k| k.as_str()).collect();
    assert_eq!(keys, ["question", "answer", "difficulty", VALIDATION_KEY]);
    assert_eq!(output[0][VALIDATION_KEY]["valid"], Value::Bool(true));
}

#[tokio::test]
async fn test_single_failure_stays_isolated() {
    let flow = scripted_flow();

    let records = vec![
        record("[对] 甲", "a"),
        record("[崩] 乙", "b"),
        record("[对] 丙", "c"),
        record("[对] 丁", "d"),
    ];

    let output = dispatch_batch(flow, &records, 4, 1, 0)
        .await
        .expect("批次调度不应失败");

    // 失败记录降级为"未能修正"，理由里带诊断信息
    let broken = &output[1][VALIDATION_KEY];
    assert_eq!(broken["valid"], Value::Bool(false));
    assert_eq!(broken["corrected"], Value::Bool(false));
    let reason = broken["reason"].as_str().unwrap_or_default();
    assert!(reason.contains("LLM API error"), "理由缺少诊断: {}", reason);

    // 同批其他记录不受影响
    for idx in [0, 2, 3] {
        assert_eq!(output[idx][VALIDATION_KEY]["valid"], Value::Bool(true));
    }
}

#[tokio::test]
async fn test_dataset_roundtrip_through_pipeline() {
    let flow = scripted_flow();

    // 单对象输入提升为单元素数组处理，落盘时还原为单对象
    let input = r#"{"question": "[对] 1+1=?", "answer": "2", "难度": "简单"}"#;
    let (records, shape) = parse_dataset(input).expect("解析数据集不应失败");
    assert_eq!(records.len(), 1);

    let output = dispatch_batch(flow, &records, 1, 1, 0)
        .await
        .expect("批次调度不应失败");

    let rendered = render_dataset(&output, shape).expect("渲染数据集不应失败");

    // 输出仍是单个对象，非 ASCII 不转义，注解在最后
    assert!(rendered.trim_start().starts_with('{'));
    assert!(rendered.contains("难度"));
    assert!(!rendered.contains("\\u"));

    let reparsed: Value = serde_json::from_str(&rendered).expect("输出应是合法 JSON");
    assert_eq!(reparsed["question"], Value::String("[对] 1+1=?".to_string()));
    assert_eq!(reparsed[VALIDATION_KEY]["valid"], Value::Bool(true));
}

#[tokio::test]
async fn test_multi_batch_offsets_line_up() {
    let flow = scripted_flow();

    // 手工分两批调度，检验 index_offset 不影响结果顺序
    let records: Vec<Record> = (0..7)
        .map(|i| {
            let mut r = record(&format!("[对] 第 {} 题", i), "x");
            r.insert("seq".to_string(), Value::from(i));
            r
        })
        .collect();

    let mut processed: Vec<Record> = Vec::new();
    for (batch_idx, batch) in records.chunks(3).enumerate() {
        let offset = processed.len();
        let annotated = dispatch_batch(flow.clone(), batch, 2, batch_idx + 1, offset)
            .await
            .expect("批次调度不应失败");
        processed.extend(annotated);
    }

    assert_eq!(processed.len(), 7);
    for (i, rec) in processed.iter().enumerate() {
        assert_eq!(rec["seq"], Value::from(i as u64));
    }
}

#[tokio::test]
#[ignore] // 默认忽略，需要手动运行：cargo test -- --ignored
async fn test_validate_real_dataset() {
    use qa_validator::{logger, App, Config};

    // 初始化日志
    logger::init();

    // 加载配置（INPUT_JSON / LLM_API_KEY 等从环境变量读取）
    let config = Config::from_env();

    println!("========== 真实数据集校验 ==========");
    println!("输入: {}", config.input_json);
    println!("模型: {}", config.llm_model_name);

    // 初始化并运行完整应用
    let app = App::initialize(config).await.expect("应用初始化失败");
    app.run().await.expect("校验运行失败");
}
