//! # QA Validator
//!
//! 一个用于批量校验问答数据集的 Rust 应用程序
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 模型层（Models）
//! - `models/` - 数据结构与领域常量
//! - `Record` / `ValidationAnnotation` - 记录与校验注解
//! - `Language` / `QuestionType` / `KeyMap` - 语言、题型、字段词表
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单条 Record
//! - `LlmEvaluator` - LLM 判卷能力（实现 `Evaluator` trait）
//! - `Translator` - 数据集整体翻译能力
//! - `verdict` - LLM 回复的三段式解析
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整校验流程
//! - `RecordCtx` - 上下文封装（batch_num + record_index）
//! - `ValidateFlow` - 流程编排（映射字段 → 判卷 → 三路注解）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量校验处理器，分批与统计
//! - `orchestrator/dispatcher` - 并发分发器，批内 Semaphore 并发
//!
//! 字段映射（`mapping/`）横跨模型层和流程层：把多语言数据集的
//! 物理键名归一到 question / answer / question_type / language
//! 四个逻辑槽位。
//!
//! ## 模块结构

pub mod config;
pub mod logger;

pub mod mapping;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use mapping::{map_fields, normalize_key, resolve_declared_language, MappedFields};
pub use models::{
    attach_annotation, load_dataset, parse_dataset, render_dataset, write_dataset, DatasetShape,
    KeyMap, Language, QuestionType, Record, ValidationAnnotation, Verdict, VALIDATION_KEY,
};
pub use orchestrator::{dispatch_batch, App};
pub use services::{
    extract_json_span, parse_verdict, Evaluator, LlmEvaluator, Translator, VerdictParseError,
};
pub use workflow::{RecordCtx, ValidateFlow};
