//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量调度和全局统计，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量校验处理器
//! - 管理应用生命周期（初始化、运行、落盘）
//! - 加载数据集（Vec<Record>，保留输入形状）
//! - 按固定批大小切片，批间串行
//! - 汇总三路统计（通过 / 已修正 / 未能修正）
//!
//! ### `dispatcher` - 并发分发器
//! - 批内并发（Semaphore + tokio::spawn）
//! - 结果按原始下标落位，完成顺序不影响输出顺序
//! - 单任务崩溃只降级自己的槽位
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<Record>，分批)
//!     ↓
//! dispatcher (并发处理一批)
//!     ↓
//! workflow::ValidateFlow (处理单条 Record)
//!     ↓
//! services (能力层：evaluator / translator / verdict)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批次，dispatcher 管并发
//! 2. **向下依赖**：编排层 → workflow → services
//! 3. **无业务逻辑**：只做调度和统计，不做具体校验判断

pub mod batch_processor;
pub mod dispatcher;

// 重新导出主要类型
pub use batch_processor::App;
pub use dispatcher::dispatch_batch;
