//! 批量校验处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责数据集的批量校验和结果落盘。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：启动日志、构建校验流程（`ValidateFlow`）
//! 2. **数据集加载**：读取输入 JSON，单对象自动提升为单元素数组
//! 3. **分批处理**：按固定批大小切片，每批完成后再开始下一批
//! 4. **并发控制**：批内并发交给 dispatcher 的 Semaphore
//! 5. **全局统计**：汇总通过 / 已修正 / 未能修正三路计数
//!
//! ## 设计特点
//!
//! - **顶层编排**：不处理单条记录的细节
//! - **批间串行**：压住峰值并发，进度可预期
//! - **向下委托**：委托 dispatcher 并发处理单个批次
//! - **记录级失败不中止**：只有数据集 I/O 错误会让程序退出

use crate::config::Config;
use crate::models::{load_dataset, write_dataset, Record, VALIDATION_KEY};
use crate::orchestrator::dispatcher::dispatch_batch;
use crate::services::LlmEvaluator;
use crate::utils::logging::init_log_file;
use crate::workflow::ValidateFlow;
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: Arc<ValidateFlow<LlmEvaluator>>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        // 构建校验流程（持有 LLM 客户端）
        let flow = Arc::new(ValidateFlow::from_config(&config));

        Ok(Self { config, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        // 加载待校验的数据集
        let (records, shape) = load_dataset(&self.config.input_json).await?;

        if records.is_empty() {
            // 空数据集也要落盘，调用方在约定的输出路径上总能拿到本次结果
            warn!("⚠️ 数据集里没有记录，原样写出空数据集");
            write_dataset(&self.config.output_json, &records, shape).await?;
            info!("📄 校验结果已写入: {}", self.config.output_json);
            return Ok(());
        }

        let total = records.len();
        log_dataset_loaded(total, self.config.batch_size.max(1));

        // 分批校验所有记录
        let start = Instant::now();
        let processed = self.process_all_records(&records).await?;
        let elapsed = start.elapsed().as_secs_f64();

        // 输出最终统计
        let stats = summarize(&processed);
        print_final_stats(&stats, elapsed, &self.config);

        // 写出结果（保持输入的形状和键序）
        write_dataset(&self.config.output_json, &processed, shape).await?;
        info!("📄 校验结果已写入: {}", self.config.output_json);

        Ok(())
    }

    /// 分批处理所有记录
    async fn process_all_records(&self, records: &[Record]) -> Result<Vec<Record>> {
        let batch_size = self.config.batch_size.max(1);
        let total = records.len();
        let total_batches = (total + batch_size - 1) / batch_size;

        let mut processed: Vec<Record> = Vec::with_capacity(total);

        for (batch_idx, batch) in records.chunks(batch_size).enumerate() {
            let batch_num = batch_idx + 1;
            let index_offset = processed.len();

            log_batch_start(
                batch_num,
                total_batches,
                index_offset + 1,
                index_offset + batch.len(),
                total,
            );

            // 处理本批
            let annotated = dispatch_batch(
                self.flow.clone(),
                batch,
                self.config.max_workers,
                batch_num,
                index_offset,
            )
            .await?;

            processed.extend(annotated);

            log_batch_complete(batch_num, processed.len(), total);
        }

        Ok(processed)
    }
}

/// 处理统计
#[derive(Debug, Default)]
struct ProcessingStats {
    total: usize,
    valid: usize,
    corrected: usize,
    failed: usize,
}

/// 汇总三路注解计数
///
/// 通过 / 已修正 / 未能修正互斥，三者之和等于总数。
fn summarize(processed: &[Record]) -> ProcessingStats {
    let mut stats = ProcessingStats {
        total: processed.len(),
        ..Default::default()
    };

    for record in processed {
        let annotation = record.get(VALIDATION_KEY);
        let valid = annotation
            .and_then(|a| a.get("valid"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let corrected = annotation
            .and_then(|a| a.get("corrected"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        if valid {
            stats.valid += 1;
        } else if corrected {
            stats.corrected += 1;
        } else {
            stats.failed += 1;
        }
    }

    stats
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 批量答案校验模式");
    info!("📊 批大小: {}，批内并发: {}", config.batch_size, config.max_workers);
    info!("🤖 校验模型: {}", config.llm_model_name);
    info!("{}", "=".repeat(60));
}

fn log_dataset_loaded(total: usize, batch_size: usize) {
    info!("✓ 加载到 {} 条待校验记录", total);
    info!("📋 将以每批 {} 条的方式处理", batch_size);
    info!("💡 每批完成后再开始下一批\n");
}

fn log_batch_start(batch_num: usize, total_batches: usize, start: usize, end: usize, total: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📦 开始处理第 {}/{} 批", batch_num, total_batches);
    info!("📄 本批记录: {}-{} / 共 {} 条", start, end, total);
    info!("{}", "=".repeat(60));
}

fn log_batch_complete(batch_num: usize, done: usize, total: usize) {
    info!("\n{}", "─".repeat(60));
    info!("✓ 第 {} 批完成，已处理 {}/{} 条记录", batch_num, done, total);
    info!("{}", "─".repeat(60));
}

fn print_final_stats(stats: &ProcessingStats, elapsed_secs: f64, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部校验完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 答案通过: {}/{}", stats.valid, stats.total);
    info!("🔧 已修正: {}", stats.corrected);
    info!("❌ 未能修正: {}", stats.failed);
    info!("⏱️ 总耗时: {:.2} 秒", elapsed_secs);
    info!("{}", "=".repeat(60));
    info!("\n日志已保存至: {}", config.output_log_file);
}
