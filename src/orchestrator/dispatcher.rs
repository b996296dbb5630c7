//! 并发分发器 - 编排层
//!
//! 把一批记录并发送进校验流程，结果按原始顺序收回。

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Semaphore;
use tracing::error;

use crate::models::{attach_annotation, Record, ValidationAnnotation};
use crate::services::Evaluator;
use crate::workflow::{RecordCtx, ValidateFlow};

/// 并发校验一批记录
///
/// - 并发度为 `min(worker_limit, 批大小)`，至少为 1
/// - 每条记录一个任务；结果写进按原始下标寻址的槽位，
///   完成顺序不影响输出顺序
/// - 记录之间零依赖：单个任务崩溃时只降级自己的槽位
///   （原记录加"未通过且未修正"注解），同批其他记录不受影响
///
/// `index_offset` 是本批第一条记录在全量数据集中的下标，仅用于日志。
pub async fn dispatch_batch<E>(
    flow: Arc<ValidateFlow<E>>,
    records: &[Record],
    worker_limit: usize,
    batch_num: usize,
    index_offset: usize,
) -> Result<Vec<Record>>
where
    E: Evaluator + 'static,
{
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let pool_size = worker_limit.min(records.len()).max(1);
    let semaphore = Arc::new(Semaphore::new(pool_size));

    let mut handles = Vec::with_capacity(records.len());

    for (idx, record) in records.iter().enumerate() {
        let permit = semaphore.clone().acquire_owned().await?;
        let flow = flow.clone();
        let record = record.clone();
        let ctx = RecordCtx::new(batch_num, index_offset + idx + 1);

        let handle = tokio::spawn(async move {
            let _permit = permit;
            flow.run(&record, &ctx).await
        });
        handles.push((idx, handle));
    }

    // 等待本批所有任务完成，按下标落位
    let mut slots: Vec<Option<Record>> = vec![None; records.len()];

    for (idx, handle) in handles {
        match handle.await {
            Ok(annotated) => slots[idx] = Some(annotated),
            Err(e) => {
                error!(
                    "[记录 {}] ❌ 校验任务崩溃: {}",
                    index_offset + idx + 1,
                    e
                );
                slots[idx] = Some(degraded_record(
                    &records[idx],
                    format!("worker task failed: {}", e),
                ));
            }
        }
    }

    Ok(slots
        .into_iter()
        .enumerate()
        .map(|(idx, slot)| {
            slot.unwrap_or_else(|| {
                degraded_record(&records[idx], "result slot left unfilled".to_string())
            })
        })
        .collect())
}

/// 任务失败时的降级输出：原记录 + 未通过未修正注解
fn degraded_record(record: &Record, reason: String) -> Record {
    attach_annotation(record.clone(), &ValidationAnnotation::uncorrected(reason))
}
