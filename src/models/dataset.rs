//! 数据集读写
//!
//! 输入可以是记录数组，也可以是单个记录对象；
//! 单对象提升为单元素列表处理，写出时还原为对象。

use anyhow::{Context, Result};
use serde_json::Value;
use tokio::fs;

use crate::models::Record;

/// 数据集的顶层形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetShape {
    /// 顶层是记录数组
    Array,
    /// 顶层是单个记录对象
    SingleObject,
}

/// 解析数据集文本
pub fn parse_dataset(content: &str) -> Result<(Vec<Record>, DatasetShape)> {
    let root: Value = serde_json::from_str(content).context("无法解析 JSON 数据集")?;

    match root {
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for (idx, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(map) => records.push(map),
                    other => anyhow::bail!(
                        "数据集第 {} 个元素不是 JSON 对象（实际是 {}）",
                        idx + 1,
                        value_kind(&other)
                    ),
                }
            }
            Ok((records, DatasetShape::Array))
        }
        Value::Object(map) => Ok((vec![map], DatasetShape::SingleObject)),
        other => anyhow::bail!("数据集顶层必须是数组或对象（实际是 {}）", value_kind(&other)),
    }
}

/// 渲染数据集文本（2 空格缩进，非 ASCII 原样输出）
pub fn render_dataset(records: &[Record], shape: DatasetShape) -> Result<String> {
    let rendered = match shape {
        DatasetShape::SingleObject if records.len() == 1 => {
            serde_json::to_string_pretty(&records[0])
        }
        _ => serde_json::to_string_pretty(records),
    }
    .context("无法序列化结果数据集")?;
    Ok(rendered)
}

/// 读取数据集文件
pub async fn load_dataset(path: &str) -> Result<(Vec<Record>, DatasetShape)> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取数据集文件: {}", path))?;
    parse_dataset(&content)
}

/// 写出结果数据集
pub async fn write_dataset(path: &str, records: &[Record], shape: DatasetShape) -> Result<()> {
    let rendered = render_dataset(records, shape)?;
    fs::write(path, rendered)
        .await
        .with_context(|| format!("无法写入结果文件: {}", path))?;
    Ok(())
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
