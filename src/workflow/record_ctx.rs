//! 记录处理上下文
//!
//! 封装"我正在处理第几批的第几条记录"这一信息

use std::fmt::Display;

/// 记录处理上下文
///
/// 只用于日志显示，不参与任何业务判断
#[derive(Debug, Clone, Copy)]
pub struct RecordCtx {
    /// 批次编号（从 1 开始）
    pub batch_num: usize,

    /// 记录在全量数据集中的序号（从 1 开始）
    pub record_index: usize,
}

impl RecordCtx {
    /// 创建新的记录上下文
    pub fn new(batch_num: usize, record_index: usize) -> Self {
        Self {
            batch_num,
            record_index,
        }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[批次#{} 记录#{}]", self.batch_num, self.record_index)
    }
}
