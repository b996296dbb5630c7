//! 键名规范化
//!
//! 所有键名查找都以规范化结果为相等基准：Unicode NFKC 折叠、
//! 去首尾空白、转小写。全角半角、大小写、组合/预组合写法
//! 不同但视觉相同的键因此比较相等。

use unicode_normalization::UnicodeNormalization;

/// 规范化一个键名（纯函数，无失败路径）
pub fn normalize_key(key: &str) -> String {
    let folded: String = key.nfkc().collect();
    folded.trim().to_lowercase()
}
