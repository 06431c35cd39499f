//! # Extract 模块
//!
//! 从元素的初始文本中提取数值和装饰文本。
//!
//! ```text
//! "Clients: 120+"  --percent 50-->  start 60, end 120, decoration "Clients: +"
//! "-3.5 kg"        --percent 70-->  start -2.45, end -3.5, decoration " kg"
//! ```
//!
//! 提取只在挂载时执行一次，之后每一帧只重新格式化数值。

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// 第一个带符号十进制数
static NUMBER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"-?[0-9]*\.?[0-9]+").unwrap_or_else(|e| panic!("数字正则无效: {e}"))
});

/// 计数器目标
///
/// 挂载时从文本推导，之后不可变。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterTarget {
    /// 去掉第一个数字后的原始文本
    pub decoration: String,
    /// 动画起点
    pub start_value: f64,
    /// 动画终点（原始显示的数字）
    pub end_value: f64,
}

impl CounterTarget {
    /// 从文本和百分比推导目标
    ///
    /// 文本会先去除首尾空白。没有数字时数值为 0，装饰文本为整段文本。
    pub fn new(text: &str, percent: f64) -> Self {
        let (base, decoration) = split_number(text.trim());
        Self {
            decoration,
            start_value: base * (percent / 100.0),
            end_value: base,
        }
    }

    /// 格式化某个值
    pub fn format(&self, value: f64) -> String {
        format_value(value, &self.decoration)
    }
}

/// 拆分出第一个数字和剩余文本
pub fn split_number(text: &str) -> (f64, String) {
    match NUMBER_PATTERN.find(text) {
        Some(m) => {
            let base = m.as_str().parse::<f64>().unwrap_or(0.0);
            let mut decoration = String::with_capacity(text.len() - m.len());
            decoration.push_str(&text[..m.start()]);
            decoration.push_str(&text[m.end()..]);
            (base, decoration)
        }
        None => (0.0, text.to_string()),
    }
}

/// 四舍五入（.5 向正无穷方向）
///
/// 小数部分 >= 0.5 时进位（0.49999999999999994 得 0）。
pub fn round_half_up(value: f64) -> f64 {
    let floor = value.floor();
    let rounded = if value - floor >= 0.5 { floor + 1.0 } else { floor };
    // 避免输出 "-0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// 渲染为 `round(value) + decoration`
pub fn format_value(value: f64, decoration: &str) -> String {
    format!("{}{}", round_half_up(value), decoration)
}
