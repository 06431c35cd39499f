//! # Config 模块
//!
//! 计数器选项解析，把用户传入的任意选项规范化为 [`CounterConfig`]。
//!
//! ## 回退规则
//!
//! 1. 有限数字：直接使用
//! 2. 字符串：按浮点前缀解析（`"12px"` → 12），并给出"已转换"诊断
//! 3. 其他值或缺省：使用默认值，并给出诊断
//!
//! 解析从不失败，总是返回可用的配置。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticResult};

/// 默认起始百分比
pub const DEFAULT_PERCENT: f64 = 70.0;
/// 默认动画时长（毫秒）
pub const DEFAULT_DURATION_MS: f64 = 2000.0;
/// 默认启动延迟（毫秒）
pub const DEFAULT_DELAY_MS: f64 = 0.0;

/// 重复模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepeatMode {
    /// 只在首次出现时播放一次
    #[default]
    None,
    /// 显示值跟随可见比例连续变化
    Always,
    /// 完全隐藏后再次出现时重播
    OnReappear,
    /// 反向滚动且从同一侧重新出现时重播
    OnReverseScroll,
}

impl RepeatMode {
    /// 所有模式
    pub const ALL: [RepeatMode; 4] = [
        RepeatMode::None,
        RepeatMode::Always,
        RepeatMode::OnReappear,
        RepeatMode::OnReverseScroll,
    ];

    /// 选项中使用的字面量
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Always => "always",
            Self::OnReappear => "onReappear",
            Self::OnReverseScroll => "onReverseScroll",
        }
    }

    /// 先精确匹配，再忽略大小写匹配
    pub fn parse_lenient(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .or_else(|| {
                Self::ALL
                    .into_iter()
                    .find(|mode| mode.as_str().eq_ignore_ascii_case(value))
            })
    }
}

impl fmt::Display for RepeatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepeatMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_lenient(s).ok_or_else(|| format!("未知的 repeat 模式: {}", s))
    }
}

/// 原始选项值
///
/// 调用方可能传入数字、数字字符串或任意其他值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// 数字
    Number(f64),
    /// 字符串
    Text(String),
    /// 其他 JSON 值（布尔、数组、对象、null）
    Other(serde_json::Value),
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => write!(f, "\"{}\"", s),
            Self::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<RepeatMode> for OptionValue {
    fn from(value: RepeatMode) -> Self {
        Self::Text(value.as_str().to_string())
    }
}

/// 用户传入的计数器选项
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterOptions {
    /// 起始值占结束值的百分比
    #[serde(default)]
    pub percent: Option<OptionValue>,
    /// 动画时长（毫秒）
    #[serde(default)]
    pub duration: Option<OptionValue>,
    /// 启动延迟（毫秒）
    #[serde(default)]
    pub delay: Option<OptionValue>,
    /// 重复模式
    #[serde(default)]
    pub repeat: Option<OptionValue>,
}

impl CounterOptions {
    /// 设置 percent
    pub fn with_percent(mut self, value: impl Into<OptionValue>) -> Self {
        self.percent = Some(value.into());
        self
    }

    /// 设置 duration
    pub fn with_duration(mut self, value: impl Into<OptionValue>) -> Self {
        self.duration = Some(value.into());
        self
    }

    /// 设置 delay
    pub fn with_delay(mut self, value: impl Into<OptionValue>) -> Self {
        self.delay = Some(value.into());
        self
    }

    /// 设置 repeat
    pub fn with_repeat(mut self, value: impl Into<OptionValue>) -> Self {
        self.repeat = Some(value.into());
        self
    }
}

/// 规范化后的计数器配置
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// 起始百分比（可以为负，不限制范围）
    pub percent: f64,
    /// 动画时长（毫秒，> 0）
    pub duration_ms: f64,
    /// 启动延迟（毫秒，>= 0）
    pub delay_ms: f64,
    /// 重复模式
    pub repeat: RepeatMode,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            percent: DEFAULT_PERCENT,
            duration_ms: DEFAULT_DURATION_MS,
            delay_ms: DEFAULT_DELAY_MS,
            repeat: RepeatMode::None,
        }
    }
}

/// 解析结果：配置 + 诊断
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub config: CounterConfig,
    pub diagnostics: DiagnosticResult,
}

impl CounterConfig {
    /// 解析原始选项
    ///
    /// 每个字段独立回退，任何字段无效都不会阻止其他字段生效。
    /// 诊断只收集不输出，由调用方决定是否写入日志。
    pub fn resolve(options: &CounterOptions) -> ResolvedConfig {
        let mut diagnostics = DiagnosticResult::new();

        let percent = parse_number(
            options.percent.as_ref(),
            DEFAULT_PERCENT,
            "percent",
            &mut diagnostics,
        );

        let duration = parse_number(
            options.duration.as_ref(),
            DEFAULT_DURATION_MS,
            "duration",
            &mut diagnostics,
        );
        let duration_ms = if duration > 0.0 {
            duration
        } else {
            diagnostics.push(Diagnostic::warn(
                DiagnosticKind::NonPositive,
                "duration",
                format!(
                    "参数 \"duration\" 必须为正数（{}），使用默认值: {}",
                    duration, DEFAULT_DURATION_MS
                ),
            ));
            DEFAULT_DURATION_MS
        };

        let delay = parse_number(
            options.delay.as_ref(),
            DEFAULT_DELAY_MS,
            "delay",
            &mut diagnostics,
        );
        let delay_ms = if delay >= 0.0 {
            delay
        } else {
            diagnostics.push(Diagnostic::warn(
                DiagnosticKind::Negative,
                "delay",
                format!(
                    "参数 \"delay\" 不能为负数（{}），使用默认值: {}",
                    delay, DEFAULT_DELAY_MS
                ),
            ));
            DEFAULT_DELAY_MS
        };

        let repeat = parse_repeat(options.repeat.as_ref(), &mut diagnostics);

        ResolvedConfig {
            config: CounterConfig {
                percent,
                duration_ms,
                delay_ms,
                repeat,
            },
            diagnostics,
        }
    }
}

fn parse_number(
    value: Option<&OptionValue>,
    default: f64,
    field: &'static str,
    diagnostics: &mut DiagnosticResult,
) -> f64 {
    match value {
        Some(OptionValue::Number(n)) if n.is_finite() => *n,
        Some(OptionValue::Text(s)) => match parse_float_prefix(s).filter(|n| n.is_finite()) {
            Some(parsed) => {
                diagnostics.push(Diagnostic::warn(
                    DiagnosticKind::CoercedString,
                    field,
                    format!(
                        "参数 \"{}\" 以字符串传入（\"{}\"），使用转换后的值: {}",
                        field, s, parsed
                    ),
                ));
                parsed
            }
            None => {
                push_invalid(field, value, default, diagnostics);
                default
            }
        },
        Some(other) => {
            push_invalid(field, Some(other), default, diagnostics);
            default
        }
        None => {
            diagnostics.push(Diagnostic::info(
                DiagnosticKind::Missing,
                field,
                format!("未设置参数 \"{}\"，使用默认值: {}", field, default),
            ));
            default
        }
    }
}

fn push_invalid(
    field: &'static str,
    value: Option<&OptionValue>,
    default: f64,
    diagnostics: &mut DiagnosticResult,
) {
    let shown = value.map(ToString::to_string).unwrap_or_default();
    diagnostics.push(Diagnostic::warn(
        DiagnosticKind::InvalidValue,
        field,
        format!(
            "参数 \"{}\" 的值无效（{}），使用默认值: {}",
            field, shown, default
        ),
    ));
}

fn parse_repeat(value: Option<&OptionValue>, diagnostics: &mut DiagnosticResult) -> RepeatMode {
    match value {
        Some(OptionValue::Text(s)) => match RepeatMode::parse_lenient(s) {
            Some(mode) => mode,
            None => {
                diagnostics.push(Diagnostic::warn(
                    DiagnosticKind::UnknownRepeatMode,
                    "repeat",
                    format!(
                        "参数 \"repeat\" 的值无效（\"{}\"），使用默认值: {}",
                        s,
                        RepeatMode::default()
                    ),
                ));
                RepeatMode::default()
            }
        },
        Some(other) => {
            diagnostics.push(Diagnostic::warn(
                DiagnosticKind::UnknownRepeatMode,
                "repeat",
                format!(
                    "参数 \"repeat\" 的值无效（{}），使用默认值: {}",
                    other,
                    RepeatMode::default()
                ),
            ));
            RepeatMode::default()
        }
        None => {
            diagnostics.push(Diagnostic::info(
                DiagnosticKind::Missing,
                "repeat",
                format!("未设置参数 \"repeat\"，使用默认值: {}", RepeatMode::default()),
            ));
            RepeatMode::default()
        }
    }
}

/// 按浮点前缀解析字符串
///
/// 跳过前导空白，读取最长的合法浮点前缀，忽略其后的内容：
/// `"  12.5px"` → 12.5，`"-.5e2x"` → -50，`"Infinity"` → ∞，`"abc"` → None。
pub fn parse_float_prefix(input: &str) -> Option<f64> {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    if s[end..].starts_with("Infinity") {
        return Some(if bytes.first() == Some(&b'-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // 指数部分只在后面跟着数字时才计入
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok()
}
