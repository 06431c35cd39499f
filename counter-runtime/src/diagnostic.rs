//! # 诊断模块
//!
//! 选项解析产生的建议性诊断。
//!
//! ## 设计原则
//!
//! - 诊断从不中断初始化：字段回退到默认值后继续执行
//! - 诊断分级：Error（挂载被拒绝）、Warn（已纠正的输入）、Info（信息提示）
//! - 每条诊断带有 [`DiagnosticKind`]，测试可以区分"无法解析"与"超出范围"

use std::fmt;

use serde::Serialize;

/// 诊断级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum DiagnosticLevel {
    /// 信息提示
    Info,
    /// 警告（输入已被纠正）
    Warn,
    /// 错误（目标无效）
    Error,
}

impl fmt::Display for DiagnosticLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// 诊断类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticKind {
    /// 字段缺省，使用默认值
    Missing,
    /// 字符串被转换为数字
    CoercedString,
    /// 值无法识别，使用默认值
    InvalidValue,
    /// duration 不是正数
    NonPositive,
    /// delay 为负数
    Negative,
    /// 未知的 repeat 模式
    UnknownRepeatMode,
    /// 目标不是元素
    InvalidTarget,
}

/// 诊断条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// 诊断级别
    pub level: DiagnosticLevel,
    /// 诊断类别
    pub kind: DiagnosticKind,
    /// 相关字段名（如 `"duration"`）
    pub field: &'static str,
    /// 诊断消息
    pub message: String,
}

impl Diagnostic {
    /// 创建警告诊断
    pub fn warn(kind: DiagnosticKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warn,
            kind,
            field,
            message: message.into(),
        }
    }

    /// 创建信息诊断
    pub fn info(kind: DiagnosticKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Info,
            kind,
            field,
            message: message.into(),
        }
    }

    /// 创建错误诊断
    pub fn error(kind: DiagnosticKind, field: &'static str, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            kind,
            field,
            message: message.into(),
        }
    }

    /// 通过 tracing 输出
    pub fn emit(&self) {
        match self.level {
            DiagnosticLevel::Info => {
                tracing::info!(field = self.field, kind = ?self.kind, "{}", self.message)
            }
            DiagnosticLevel::Warn => {
                tracing::warn!(field = self.field, kind = ?self.kind, "{}", self.message)
            }
            DiagnosticLevel::Error => {
                tracing::error!(field = self.field, kind = ?self.kind, "{}", self.message)
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.field, self.message)
    }
}

/// 诊断结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagnosticResult {
    /// 诊断条目列表
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticResult {
    /// 创建空结果
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加诊断
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// 获取警告数量
    pub fn warn_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == DiagnosticLevel::Warn)
            .count()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// 某个字段的诊断
    pub fn for_field(&self, field: &str) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.field == field).collect()
    }

    /// 是否包含指定类别的诊断
    pub fn has_kind(&self, field: &str, kind: DiagnosticKind) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.field == field && d.kind == kind)
    }

    /// 按级别过滤
    pub fn filter_by_level(&self, min_level: DiagnosticLevel) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.level >= min_level)
            .collect()
    }

    /// 全部输出到日志
    pub fn emit_all(&self) {
        for diagnostic in &self.diagnostics {
            diagnostic.emit();
        }
    }
}
