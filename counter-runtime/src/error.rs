//! # Error 模块
//!
//! 定义 counter-runtime 中使用的错误类型。
//!
//! 选项格式错误不是错误：它们通过 [`crate::diagnostic`] 报告并回退到默认值。
//! 只有目标不是可渲染元素时才拒绝挂载。

use thiserror::Error;

use crate::diagnostic::{Diagnostic, DiagnosticKind};

/// 挂载错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttachError {
    /// 目标不是可渲染的元素
    #[error("计数器目标必须是 HTML 元素（实际：{kind}）")]
    NotAnElement { kind: String },
}

impl AttachError {
    /// 对应的错误级诊断
    pub fn diagnostic(&self) -> Diagnostic {
        match self {
            Self::NotAnElement { kind } => Diagnostic::error(
                DiagnosticKind::InvalidTarget,
                "element",
                format!("计数器目标必须是 HTML 元素，实际节点类型: {kind}"),
            ),
        }
    }
}

/// Result 类型别名
pub type CounterResult<T> = Result<T, AttachError>;
