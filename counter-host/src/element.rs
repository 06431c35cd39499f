//! # Element 模块
//!
//! 无界面的元素替身，实现 [`CounterElement`]。

use counter_runtime::{CounterElement, Overflow};
use serde::{Deserialize, Serialize};

/// 节点类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// 普通元素
    #[default]
    Element,
    /// 文本节点
    Text,
    /// 注释节点
    Comment,
    /// 文档节点
    Document,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Element => "element",
            Self::Text => "#text",
            Self::Comment => "#comment",
            Self::Document => "#document",
        }
    }
}

/// 虚拟元素
///
/// 保存当前文本，并缓存自上次 [`VirtualElement::take_writes`] 以来的所有写入。
#[derive(Debug, Clone, Default)]
pub struct VirtualElement {
    kind: NodeKind,
    text: String,
    ancestors: Vec<Overflow>,
    writes: Vec<String>,
}

impl VirtualElement {
    pub fn new(kind: NodeKind, text: impl Into<String>, ancestors: Vec<Overflow>) -> Self {
        Self {
            kind,
            text: text.into(),
            ancestors,
            writes: Vec::new(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// 取出尚未消费的写入
    pub fn take_writes(&mut self) -> Vec<String> {
        std::mem::take(&mut self.writes)
    }
}

impl CounterElement for VirtualElement {
    fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    fn node_kind(&self) -> String {
        self.kind.as_str().to_string()
    }

    fn text_content(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn set_text_content(&mut self, text: String) {
        self.text = text.clone();
        self.writes.push(text);
    }

    fn ancestor_overflow_x(&self) -> Vec<Overflow> {
        self.ancestors.clone()
    }
}
