//! 集成测试共用的元素替身与事件构造。

#![allow(dead_code)]

use counter_runtime::{CounterElement, Overflow, Rect, RootGeometry, VisibilityEvent};

/// 页面元素替身：记录每一次写入
#[derive(Debug, Default, Clone)]
pub struct PageElement {
    pub text: String,
    pub writes: Vec<String>,
    pub overflow: Vec<Overflow>,
}

impl PageElement {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }
}

impl CounterElement for PageElement {
    fn is_element(&self) -> bool {
        true
    }

    fn text_content(&self) -> Option<String> {
        Some(self.text.clone())
    }

    fn set_text_content(&mut self, text: String) {
        self.text = text.clone();
        self.writes.push(text);
    }

    fn ancestor_overflow_x(&self) -> Vec<Overflow> {
        self.overflow.clone()
    }
}

pub fn viewport() -> RootGeometry {
    RootGeometry::viewport(1280.0, 720.0)
}

/// 元素在视口内
pub fn shown(ratio: f64, scroll_y: f64) -> VisibilityEvent {
    VisibilityEvent {
        intersecting: true,
        ratio,
        rect: Rect::new(100.0, 300.0, 200.0, 60.0),
        root: viewport(),
        scroll_offset: scroll_y,
    }
}

/// 元素在视口下方
pub fn below_viewport(scroll_y: f64) -> VisibilityEvent {
    VisibilityEvent {
        intersecting: false,
        ratio: 0.0,
        rect: Rect::new(100.0, 900.0, 200.0, 60.0),
        root: viewport(),
        scroll_offset: scroll_y,
    }
}

/// 元素在视口上方
pub fn above_viewport(scroll_y: f64) -> VisibilityEvent {
    VisibilityEvent {
        intersecting: false,
        ratio: 0.0,
        rect: Rect::new(100.0, -400.0, 200.0, 60.0),
        root: viewport(),
        scroll_offset: scroll_y,
    }
}
