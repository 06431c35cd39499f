//! # Geometry 模块
//!
//! 滚动容器识别、滚动方向推断和隐藏侧判断。
//!
//! 宿主在每次可见性回调时传入元素矩形和根（视口或容器）几何信息，
//! 本模块只做比较，不做任何布局计算。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 矩形（视口坐标）
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// 根几何信息
///
/// 视口：`bounds` 为 `(0, 0, innerWidth, innerHeight)`；
/// 容器：`bounds` 为容器的 bounding rect，`client_*` 为可视区尺寸。
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RootGeometry {
    pub bounds: Rect,
    pub client_width: f64,
    pub client_height: f64,
}

impl RootGeometry {
    /// 视口几何
    pub fn viewport(width: f64, height: f64) -> Self {
        Self {
            bounds: Rect::new(0.0, 0.0, width, height),
            client_width: width,
            client_height: height,
        }
    }

    /// 容器几何（可视区与边框盒同宽高）
    pub fn container(bounds: Rect) -> Self {
        Self {
            bounds,
            client_width: bounds.width,
            client_height: bounds.height,
        }
    }
}

/// CSS `overflow-x` 取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Clip,
    Auto,
    Scroll,
}

impl Overflow {
    /// 是否产生滚动容器
    pub fn is_scrollable(&self) -> bool {
        matches!(self, Self::Auto | Self::Scroll)
    }
}

impl FromStr for Overflow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "visible" => Ok(Self::Visible),
            "hidden" => Ok(Self::Hidden),
            "clip" => Ok(Self::Clip),
            "auto" => Ok(Self::Auto),
            "scroll" => Ok(Self::Scroll),
            other => Err(format!("未知的 overflow 值: {}", other)),
        }
    }
}

/// 滚动容器类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScrollContainer {
    /// 页面视口（垂直滚动）
    Viewport,
    /// 水平滚动的祖先元素
    Horizontal,
}

impl ScrollContainer {
    /// 从祖先链的 `overflow-x` 推导滚动容器
    ///
    /// `ancestors` 由近到远排列。只在挂载时调用一次。
    pub fn resolve(ancestors: &[Overflow]) -> Self {
        if ancestors.iter().any(Overflow::is_scrollable) {
            Self::Horizontal
        } else {
            Self::Viewport
        }
    }
}

/// 滚动方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    Up,
    Down,
    Left,
    Right,
}

impl ScrollDirection {
    /// 逻辑上的反方向
    pub fn opposite(&self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// 是否与另一方向相反
    pub fn is_reverse_of(&self, other: ScrollDirection) -> bool {
        self.opposite() == other
    }
}

impl fmt::Display for ScrollDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// 隐藏侧：元素滚出的那条边
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiddenSide {
    Top,
    Bottom,
    Left,
    Right,
}

impl fmt::Display for HiddenSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// 滚动追踪器
///
/// 记录上一次的滚动偏移，用于推断方向。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollTracker {
    container: ScrollContainer,
    last_offset: f64,
}

impl ScrollTracker {
    /// 创建追踪器
    ///
    /// `initial_offset`：视口为 `scrollY`，容器为 `scrollLeft`。
    pub fn new(container: ScrollContainer, initial_offset: f64) -> Self {
        Self {
            container,
            last_offset: initial_offset,
        }
    }

    pub fn container(&self) -> ScrollContainer {
        self.container
    }

    pub fn last_offset(&self) -> f64 {
        self.last_offset
    }

    /// 根据新偏移推断方向并记录
    ///
    /// 偏移不变时视为向下/向右。
    pub fn observe(&mut self, offset: f64) -> ScrollDirection {
        let forward = offset >= self.last_offset;
        self.last_offset = offset;
        match (self.container, forward) {
            (ScrollContainer::Viewport, true) => ScrollDirection::Down,
            (ScrollContainer::Viewport, false) => ScrollDirection::Up,
            (ScrollContainer::Horizontal, true) => ScrollDirection::Right,
            (ScrollContainer::Horizontal, false) => ScrollDirection::Left,
        }
    }

    /// 判断元素隐藏在哪一侧
    pub fn hidden_side(&self, rect: &Rect, root: &RootGeometry) -> Option<HiddenSide> {
        hidden_side(self.container, rect, root)
    }
}

/// 判断元素隐藏在哪一侧
///
/// 视口只判断上下；部分被左右裁剪的情况不建模。
pub fn hidden_side(
    container: ScrollContainer,
    rect: &Rect,
    root: &RootGeometry,
) -> Option<HiddenSide> {
    match container {
        ScrollContainer::Viewport => {
            if rect.bottom() < 0.0 {
                Some(HiddenSide::Top)
            } else if rect.top > root.client_height {
                Some(HiddenSide::Bottom)
            } else {
                None
            }
        }
        ScrollContainer::Horizontal => {
            let relative_left = rect.left - root.bounds.left;
            let relative_right = rect.right() - root.bounds.left;
            if relative_right < 0.0 {
                Some(HiddenSide::Left)
            } else if relative_left > root.client_width {
                Some(HiddenSide::Right)
            } else {
                None
            }
        }
    }
}
