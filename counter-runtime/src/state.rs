//! # State 模块
//!
//! 每个计数器独占的运行时状态。
//!
//! ## 设计原则
//!
//! - 所有状态必须**显式建模**，不依赖闭包捕获的局部变量
//! - 状态只在可见性回调或 tick 中被修改，两者不会同时发生
//! - 可序列化，便于宿主查看或快照

use serde::{Deserialize, Serialize};

use crate::geometry::{HiddenSide, ScrollDirection};

/// 计数器运行时状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterRuntimeState {
    /// 最近一次写入显示的值
    pub current_value: f64,
    /// 是否至少完整播放过一次
    pub has_animated_once: bool,
    /// 自上次出现以来是否完全隐藏过
    pub is_fully_hidden: bool,
    /// 上一次回调时的滚动方向
    pub last_scroll_direction: Option<ScrollDirection>,
    /// 第一次观察到不可见时的隐藏侧，锁定后不再改写
    pub initial_hidden_side: Option<HiddenSide>,
    /// 最近一次隐藏时的隐藏侧
    pub last_hidden_side: Option<HiddenSide>,
    /// 最近一次可见时的可见比例
    pub last_intersection_ratio: f64,
}

impl CounterRuntimeState {
    /// 创建初始状态
    pub fn new(start_value: f64) -> Self {
        Self {
            current_value: start_value,
            has_animated_once: false,
            is_fully_hidden: false,
            last_scroll_direction: None,
            initial_hidden_side: None,
            last_hidden_side: None,
            last_intersection_ratio: 0.0,
        }
    }

    /// 尝试锁定初始隐藏侧
    ///
    /// 只有在尚未完成动画、尚未锁定且确实得到了隐藏侧时才会写入。
    pub fn latch_initial_hidden_side(&mut self, side: Option<HiddenSide>) {
        if !self.has_animated_once && self.initial_hidden_side.is_none() {
            self.initial_hidden_side = side;
        }
    }

    /// 最近一次隐藏侧是否与初始隐藏侧一致
    pub fn hidden_on_initial_side(&self) -> bool {
        self.last_hidden_side == self.initial_hidden_side
    }
}
