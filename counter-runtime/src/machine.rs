//! # Machine 模块
//!
//! 重复模式状态机：每次可见性回调决定重播、按比例驱动、重置还是保持。
//!
//! ## 执行模型
//!
//! ```text
//! transition(&mut state, ctx, facts) -> Vec<Effect>
//! ```
//!
//! 纯函数，不接触元素、定时器或驱动器。状态机只修改 [`CounterRuntimeState`]，
//! 其余副作用通过 [`Effect`] 交给调用方执行。
//!
//! ## 转换表
//!
//! | 事件 | 模式 | 动作 |
//! |------|------|------|
//! | 出现 | Always | 比例变化时取消驱动器，直接写入 `start + (end - start) * ratio` |
//! | 出现 | 其他 | 满足重播条件时 `ScheduleStart` |
//! | 隐藏（已知隐藏侧） | 全部 | 标记完全隐藏，记录隐藏侧 |
//! | 隐藏（已知隐藏侧） | Always | 取消驱动器并重置为起点 |

use serde::{Deserialize, Serialize};

use crate::config::{CounterConfig, RepeatMode};
use crate::extract::CounterTarget;
use crate::geometry::{HiddenSide, ScrollDirection};
use crate::state::CounterRuntimeState;

/// 状态机产生的副作用
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    /// 延迟后从起点启动驱动器（替换尚未触发的启动）
    ScheduleStart { delay_ms: f64 },
    /// 取消正在运行的驱动器
    CancelDriver,
    /// 立即把该值写入显示（不经过插值）
    SetValue(f64),
}

/// 一次回调的事实（已由追踪器标注方向和隐藏侧）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityFacts {
    /// 是否与根相交
    pub intersecting: bool,
    /// 可见比例 [0, 1]
    pub ratio: f64,
    /// 本次回调推断出的滚动方向
    pub direction: ScrollDirection,
    /// 不相交时推断出的隐藏侧
    pub hidden_side: Option<HiddenSide>,
}

/// 状态机所需的只读上下文
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MachineContext {
    pub repeat: RepeatMode,
    pub start_value: f64,
    pub end_value: f64,
    pub delay_ms: f64,
}

impl MachineContext {
    pub fn new(config: &CounterConfig, target: &CounterTarget) -> Self {
        Self {
            repeat: config.repeat,
            start_value: target.start_value,
            end_value: target.end_value,
            delay_ms: config.delay_ms,
        }
    }

    /// 按可见比例插值
    pub fn value_at_ratio(&self, ratio: f64) -> f64 {
        self.start_value + (self.end_value - self.start_value) * ratio
    }
}

/// 处理一次可见性回调
pub fn transition(
    state: &mut CounterRuntimeState,
    ctx: &MachineContext,
    facts: &VisibilityFacts,
) -> Vec<Effect> {
    let mut effects = Vec::new();

    if !facts.intersecting {
        state.latch_initial_hidden_side(facts.hidden_side);
    }

    if facts.intersecting {
        if ctx.repeat == RepeatMode::Always {
            if facts.ratio != state.last_intersection_ratio {
                effects.push(Effect::CancelDriver);
                state.current_value = ctx.value_at_ratio(facts.ratio);
                effects.push(Effect::SetValue(state.current_value));
            }
        } else if should_start(state, ctx.repeat, facts.direction) {
            effects.push(Effect::ScheduleStart {
                delay_ms: ctx.delay_ms,
            });
        }

        state.is_fully_hidden = false;
        state.last_intersection_ratio = facts.ratio;
    } else if let Some(side) = facts.hidden_side {
        state.is_fully_hidden = true;
        state.last_hidden_side = Some(side);

        if ctx.repeat == RepeatMode::Always {
            state.current_value = ctx.start_value;
            effects.push(Effect::SetValue(state.current_value));
            effects.push(Effect::CancelDriver);
        }
    }

    state.last_scroll_direction = Some(facts.direction);
    effects
}

/// 元素出现时是否需要（重新）启动动画
pub fn should_start(
    state: &CounterRuntimeState,
    repeat: RepeatMode,
    direction: ScrollDirection,
) -> bool {
    if !state.has_animated_once {
        return true;
    }

    match repeat {
        RepeatMode::OnReappear => state.is_fully_hidden,
        RepeatMode::OnReverseScroll => {
            state
                .last_scroll_direction
                .is_some_and(|last| direction.is_reverse_of(last))
                && state.hidden_on_initial_side()
        }
        RepeatMode::None | RepeatMode::Always => false,
    }
}
