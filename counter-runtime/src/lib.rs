//! # Counter Runtime
//!
//! 滚动/可见性驱动的数字计数器动画核心库。
//!
//! ## 架构概述
//!
//! `counter-runtime` 是纯逻辑核心，不依赖 DOM、真实时钟或任何渲染引擎。
//! 宿主层（Host）负责采集可见性变化与时间流逝，并把事实喂给 [`Counter`]：
//!
//! ```text
//! Host                               Counter
//!   │                                   │
//!   │──── VisibilityEvent ────────────►│ handle_visibility()
//!   │                                   │   ├─ ScrollTracker：方向 / 隐藏侧
//!   │                                   │   ├─ machine::transition()：Effect 列表
//!   │                                   │   └─ 应用 Effect（定时器 / 驱动器 / 写入文本）
//!   │──── advance(elapsed) ───────────►│ 延迟定时器 + 驱动器 tick
//!   │◄─── element.set_text_content() ──│
//! ```
//!
//! ## 核心类型
//!
//! - [`CounterOptions`] / [`CounterConfig`]：原始选项与规范化配置
//! - [`CounterTarget`]：从元素文本提取的起止值与装饰文本
//! - [`CounterRuntimeState`]：每个计数器独占的可变状态
//! - [`DriverRun`]：一次插值动画
//! - [`Counter`]：把以上部件组合在一起的外壳
//!
//! ## 使用示例
//!
//! ```ignore
//! use counter_runtime::{Counter, CounterOptions, VisibilityEvent};
//!
//! let options = CounterOptions::default().with_repeat("onReverseScroll");
//! let mut counter = Counter::attach(element, &options, window_scroll_y)?;
//!
//! // IntersectionObserver 回调
//! counter.handle_visibility(event);
//!
//! // 每帧
//! counter.advance(Duration::from_millis(16));
//! ```
//!
//! ## 模块结构
//!
//! - [`config`]：选项解析与默认值回退
//! - [`extract`]：数值与装饰文本提取
//! - [`geometry`]：滚动容器、滚动方向、隐藏侧
//! - [`state`]：运行时状态
//! - [`machine`]：重复模式状态机
//! - [`driver`]：插值驱动器
//! - [`counter`]：计数器外壳
//! - [`diagnostic`]：建议性诊断
//! - [`error`]：错误类型定义

pub mod config;
pub mod counter;
pub mod diagnostic;
pub mod driver;
pub mod error;
pub mod extract;
pub mod geometry;
pub mod machine;
pub mod state;

// 重导出核心类型
pub use config::{CounterConfig, CounterOptions, OptionValue, RepeatMode, ResolvedConfig};
pub use counter::{Counter, CounterElement, VisibilityEvent};
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticLevel, DiagnosticResult};
pub use driver::{DriverRun, TickOutcome};
pub use error::{AttachError, CounterResult};
pub use extract::{CounterTarget, format_value};
pub use geometry::{
    HiddenSide, Overflow, Rect, RootGeometry, ScrollContainer, ScrollDirection, ScrollTracker,
};
pub use machine::{Effect, MachineContext, VisibilityFacts};
pub use state::CounterRuntimeState;
