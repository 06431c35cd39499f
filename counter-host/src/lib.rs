//! # Counter Host
//!
//! counter-runtime 的无界面宿主实现。
//!
//! ## 架构说明
//!
//! Host 层扮演页面的角色，负责：
//! - 持有元素（[`VirtualElement`]）
//! - 按场景文件产生可见性事件
//! - 持有时钟，推进计数器的延迟定时器与驱动器
//! - 记录每一帧写入的文本
//!
//! Host 层不包含任何重复模式逻辑，只负责把事实交给 [`counter_runtime::Counter`]。

pub mod config;
pub mod element;
pub mod error;
pub mod player;
pub mod scenario;

pub use config::{AppConfig, ConfigError, PlaybackConfig, ViewportConfig};
pub use element::{NodeKind, VirtualElement};
pub use error::{HostError, HostResult};
pub use player::{Frame, Player, Transcript};
pub use scenario::{ElementSpec, Scenario, ScenarioStep, StepEvent};
