//! # Config 模块
//!
//! 宿主配置管理，集中管理所有配置项。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 场景文件中的 `options`
//! 3. 配置文件 (config.json) 中的 `defaults`
//! 4. counter-runtime 的默认值（最低）

use std::fs;
use std::path::Path;

use counter_runtime::CounterOptions;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// 视口配置（场景未指定根几何时使用）
    #[serde(default)]
    pub viewport: ViewportConfig,

    /// 回放配置
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// 计数器默认选项
    ///
    /// 场景里未设置的字段从这里补齐。
    #[serde(default)]
    pub defaults: CounterOptions,
}

/// 视口配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViewportConfig {
    #[serde(default = "default_viewport_width")]
    pub width: f64,

    #[serde(default = "default_viewport_height")]
    pub height: f64,
}

/// 回放配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// 每帧时长（毫秒）
    #[serde(default = "default_frame_ms")]
    pub frame_ms: u64,

    /// 是否按真实时间回放
    #[serde(default)]
    pub realtime: bool,

    /// 最后一个事件之后继续推进的时长（毫秒）
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_viewport_width() -> f64 {
    1280.0
}

fn default_viewport_height() -> f64 {
    720.0
}

fn default_frame_ms() -> u64 {
    16
}

fn default_settle_ms() -> u64 {
    3000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            viewport: ViewportConfig::default(),
            playback: PlaybackConfig::default(),
            defaults: CounterOptions::default(),
        }
    }
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: default_viewport_width(),
            height: default_viewport_height(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            frame_ms: default_frame_ms(),
            realtime: false,
            settle_ms: default_settle_ms(),
        }
    }
}

impl AppConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = ?path, "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = ?path, "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(path = ?path, error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = ?path, error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 加载并校验配置
    ///
    /// 校验失败时返回默认配置和对应的错误，由调用方在日志初始化后报告。
    pub fn load_validated(path: impl AsRef<Path>) -> (Self, Option<ConfigError>) {
        let config = Self::load(path);
        match config.validate() {
            Ok(()) => (config, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }

    /// 日志级别（无法解析时为 INFO）
    pub fn level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::INFO)
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::Io(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "未知的日志级别: {}",
                self.log_level
            )));
        }

        if self.playback.frame_ms == 0 {
            return Err(ConfigError::ValidationFailed(
                "frame_ms 必须大于 0".to_string(),
            ));
        }

        if self.viewport.width <= 0.0 || self.viewport.height <= 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "视口尺寸必须为正数: {}x{}",
                self.viewport.width, self.viewport.height
            )));
        }

        Ok(())
    }

    /// 用配置默认值补齐场景选项
    pub fn merge_options(&self, options: &CounterOptions) -> CounterOptions {
        CounterOptions {
            percent: options.percent.clone().or_else(|| self.defaults.percent.clone()),
            duration: options
                .duration
                .clone()
                .or_else(|| self.defaults.duration.clone()),
            delay: options.delay.clone().or_else(|| self.defaults.delay.clone()),
            repeat: options.repeat.clone().or_else(|| self.defaults.repeat.clone()),
        }
    }
}

/// 配置错误
#[derive(Error, Debug, Clone)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    Io(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}
