//! # Error 模块
//!
//! 宿主层错误类型。

use std::path::PathBuf;

use counter_runtime::AttachError;
use thiserror::Error;

/// 宿主错误
#[derive(Error, Debug)]
pub enum HostError {
    /// 文件读写失败
    #[error("读取 {path:?} 失败: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON 解析失败
    #[error("解析 {path:?} 失败: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 场景内容无效
    #[error("场景无效: {message}")]
    InvalidScenario { message: String },

    /// 计数器挂载失败
    #[error(transparent)]
    Attach(#[from] AttachError),
}

/// Result 类型别名
pub type HostResult<T> = Result<T, HostError>;
