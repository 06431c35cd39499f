//! # Scenario 模块
//!
//! 场景文件：描述一个元素、它的计数器选项，以及按时间排列的可见性变化。
//!
//! ```json
//! {
//!   "name": "stats",
//!   "element": { "text": "Clients: 120+", "ancestors": ["visible"] },
//!   "options": { "percent": 50, "repeat": "onReverseScroll" },
//!   "steps": [
//!     { "at_ms": 0,   "intersecting": false, "rect": { ... }, "scroll_offset": 0 },
//!     { "at_ms": 500, "intersecting": true, "ratio": 0.4, "rect": { ... }, "scroll_offset": 300 }
//!   ]
//! }
//! ```

use std::fs;
use std::path::Path;

use counter_runtime::{CounterOptions, Overflow, Rect, RootGeometry, VisibilityEvent};
use serde::{Deserialize, Serialize};

use crate::element::{NodeKind, VirtualElement};
use crate::error::{HostError, HostResult};

/// 场景
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// 场景名称
    #[serde(default)]
    pub name: String,

    /// 目标元素
    pub element: ElementSpec,

    /// 计数器选项（未设置的字段从配置默认值补齐）
    #[serde(default)]
    pub options: CounterOptions,

    /// 挂载时的滚动偏移
    #[serde(default)]
    pub initial_scroll: f64,

    /// 根几何（缺省为配置中的视口）
    #[serde(default)]
    pub root: Option<RootGeometry>,

    /// 最后一个事件之后继续推进的时长（缺省使用配置）
    #[serde(default)]
    pub settle_ms: Option<u64>,

    /// 按时间排列的可见性变化
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

/// 元素描述
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementSpec {
    /// 初始文本
    pub text: String,

    /// 节点类型
    #[serde(default)]
    pub kind: NodeKind,

    /// 祖先链的 overflow-x（由近到远）
    #[serde(default)]
    pub ancestors: Vec<Overflow>,
}

impl ElementSpec {
    pub fn build(&self) -> VirtualElement {
        VirtualElement::new(self.kind, self.text.clone(), self.ancestors.clone())
    }
}

/// 场景中的一步
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// 事件发生时间（毫秒，从回放开始计）
    pub at_ms: u64,

    #[serde(flatten)]
    pub event: StepEvent,
}

/// 一次可见性变化
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepEvent {
    pub intersecting: bool,

    #[serde(default)]
    pub ratio: f64,

    pub rect: Rect,

    pub scroll_offset: f64,

    /// 覆盖场景级别的根几何
    #[serde(default)]
    pub root: Option<RootGeometry>,
}

impl StepEvent {
    /// 转换为运行时事件
    pub fn to_event(&self, default_root: RootGeometry) -> VisibilityEvent {
        VisibilityEvent {
            intersecting: self.intersecting,
            ratio: self.ratio,
            rect: self.rect,
            root: self.root.unwrap_or(default_root),
            scroll_offset: self.scroll_offset,
        }
    }
}

impl Scenario {
    /// 从 JSON 文本解析
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// 从文件加载并校验
    pub fn load(path: impl AsRef<Path>) -> HostResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| HostError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scenario = Self::from_json(&content).map_err(|source| HostError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// 校验步骤
    ///
    /// - 时间必须非递减
    /// - 可见比例必须在 [0, 1] 之间
    pub fn validate(&self) -> HostResult<()> {
        let mut last_at = 0;
        for (index, step) in self.steps.iter().enumerate() {
            if step.at_ms < last_at {
                return Err(HostError::InvalidScenario {
                    message: format!(
                        "第 {} 步的时间 {}ms 早于上一步 {}ms",
                        index + 1,
                        step.at_ms,
                        last_at
                    ),
                });
            }
            last_at = step.at_ms;

            let ratio = step.event.ratio;
            if !(0.0..=1.0).contains(&ratio) {
                return Err(HostError::InvalidScenario {
                    message: format!("第 {} 步的可见比例超出范围: {}", index + 1, ratio),
                });
            }
        }
        Ok(())
    }

    /// 最后一步的时间
    pub fn last_step_ms(&self) -> u64 {
        self.steps.last().map(|step| step.at_ms).unwrap_or(0)
    }
}
