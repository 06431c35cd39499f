//! # Player 模块
//!
//! 按场景回放计数器：在事件之间以固定帧长推进时钟，记录每次文本写入。
//!
//! 两种时钟：
//! - [`Player::play`]：虚拟时钟，立即完成，结果可复现
//! - [`Player::play_realtime`]：每帧真实等待 `frame_ms`

use std::time::Duration;

use counter_runtime::{
    Counter, CounterRuntimeState, Diagnostic, DiagnosticLevel, DiagnosticResult, RootGeometry,
    VisibilityEvent,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::element::VirtualElement;
use crate::error::HostResult;
use crate::scenario::Scenario;

/// 一次文本写入
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    /// 写入时刻（毫秒，从回放开始计）
    pub at_ms: u64,
    /// 写入的文本
    pub text: String,
}

/// 回放结果
#[derive(Debug, Clone, Serialize)]
pub struct Transcript {
    pub name: String,
    pub frames: Vec<Frame>,
    pub final_text: String,
    pub final_state: CounterRuntimeState,
    pub diagnostics: DiagnosticResult,
    /// 回放总时长（毫秒）
    pub elapsed_ms: u64,
}

impl Transcript {
    /// 写入过的文本（按时间顺序）
    pub fn texts(&self) -> Vec<&str> {
        self.frames.iter().map(|frame| frame.text.as_str()).collect()
    }

    /// 警告及以上级别的诊断
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.diagnostics.filter_by_level(DiagnosticLevel::Warn)
    }
}

/// 场景回放器
#[derive(Debug, Clone, Default)]
pub struct Player {
    config: AppConfig,
}

/// 回放过程中的计数器与时钟
struct Session {
    counter: Counter<VirtualElement>,
    root: RootGeometry,
    now_ms: u64,
    frames: Vec<Frame>,
}

impl Session {
    fn advance(&mut self, dt_ms: u64) {
        self.counter.advance(Duration::from_millis(dt_ms));
        self.now_ms += dt_ms;
        self.collect();
    }

    fn handle(&mut self, event: VisibilityEvent) {
        let effects = self.counter.handle_visibility(event);
        debug!(at_ms = self.now_ms, ?effects, "事件已处理");
        self.collect();
    }

    fn collect(&mut self) {
        let now_ms = self.now_ms;
        self.frames.extend(
            self.counter
                .element_mut()
                .take_writes()
                .into_iter()
                .map(|text| Frame { at_ms: now_ms, text }),
        );
    }

    fn finish(self, name: &str) -> Transcript {
        let final_state = self.counter.state().clone();
        let diagnostics = self.counter.diagnostics().clone();
        let element = self.counter.into_element();
        Transcript {
            name: name.to_string(),
            final_text: element.text().to_string(),
            final_state,
            diagnostics,
            elapsed_ms: self.now_ms,
            frames: self.frames,
        }
    }
}

impl Player {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 按场景挂载计数器（场景选项缺省字段由配置补齐）
    pub fn attach(&self, scenario: &Scenario) -> HostResult<Counter<VirtualElement>> {
        let options = self.config.merge_options(&scenario.options);
        let counter = Counter::attach(scenario.element.build(), &options, scenario.initial_scroll)?;
        Ok(counter)
    }

    fn default_root(&self, scenario: &Scenario) -> RootGeometry {
        scenario.root.unwrap_or_else(|| {
            RootGeometry::viewport(self.config.viewport.width, self.config.viewport.height)
        })
    }

    fn settle_ms(&self, scenario: &Scenario) -> u64 {
        scenario.settle_ms.unwrap_or(self.config.playback.settle_ms)
    }

    fn frame_ms(&self) -> u64 {
        self.config.playback.frame_ms.max(1)
    }

    fn open(&self, scenario: &Scenario) -> HostResult<Session> {
        scenario.validate()?;
        let counter = self.attach(scenario)?;
        info!(
            scenario = %scenario.name,
            steps = scenario.steps.len(),
            "开始回放"
        );
        Ok(Session {
            counter,
            root: self.default_root(scenario),
            now_ms: 0,
            frames: Vec::new(),
        })
    }

    /// 虚拟时钟回放
    pub fn play(&self, scenario: &Scenario) -> HostResult<Transcript> {
        let mut session = self.open(scenario)?;
        let frame_ms = self.frame_ms();

        for step in &scenario.steps {
            while session.now_ms < step.at_ms {
                let dt = frame_ms.min(step.at_ms - session.now_ms);
                session.advance(dt);
            }
            let event = step.event.to_event(session.root);
            session.handle(event);
        }

        let end_ms = session.now_ms + self.settle_ms(scenario);
        while session.now_ms < end_ms {
            let dt = frame_ms.min(end_ms - session.now_ms);
            session.advance(dt);
        }

        let transcript = session.finish(&scenario.name);
        info!(
            frames = transcript.frames.len(),
            warnings = transcript.warnings().len(),
            final_text = %transcript.final_text,
            "回放完成"
        );
        Ok(transcript)
    }

    /// 真实时间回放
    ///
    /// 与 [`Player::play`] 的帧划分相同，只是每帧之前等待对应时长。
    pub async fn play_realtime(&self, scenario: &Scenario) -> HostResult<Transcript> {
        let mut session = self.open(scenario)?;
        let frame_ms = self.frame_ms();

        for step in &scenario.steps {
            while session.now_ms < step.at_ms {
                let dt = frame_ms.min(step.at_ms - session.now_ms);
                tokio::time::sleep(Duration::from_millis(dt)).await;
                session.advance(dt);
            }
            let event = step.event.to_event(session.root);
            session.handle(event);
        }

        let end_ms = session.now_ms + self.settle_ms(scenario);
        while session.now_ms < end_ms {
            let dt = frame_ms.min(end_ms - session.now_ms);
            tokio::time::sleep(Duration::from_millis(dt)).await;
            session.advance(dt);
        }

        let transcript = session.finish(&scenario.name);
        info!(
            frames = transcript.frames.len(),
            warnings = transcript.warnings().len(),
            final_text = %transcript.final_text,
            "回放完成"
        );
        Ok(transcript)
    }
}
