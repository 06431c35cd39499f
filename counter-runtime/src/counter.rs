//! # Counter 模块
//!
//! 计数器外壳：把配置、目标、状态、追踪器、延迟定时器和驱动器组合在一起。
//!
//! ## 执行模型
//!
//! ```text
//! handle_visibility(event)
//!   1. ScrollTracker 推断方向与隐藏侧
//!   2. machine::transition() 更新状态并产出 Effect
//!   3. 应用 Effect：调度启动 / 取消驱动器 / 立即写入
//!
//! advance(elapsed)
//!   按时间顺序触发驱动器 tick 与延迟启动，每一帧都写回元素
//! ```
//!
//! 任意时刻最多只有一个驱动器；启动新的驱动器会先丢弃旧的，
//! 被丢弃的驱动器剩余的 tick 不会再触发。

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::config::{CounterConfig, CounterOptions};
use crate::diagnostic::DiagnosticResult;
use crate::driver::DriverRun;
use crate::error::{AttachError, CounterResult};
use crate::extract::CounterTarget;
use crate::geometry::{Overflow, Rect, RootGeometry, ScrollContainer, ScrollTracker};
use crate::machine::{self, Effect, MachineContext, VisibilityFacts};
use crate::state::CounterRuntimeState;

/// 浮点比较容差（毫秒）
const TIME_EPSILON_MS: f64 = 1e-9;

/// 计数器绑定的元素
///
/// 宿主实现此 trait，把真实 DOM 节点（或测试替身）交给计数器。
pub trait CounterElement {
    /// 是否为可渲染的元素节点
    fn is_element(&self) -> bool;

    /// 节点类型描述，用于错误信息
    fn node_kind(&self) -> String {
        if self.is_element() {
            "element".to_string()
        } else {
            "unknown".to_string()
        }
    }

    /// 当前文本内容
    fn text_content(&self) -> Option<String>;

    /// 写入文本内容
    fn set_text_content(&mut self, text: String);

    /// 祖先链的 `overflow-x`，由近到远
    fn ancestor_overflow_x(&self) -> Vec<Overflow> {
        Vec::new()
    }
}

/// 可见性事件
///
/// 对应一次 IntersectionObserver 回调，附带当时的滚动偏移。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilityEvent {
    /// 是否与根相交
    pub intersecting: bool,
    /// 可见比例 [0, 1]
    #[serde(default)]
    pub ratio: f64,
    /// 元素当前的 bounding rect
    pub rect: Rect,
    /// 根（视口或容器）几何
    pub root: RootGeometry,
    /// 滚动容器当前偏移（视口为 scrollY，容器为 scrollLeft）
    pub scroll_offset: f64,
}

/// 等待触发的延迟启动
#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingStart {
    remaining_ms: f64,
}

/// 计数器
pub struct Counter<E: CounterElement> {
    element: E,
    config: CounterConfig,
    target: CounterTarget,
    diagnostics: DiagnosticResult,
    state: CounterRuntimeState,
    tracker: ScrollTracker,
    pending: Option<PendingStart>,
    driver: Option<DriverRun>,
    detached: bool,
}

impl<E: CounterElement> std::fmt::Debug for Counter<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("config", &self.config)
            .field("target", &self.target)
            .field("state", &self.state)
            .field("animating", &self.driver.is_some())
            .field("pending", &self.pending.is_some())
            .field("detached", &self.detached)
            .finish()
    }
}

impl<E: CounterElement> Counter<E> {
    /// 挂载计数器
    ///
    /// 目标不是元素时记录错误并返回 `Err`，不创建任何状态。
    /// 选项错误只产生诊断（同时写入日志），不会导致失败。
    ///
    /// # 参数
    ///
    /// - `element`: 目标元素
    /// - `options`: 原始选项
    /// - `initial_scroll_offset`: 挂载时滚动容器的偏移
    pub fn attach(
        element: E,
        options: &CounterOptions,
        initial_scroll_offset: f64,
    ) -> CounterResult<Self> {
        if !element.is_element() {
            let err = AttachError::NotAnElement {
                kind: element.node_kind(),
            };
            err.diagnostic().emit();
            return Err(err);
        }

        let resolved = CounterConfig::resolve(options);
        resolved.diagnostics.emit_all();
        let config = resolved.config;

        let text = element.text_content().unwrap_or_default();
        let target = CounterTarget::new(&text, config.percent);
        let container = ScrollContainer::resolve(&element.ancestor_overflow_x());
        let tracker = ScrollTracker::new(container, initial_scroll_offset);

        debug!(
            start = target.start_value,
            end = target.end_value,
            decoration = %target.decoration,
            repeat = %config.repeat,
            container = ?container,
            "计数器已挂载"
        );

        Ok(Self {
            element,
            state: CounterRuntimeState::new(target.start_value),
            config,
            target,
            diagnostics: resolved.diagnostics,
            tracker,
            pending: None,
            driver: None,
            detached: false,
        })
    }

    /// 处理一次可见性回调
    ///
    /// 返回状态机产出的 Effect（已被应用），便于宿主观察。
    pub fn handle_visibility(&mut self, event: VisibilityEvent) -> Vec<Effect> {
        if self.detached {
            return Vec::new();
        }

        let direction = self.tracker.observe(event.scroll_offset);
        let hidden_side = if event.intersecting {
            None
        } else {
            self.tracker.hidden_side(&event.rect, &event.root)
        };

        let facts = VisibilityFacts {
            intersecting: event.intersecting,
            ratio: event.ratio.clamp(0.0, 1.0),
            direction,
            hidden_side,
        };
        trace!(?facts, "可见性变化");

        let ctx = MachineContext::new(&self.config, &self.target);
        let effects = machine::transition(&mut self.state, &ctx, &facts);
        for effect in &effects {
            self.apply(effect);
        }
        effects
    }

    /// 推进时间
    ///
    /// 按时间顺序触发到期的驱动器 tick 和延迟启动。同一时刻两者都到期时先 tick。
    pub fn advance(&mut self, elapsed: Duration) {
        if self.detached {
            return;
        }

        let mut remaining = elapsed.as_secs_f64() * 1000.0;
        loop {
            let next = [
                self.pending.map(|p| p.remaining_ms.max(0.0)),
                self.driver.as_ref().and_then(DriverRun::time_until_tick),
            ]
            .into_iter()
            .flatten()
            .reduce(f64::min);

            let Some(next) = next else { break };
            if next > remaining + TIME_EPSILON_MS {
                self.elapse(remaining);
                break;
            }

            let dt = next.min(remaining).max(0.0);
            self.elapse(dt);
            remaining -= dt;
        }
    }

    /// 立即从起点启动驱动器（替换现有驱动器）
    pub fn start_animation(&mut self) {
        if self.detached {
            return;
        }
        if self.driver.take().is_some() {
            debug!("替换正在运行的驱动器");
        }

        let run = DriverRun::start(
            self.target.start_value,
            self.target.end_value,
            self.config.duration_ms,
        );
        self.render(run.current());
        self.driver = Some(run);
    }

    /// 取消驱动器
    ///
    /// 幂等：没有运行中的驱动器时不做任何事。返回是否真的取消了。
    pub fn cancel_driver(&mut self) -> bool {
        self.driver.take().is_some()
    }

    /// 取消驱动器和尚未触发的延迟启动
    pub fn cancel_animation(&mut self) -> bool {
        let had_pending = self.pending.take().is_some();
        let had_driver = self.cancel_driver();
        had_pending || had_driver
    }

    /// 卸载计数器
    ///
    /// 清理所有定时器，之后的事件和时间推进都会被忽略。
    pub fn detach(&mut self) {
        if self.detached {
            return;
        }
        self.cancel_animation();
        self.detached = true;
        debug!("计数器已卸载");
    }

    /// 卸载并取回元素
    pub fn into_element(mut self) -> E {
        self.detach();
        self.element
    }

    /// 是否有驱动器正在运行
    pub fn is_animating(&self) -> bool {
        self.driver.is_some()
    }

    /// 是否有等待触发的延迟启动
    pub fn has_pending_start(&self) -> bool {
        self.pending.is_some()
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    pub fn target(&self) -> &CounterTarget {
        &self.target
    }

    pub fn state(&self) -> &CounterRuntimeState {
        &self.state
    }

    pub fn tracker(&self) -> &ScrollTracker {
        &self.tracker
    }

    pub fn diagnostics(&self) -> &DiagnosticResult {
        &self.diagnostics
    }

    pub fn driver(&self) -> Option<&DriverRun> {
        self.driver.as_ref()
    }

    fn apply(&mut self, effect: &Effect) {
        match effect {
            Effect::ScheduleStart { delay_ms } => {
                if self.pending.is_some() {
                    debug!("替换尚未触发的延迟启动");
                }
                self.pending = Some(PendingStart {
                    remaining_ms: *delay_ms,
                });
            }
            Effect::CancelDriver => {
                self.cancel_driver();
            }
            Effect::SetValue(value) => self.render(*value),
        }
    }

    fn elapse(&mut self, dt: f64) {
        if let Some(run) = self.driver.as_mut() {
            let outcomes = run.advance(dt);
            for outcome in outcomes {
                self.render(outcome.value);
                if outcome.finished {
                    self.driver = None;
                    self.state.has_animated_once = true;
                    debug!(value = outcome.value, "计数器动画完成");
                }
            }
        }

        if let Some(pending) = self.pending.as_mut() {
            pending.remaining_ms -= dt;
            if pending.remaining_ms <= TIME_EPSILON_MS {
                self.pending = None;
                self.start_animation();
            }
        }
    }

    fn render(&mut self, value: f64) {
        self.state.current_value = value;
        self.element.set_text_content(self.target.format(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RepeatMode;
    use crate::diagnostic::DiagnosticKind;

    /// 测试用元素：记录每一次写入
    #[derive(Debug, Default)]
    struct FakeElement {
        text: String,
        writes: Vec<String>,
        element: bool,
        overflow: Vec<Overflow>,
    }

    impl FakeElement {
        fn new(text: &str) -> Self {
            Self {
                text: text.to_string(),
                element: true,
                ..Default::default()
            }
        }
    }

    impl CounterElement for FakeElement {
        fn is_element(&self) -> bool {
            self.element
        }

        fn node_kind(&self) -> String {
            if self.element { "div" } else { "#text" }.to_string()
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

    fn viewport() -> RootGeometry {
        RootGeometry::viewport(800.0, 600.0)
    }

    fn visible(ratio: f64, scroll: f64) -> VisibilityEvent {
        VisibilityEvent {
            intersecting: true,
            ratio,
            rect: Rect::new(0.0, 300.0, 100.0, 40.0),
            root: viewport(),
            scroll_offset: scroll,
        }
    }

    fn below(scroll: f64) -> VisibilityEvent {
        VisibilityEvent {
            intersecting: false,
            ratio: 0.0,
            rect: Rect::new(0.0, 900.0, 100.0, 40.0),
            root: viewport(),
            scroll_offset: scroll,
        }
    }

    fn above(scroll: f64) -> VisibilityEvent {
        VisibilityEvent {
            intersecting: false,
            ratio: 0.0,
            rect: Rect::new(0.0, -200.0, 100.0, 40.0),
            root: viewport(),
            scroll_offset: scroll,
        }
    }

    fn options(repeat: RepeatMode) -> CounterOptions {
        CounterOptions::default()
            .with_percent(50.0)
            .with_duration(1000.0)
            .with_delay(0.0)
            .with_repeat(repeat)
    }

    #[test]
    fn test_rejects_non_element() {
        let mut element = FakeElement::new("10");
        element.element = false;
        let err = Counter::attach(element, &CounterOptions::default(), 0.0).unwrap_err();
        assert_eq!(err.diagnostic().kind, DiagnosticKind::InvalidTarget);
        assert_eq!(
            err,
            AttachError::NotAnElement {
                kind: "#text".to_string()
            }
        );
    }

    #[test]
    fn test_attach_does_not_render() {
        let counter =
            Counter::attach(FakeElement::new("Clients: 120+"), &options(RepeatMode::None), 0.0)
                .unwrap();
        assert!(counter.element().writes.is_empty());
        assert_eq!(counter.target().start_value, 60.0);
        assert_eq!(counter.state().current_value, 60.0);
        assert!(!counter.is_animating());
    }

    #[test]
    fn test_first_appearance_animates_once() {
        let mut counter =
            Counter::attach(FakeElement::new("Clients: 120+"), &options(RepeatMode::None), 0.0)
                .unwrap();

        counter.handle_visibility(visible(0.2, 10.0));
        assert!(counter.has_pending_start());

        counter.advance(Duration::ZERO);
        assert!(counter.is_animating());
        assert_eq!(counter.element().writes[0], "60Clients: +");

        counter.advance(Duration::from_millis(1000));
        assert!(!counter.is_animating());
        assert!(counter.state().has_animated_once);
        assert_eq!(counter.element().text, "120Clients: +");
        assert_eq!(counter.element().writes.len(), 61);

        // 滚走再回来：不再变化
        counter.handle_visibility(above(900.0));
        counter.handle_visibility(visible(0.5, 100.0));
        counter.advance(Duration::from_millis(2000));
        assert_eq!(counter.element().writes.len(), 61);
        assert_eq!(counter.element().text, "120Clients: +");
    }

    #[test]
    fn test_delay_is_respected() {
        let options = options(RepeatMode::None).with_delay(100.0);
        let mut counter = Counter::attach(FakeElement::new("100"), &options, 0.0).unwrap();

        counter.handle_visibility(visible(0.3, 5.0));
        counter.advance(Duration::from_millis(99));
        assert!(counter.element().writes.is_empty());
        assert!(counter.has_pending_start());

        counter.advance(Duration::from_millis(1));
        assert!(counter.is_animating());
        assert_eq!(counter.element().writes, vec!["50".to_string()]);
    }

    #[test]
    fn test_second_start_replaces_first() {
        let mut counter =
            Counter::attach(FakeElement::new("120"), &options(RepeatMode::None), 0.0).unwrap();

        counter.start_animation();
        counter.advance(Duration::from_millis(500));
        assert!(counter.state().current_value > 60.0);

        counter.start_animation();
        assert_eq!(counter.state().current_value, 60.0);
        assert_eq!(counter.driver().map(DriverRun::ticks), Some(0));

        counter.advance(Duration::from_millis(1000));
        assert!(!counter.is_animating());
        assert_eq!(counter.state().current_value, 120.0);
        assert_eq!(counter.element().text, "120");
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut counter =
            Counter::attach(FakeElement::new("120"), &options(RepeatMode::None), 0.0).unwrap();
        assert!(!counter.cancel_driver());
        assert!(!counter.cancel_driver());
        assert!(counter.element().writes.is_empty());

        counter.start_animation();
        counter.advance(Duration::from_millis(100));
        let text = counter.element().text.clone();
        assert!(counter.cancel_driver());
        assert!(!counter.cancel_driver());
        counter.advance(Duration::from_millis(1000));
        assert_eq!(counter.element().text, text);
    }

    #[test]
    fn test_always_tracks_ratio_and_resets() {
        let mut counter =
            Counter::attach(FakeElement::new("120"), &options(RepeatMode::Always), 0.0).unwrap();

        counter.handle_visibility(visible(0.3, 10.0));
        assert_eq!(counter.state().current_value, 60.0 + 60.0 * 0.3);
        counter.handle_visibility(visible(0.7, 20.0));
        assert_eq!(counter.state().current_value, 60.0 + 60.0 * 0.7);
        assert_eq!(counter.element().text, "102");
        assert!(!counter.has_pending_start());

        counter.handle_visibility(above(900.0));
        assert_eq!(counter.state().current_value, 60.0);
        assert_eq!(counter.element().text, "60");
    }

    #[test]
    fn test_on_reappear_replays_after_full_hide() {
        let mut counter =
            Counter::attach(FakeElement::new("120"), &options(RepeatMode::OnReappear), 0.0)
                .unwrap();

        counter.handle_visibility(visible(0.5, 10.0));
        counter.advance(Duration::from_millis(1100));
        assert!(counter.state().has_animated_once);
        let writes = counter.element().writes.len();

        counter.handle_visibility(above(900.0));
        counter.handle_visibility(visible(0.2, 500.0));
        counter.advance(Duration::ZERO);
        assert!(counter.is_animating());
        assert_eq!(counter.element().writes.len(), writes + 1);
        assert_eq!(counter.element().text, "60");
    }

    #[test]
    fn test_on_reverse_scroll_via_events() {
        let mut counter = Counter::attach(
            FakeElement::new("120"),
            &options(RepeatMode::OnReverseScroll),
            0.0,
        )
        .unwrap();

        // 加载时在视口下方
        counter.handle_visibility(below(0.0));
        assert_eq!(
            counter.state().initial_hidden_side,
            Some(crate::geometry::HiddenSide::Bottom)
        );

        // 向下滚动出现
        counter.handle_visibility(visible(0.1, 200.0));
        counter.advance(Duration::from_millis(1100));
        assert!(counter.state().has_animated_once);

        // 向上滚回，元素从下方离开
        counter.handle_visibility(below(100.0));
        // 再向下滚：方向反转，隐藏侧一致
        counter.handle_visibility(visible(0.1, 200.0));
        assert!(counter.has_pending_start());

        counter.advance(Duration::from_millis(1100));
        assert_eq!(counter.element().text, "120");

        // 向下滚过顶部再向上回来：隐藏侧不一致，不重播
        counter.handle_visibility(above(900.0));
        counter.handle_visibility(visible(0.1, 800.0));
        assert!(!counter.has_pending_start());
    }

    #[test]
    fn test_horizontal_container() {
        let mut element = FakeElement::new("40");
        element.overflow = vec![Overflow::Visible, Overflow::Auto];
        let mut counter =
            Counter::attach(element, &options(RepeatMode::OnReverseScroll), 0.0).unwrap();
        assert_eq!(
            counter.tracker().container(),
            ScrollContainer::Horizontal
        );

        let root = RootGeometry::container(Rect::new(0.0, 0.0, 300.0, 100.0));
        counter.handle_visibility(VisibilityEvent {
            intersecting: false,
            ratio: 0.0,
            rect: Rect::new(400.0, 0.0, 50.0, 50.0),
            root,
            scroll_offset: 0.0,
        });
        assert_eq!(
            counter.state().initial_hidden_side,
            Some(crate::geometry::HiddenSide::Right)
        );
        assert_eq!(
            counter.state().last_scroll_direction,
            Some(crate::geometry::ScrollDirection::Right)
        );
    }

    fn carousel_event(intersecting: bool, left: f64, scroll: f64) -> VisibilityEvent {
        VisibilityEvent {
            intersecting,
            ratio: if intersecting { 1.0 } else { 0.0 },
            rect: Rect::new(left, 0.0, 50.0, 50.0),
            root: RootGeometry::container(Rect::new(0.0, 0.0, 300.0, 100.0)),
            scroll_offset: scroll,
        }
    }

    fn carousel_counter() -> Counter<FakeElement> {
        let mut element = FakeElement::new("40");
        element.overflow = vec![Overflow::Auto];
        Counter::attach(element, &options(RepeatMode::OnReverseScroll), 0.0).unwrap()
    }

    #[test]
    fn test_horizontal_reverse_scroll_replays_from_right() {
        let mut counter = carousel_counter();

        // 初始隐藏在右侧，向右滚动进入
        counter.handle_visibility(carousel_event(false, 400.0, 0.0));
        counter.handle_visibility(carousel_event(true, 100.0, 200.0));
        counter.advance(Duration::from_millis(1100));
        assert!(counter.state().has_animated_once);
        assert_eq!(counter.element().text, "40");

        // 向左滚动，元素从右侧离开
        counter.handle_visibility(carousel_event(false, 400.0, 100.0));
        assert_eq!(
            counter.state().last_scroll_direction,
            Some(crate::geometry::ScrollDirection::Left)
        );
        assert_eq!(
            counter.state().last_hidden_side,
            Some(crate::geometry::HiddenSide::Right)
        );

        // 再向右滚回
        counter.handle_visibility(carousel_event(true, 100.0, 200.0));
        assert!(counter.has_pending_start());

        counter.advance(Duration::from_millis(20));
        assert_eq!(counter.element().text, "20");
    }

    #[test]
    fn test_horizontal_reverse_scroll_skips_other_side() {
        let mut counter = carousel_counter();

        counter.handle_visibility(carousel_event(false, 400.0, 0.0));
        counter.handle_visibility(carousel_event(true, 100.0, 200.0));
        counter.advance(Duration::from_millis(1100));

        // 继续向右滚，元素从左侧离开；再向左滚回
        counter.handle_visibility(carousel_event(false, -200.0, 900.0));
        assert_eq!(
            counter.state().last_hidden_side,
            Some(crate::geometry::HiddenSide::Left)
        );
        counter.handle_visibility(carousel_event(true, 100.0, 700.0));

        assert!(!counter.has_pending_start());
        assert!(!counter.is_animating());
        assert_eq!(counter.element().text, "40");
    }

    #[test]
    fn test_detach_stops_everything() {
        let mut counter =
            Counter::attach(FakeElement::new("120"), &options(RepeatMode::None), 0.0).unwrap();
        counter.handle_visibility(visible(0.5, 10.0));
        counter.detach();
        assert!(!counter.has_pending_start());

        counter.advance(Duration::from_millis(2000));
        assert!(counter.element().writes.is_empty());
        assert!(counter.handle_visibility(visible(0.9, 20.0)).is_empty());

        let element = counter.into_element();
        assert_eq!(element.text, "120");
    }

    #[test]
    fn test_rescheduling_keeps_single_pending() {
        let options = options(RepeatMode::None).with_delay(100.0);
        let mut counter = Counter::attach(FakeElement::new("120"), &options, 0.0).unwrap();

        counter.handle_visibility(visible(0.1, 10.0));
        counter.advance(Duration::from_millis(60));
        counter.handle_visibility(visible(0.2, 20.0));

        // 第一次调度已被替换：60ms 后尚未启动
        counter.advance(Duration::from_millis(60));
        assert!(!counter.is_animating());
        counter.advance(Duration::from_millis(40));
        assert!(counter.is_animating());
    }
}
