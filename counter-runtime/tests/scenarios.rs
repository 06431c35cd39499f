//! # 场景测试
//!
//! 以真实页面的滚动过程驱动计数器，覆盖四种重复模式。

mod common;

use std::time::Duration;

use common::{PageElement, above_viewport, below_viewport, shown};
use counter_runtime::{
    Counter, CounterOptions, HiddenSide, Overflow, Rect, RepeatMode, RootGeometry, VisibilityEvent,
};

/// 按 16ms 一帧推进
fn run_frames(counter: &mut Counter<PageElement>, total_ms: u64) {
    let mut elapsed = 0;
    while elapsed < total_ms {
        let frame = 16.min(total_ms - elapsed);
        counter.advance(Duration::from_millis(frame));
        elapsed += frame;
    }
}

#[test]
fn test_clients_counter_runs_once() {
    let options = CounterOptions::default()
        .with_percent(50.0)
        .with_repeat("none");
    let mut counter = Counter::attach(PageElement::new("Clients: 120+"), &options, 0.0).unwrap();

    assert_eq!(counter.target().start_value, 60.0);
    assert_eq!(counter.target().end_value, 120.0);
    assert_eq!(counter.target().decoration, "Clients: +");

    counter.handle_visibility(below_viewport(0.0));
    counter.handle_visibility(shown(0.1, 400.0));
    run_frames(&mut counter, 2_100);

    assert_eq!(counter.element().writes.first().map(String::as_str), Some("60Clients: +"));
    assert_eq!(counter.element().text, "120Clients: +");
    let frames = counter.element().writes.len();

    // 向下滚过，再滚回来
    counter.handle_visibility(above_viewport(1_600.0));
    counter.handle_visibility(shown(0.4, 900.0));
    run_frames(&mut counter, 2_100);

    assert_eq!(counter.element().writes.len(), frames);
    assert_eq!(counter.element().text, "120Clients: +");
}

#[test]
fn test_frame_transcript() {
    let options = CounterOptions::default()
        .with_percent(50.0)
        .with_duration(100.0)
        .with_delay(0.0);
    let mut counter = Counter::attach(PageElement::new("120"), &options, 0.0).unwrap();

    counter.handle_visibility(shown(1.0, 10.0));
    counter.advance(Duration::from_millis(200));

    let frames: Vec<i64> = counter
        .element()
        .writes
        .iter()
        .map(|text| text.parse::<i64>().unwrap())
        .collect();
    insta::assert_yaml_snapshot!("clients_frames", frames);
}

#[test]
fn test_always_ratio_drive() {
    let options = CounterOptions::default()
        .with_percent(0.0)
        .with_repeat("ALWAYS");
    let mut counter = Counter::attach(PageElement::new("-3.5 kg"), &options, 0.0).unwrap();
    assert_eq!(counter.target().decoration, " kg");

    for (ratio, scroll) in [(0.3, 10.0), (0.5, 20.0), (0.7, 30.0)] {
        counter.handle_visibility(shown(ratio, scroll));
        assert_eq!(counter.state().current_value, 0.0 + (-3.5 - 0.0) * ratio);
        assert!(!counter.is_animating());
    }
    assert_eq!(counter.element().text, "-2 kg");

    // 时间推进不会改变显示
    let writes = counter.element().writes.len();
    counter.advance(Duration::from_millis(5_000));
    assert_eq!(counter.element().writes.len(), writes);

    counter.handle_visibility(above_viewport(2_000.0));
    assert_eq!(counter.state().current_value, 0.0);
    assert_eq!(counter.element().text, "0 kg");
}

#[test]
fn test_on_reverse_scroll_replays_from_same_side() {
    let options = CounterOptions::default()
        .with_percent(50.0)
        .with_duration(500.0)
        .with_delay(50.0)
        .with_repeat(RepeatMode::OnReverseScroll);
    let mut counter = Counter::attach(PageElement::new("200%"), &options, 0.0).unwrap();

    // 加载时元素在视口下方
    counter.handle_visibility(below_viewport(0.0));
    assert_eq!(counter.state().initial_hidden_side, Some(HiddenSide::Bottom));

    counter.handle_visibility(shown(0.2, 300.0));
    run_frames(&mut counter, 600);
    assert!(counter.state().has_animated_once);
    assert_eq!(counter.element().text, "200%");

    // 向上滚回去，元素从底部离开
    counter.handle_visibility(below_viewport(100.0));
    assert_eq!(counter.state().last_hidden_side, Some(HiddenSide::Bottom));

    // 再向下滚：重播
    counter.handle_visibility(shown(0.2, 300.0));
    run_frames(&mut counter, 40);
    assert!(!counter.is_animating());
    run_frames(&mut counter, 20);
    assert!(counter.is_animating());
    assert_eq!(counter.element().text, "100%");
    run_frames(&mut counter, 600);
    assert_eq!(counter.element().text, "200%");

    // 向下滚过顶部后再回来：隐藏侧不同，不重播
    let writes = counter.element().writes.len();
    counter.handle_visibility(above_viewport(1_500.0));
    counter.handle_visibility(shown(0.2, 1_000.0));
    run_frames(&mut counter, 600);
    assert_eq!(counter.element().writes.len(), writes);
}

#[test]
fn test_on_reappear_in_horizontal_container() {
    let mut element = PageElement::new("48 items");
    element.overflow = vec![Overflow::Hidden, Overflow::Scroll];
    let options = CounterOptions::default()
        .with_percent("25")
        .with_duration(200.0)
        .with_repeat("onreappear");
    let mut counter = Counter::attach(element, &options, 0.0).unwrap();
    assert_eq!(counter.target().start_value, 12.0);

    let root = RootGeometry::container(Rect::new(20.0, 100.0, 600.0, 200.0));
    let at = |left: f64, intersecting: bool, scroll: f64| VisibilityEvent {
        intersecting,
        ratio: if intersecting { 1.0 } else { 0.0 },
        rect: Rect::new(left, 120.0, 80.0, 40.0),
        root,
        scroll_offset: scroll,
    };

    counter.handle_visibility(at(700.0, false, 0.0));
    assert_eq!(counter.state().initial_hidden_side, Some(HiddenSide::Right));

    counter.handle_visibility(at(300.0, true, 400.0));
    run_frames(&mut counter, 300);
    assert_eq!(counter.element().text, "48 items");

    // 向右滚动直到元素从左侧离开，再滚回来
    counter.handle_visibility(at(-200.0, false, 900.0));
    assert_eq!(counter.state().last_hidden_side, Some(HiddenSide::Left));
    counter.handle_visibility(at(300.0, true, 400.0));
    counter.advance(Duration::ZERO);
    assert_eq!(counter.element().text, "12 items");

    run_frames(&mut counter, 300);
    assert_eq!(counter.element().text, "48 items");
}
