//! # Driver 模块
//!
//! 固定步长的插值驱动器：以每秒 60 步的逻辑节拍把值从起点推到终点。
//!
//! 驱动器不持有真实定时器，时间由调用方通过 [`DriverRun::advance`] 推进。
//! 第 k 次 tick 的到期时间是 `k * interval_ms`，按累计时间判断，不会累积漂移。

use serde::{Deserialize, Serialize};

/// 每秒逻辑步数
pub const STEPS_PER_SECOND: f64 = 60.0;

/// 浮点比较容差（毫秒）
const TIME_EPSILON_MS: f64 = 1e-9;

/// 单次 tick 的结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    /// 本次写入的值
    pub value: f64,
    /// 是否已到达终点
    pub finished: bool,
}

/// 一次插值动画
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverRun {
    start: f64,
    end: f64,
    /// 带方向的步长
    step: f64,
    /// tick 间隔（毫秒）
    interval_ms: f64,
    current: f64,
    /// 自启动以来经过的时间
    elapsed_ms: f64,
    ticks: u64,
    finished: bool,
}

impl DriverRun {
    /// 创建一次从 `start` 到 `end`、时长 `duration_ms` 的插值
    ///
    /// 创建后 [`DriverRun::current`] 即为起点，调用方应立即写入一次。
    pub fn start(start: f64, end: f64, duration_ms: f64) -> Self {
        let frames = frame_count(duration_ms);
        let direction = if start < end { 1.0 } else { -1.0 };
        let step = ((end - start).abs() / frames) * direction;

        Self {
            start,
            end,
            step,
            interval_ms: duration_ms / frames,
            current: start,
            elapsed_ms: 0.0,
            ticks: 0,
            finished: false,
        }
    }

    pub fn start_value(&self) -> f64 {
        self.start
    }

    pub fn end_value(&self) -> f64 {
        self.end
    }

    pub fn current(&self) -> f64 {
        self.current
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn interval_ms(&self) -> f64 {
        self.interval_ms
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// 距离下一次 tick 的时间（已结束时为 `None`）
    pub fn time_until_tick(&self) -> Option<f64> {
        if self.finished {
            return None;
        }
        let due = (self.ticks + 1) as f64 * self.interval_ms;
        Some((due - self.elapsed_ms).max(0.0))
    }

    /// 执行一次 tick
    ///
    /// 到达或越过终点的那一次 tick 会被钳制到终点并结束。
    pub fn tick(&mut self) -> TickOutcome {
        if self.finished {
            return TickOutcome {
                value: self.current,
                finished: true,
            };
        }

        self.ticks += 1;
        self.current += self.step;

        let reached = if self.step > 0.0 {
            self.current >= self.end
        } else {
            self.current <= self.end
        };
        if reached {
            self.current = self.end;
            self.finished = true;
        }

        TickOutcome {
            value: self.current,
            finished: self.finished,
        }
    }

    /// 推进时间，返回期间到期的所有 tick
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        if self.finished {
            return outcomes;
        }

        self.elapsed_ms += elapsed_ms.max(0.0);
        while !self.finished {
            let due = (self.ticks + 1) as f64 * self.interval_ms;
            if self.elapsed_ms + TIME_EPSILON_MS < due {
                break;
            }
            outcomes.push(self.tick());
        }
        outcomes
    }
}

/// 总帧数：`max(1, round(duration / 1000 * 60))`
pub fn frame_count(duration_ms: f64) -> f64 {
    (duration_ms / 1000.0 * STEPS_PER_SECOND).round().max(1.0)
}
