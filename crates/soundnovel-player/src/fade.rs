//! 페이드 단계 계산.
//!
//! 볼륨은 고정 간격마다 고정 폭만큼 움직인다. 시간 대신 단계로 표현하므로
//! 시작 볼륨이 달라도 같은 규칙으로 수렴한다.

use soundnovel_core::config::ReaderConfig;
use std::time::Duration;

/// 이 값 이하는 무음으로 본다 (f32 누적 오차 흡수)
pub const SILENCE: f32 = 0.001;

/// 페이드 주기
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeCadence {
    pub step: f32,
    pub interval: Duration,
}

impl FadeCadence {
    pub fn new(step: f32, interval: Duration) -> Self {
        Self {
            step: step.clamp(0.01, 1.0),
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn from_config(config: &ReaderConfig) -> Self {
        Self::new(config.audio.fade_step, config.fade_interval())
    }

    /// 한 단계 감소. 무음 근처면 0으로 고정한다.
    pub fn step_down(&self, volume: f32) -> f32 {
        let next = volume - self.step;
        if next <= SILENCE {
            0.0
        } else {
            next
        }
    }

    /// `target`을 향해 한 단계 증가. 목표를 넘지 않는다.
    pub fn step_up(&self, volume: f32, target: f32) -> f32 {
        let next = (volume + self.step).min(target);
        if target - next <= SILENCE {
            target
        } else {
            next
        }
    }

    /// `from`에서 무음까지 필요한 단계 수
    pub fn steps_to_silence(&self, from: f32) -> u32 {
        let mut volume = from;
        let mut steps = 0;
        while volume > 0.0 {
            volume = self.step_down(volume);
            steps += 1;
        }
        steps
    }
}

impl Default for FadeCadence {
    fn default() -> Self {
        Self::from_config(&ReaderConfig::default_config())
    }
}
