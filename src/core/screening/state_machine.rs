//! 亮度极值状态机 - 把亮度序列归约为"方向反转"事件

use log::trace;

/// 一次亮度反转
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrightnessEvent {
    /// |累计亮度变化|
    pub amplitude: f64,
    /// 自上一次反转以来跨过的帧数
    pub frame_gap: u64,
    /// 反转两侧亮度中较低的一个
    pub extremum_brightness: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtremaState {
    /// 尚未收到任何采样
    Empty,
    Tracking {
        previous_brightness: f64,
        /// 0 表示当前没有方向
        accumulated_delta: f64,
        frames_since_last_event: u64,
    },
}

impl ExtremaState {
    pub fn new() -> Self {
        ExtremaState::Empty
    }

    pub fn transition(
        &self,
        brightness: f64,
        stride: u64,
    ) -> (ExtremaState, Option<BrightnessEvent>) {
        match self {
            ExtremaState::Empty => (
                ExtremaState::Tracking {
                    previous_brightness: brightness,
                    accumulated_delta: 0.0,
                    frames_since_last_event: 0,
                },
                None,
            ),

            ExtremaState::Tracking {
                previous_brightness,
                accumulated_delta,
                frames_since_last_event,
            } => {
                let delta = brightness - previous_brightness;

                if is_reversal(delta, *accumulated_delta) {
                    let event = BrightnessEvent {
                        amplitude: accumulated_delta.abs(),
                        frame_gap: *frames_since_last_event,
                        extremum_brightness: brightness.min(*previous_brightness),
                    };
                    (
                        ExtremaState::Tracking {
                            previous_brightness: brightness,
                            accumulated_delta: 0.0,
                            frames_since_last_event: 0,
                        },
                        Some(event),
                    )
                } else {
                    (
                        ExtremaState::Tracking {
                            previous_brightness: brightness,
                            accumulated_delta: accumulated_delta + delta,
                            frames_since_last_event: frames_since_last_event + stride,
                        },
                        None,
                    )
                }
            }
        }
    }
}

impl Default for ExtremaState {
    fn default() -> Self {
        Self::new()
    }
}

/// 按符号位比较：平稳的一步（+0）会终结下降段，但不会终结上升段
fn is_reversal(delta: f64, accumulated: f64) -> bool {
    accumulated != 0.0 && delta.is_sign_negative() != accumulated.is_sign_negative()
}

pub struct ExtremaTracker {
    state: ExtremaState,
    stride: u64,
    sample_counter: u64,
    event_counter: u64,
}

impl ExtremaTracker {
    /// `stride` is the frame-index step between consecutive samples.
    pub fn new(stride: u64) -> Self {
        Self {
            state: ExtremaState::new(),
            stride: stride.max(1),
            sample_counter: 0,
            event_counter: 0,
        }
    }

    pub fn push(&mut self, brightness: f64) -> Option<BrightnessEvent> {
        self.sample_counter += 1;

        let (new_state, event) = self.state.transition(brightness, self.stride);
        self.state = new_state;

        if let Some(e) = &event {
            self.event_counter += 1;
            trace!(
                "reversal #{} after sample {}: amplitude={:.3} gap={} extremum={:.3}",
                self.event_counter,
                self.sample_counter,
                e.amplitude,
                e.frame_gap,
                e.extremum_brightness
            );
        }

        event
    }

    /// 一次性处理整段序列
    pub fn extract(&mut self, series: impl IntoIterator<Item = f64>) -> Vec<BrightnessEvent> {
        series.into_iter().filter_map(|b| self.push(b)).collect()
    }

    pub fn current_state(&self) -> &ExtremaState {
        &self.state
    }

    pub fn stride(&self) -> u64 {
        self.stride
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_counter
    }

    pub fn event_count(&self) -> u64 {
        self.event_counter
    }

    pub fn reset(&mut self) {
        self.state = ExtremaState::new();
        self.sample_counter = 0;
        self.event_counter = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_only_primes() {
        let mut tracker = ExtremaTracker::new(1);
        assert_eq!(tracker.push(100.0), None);
        assert_eq!(
            tracker.current_state(),
            &ExtremaState::Tracking {
                previous_brightness: 100.0,
                accumulated_delta: 0.0,
                frames_since_last_event: 0,
            }
        );
    }

    #[test]
    fn test_monotonic_series_has_no_events() {
        let mut tracker = ExtremaTracker::new(1);
        let rising = tracker.extract((0..50).map(|i| i as f64 * 3.0));
        assert!(rising.is_empty());

        tracker.reset();
        let falling = tracker.extract((0..50).map(|i| 200.0 - i as f64));
        assert!(falling.is_empty());
        assert_eq!(tracker.sample_count(), 50);
    }

    #[test]
    fn test_alternating_series() {
        let mut tracker = ExtremaTracker::new(1);
        let events = tracker.extract([100.0, 150.0, 100.0, 150.0, 100.0]);

        // 每次反转的那个采样只用于触发事件，不计入下一段
        assert_eq!(events.len(), 2);
        for e in &events {
            assert_eq!(e.amplitude, 50.0);
            assert_eq!(e.frame_gap, 1);
            assert_eq!(e.extremum_brightness, 100.0);
        }

        tracker.reset();
        let events = tracker.extract([100.0, 150.0, 100.0, 150.0, 100.0, 150.0, 100.0]);
        assert_eq!(events.len(), 3);
        assert_eq!(tracker.event_count(), 3);
    }

    #[test]
    fn test_accumulates_across_same_direction_steps() {
        let mut tracker = ExtremaTracker::new(2);
        let events = tracker.extract([10.0, 20.0, 35.0, 60.0, 40.0]);

        assert_eq!(
            events,
            vec![BrightnessEvent {
                amplitude: 50.0,
                frame_gap: 6,
                extremum_brightness: 40.0,
            }]
        );
    }

    #[test]
    fn test_flat_step_ends_a_fall() {
        let mut tracker = ExtremaTracker::new(1);
        let events = tracker.extract([100.0, 80.0, 80.0, 120.0]);

        assert_eq!(
            events,
            vec![BrightnessEvent {
                amplitude: 20.0,
                frame_gap: 1,
                extremum_brightness: 80.0,
            }]
        );
        // 反转后累计归零，平稳与上升都只是继续累计
        assert!(matches!(
            tracker.current_state(),
            ExtremaState::Tracking { accumulated_delta, frames_since_last_event: 1, .. }
                if *accumulated_delta == 40.0
        ));
    }

    #[test]
    fn test_flat_step_keeps_a_rise() {
        let mut tracker = ExtremaTracker::new(1);
        let events = tracker.extract([80.0, 120.0, 120.0, 120.0, 80.0]);

        assert_eq!(
            events,
            vec![BrightnessEvent {
                amplitude: 40.0,
                frame_gap: 3,
                extremum_brightness: 80.0,
            }]
        );
    }

    #[test]
    fn test_zero_accumulator_is_not_a_direction() {
        let mut tracker = ExtremaTracker::new(1);
        let events = tracker.extract([50.0, 50.0, 50.0, 10.0]);
        assert!(events.is_empty());
        assert!(matches!(
            tracker.current_state(),
            ExtremaState::Tracking { accumulated_delta, .. } if *accumulated_delta == -40.0
        ));
    }

    #[test]
    fn test_stride_never_zero() {
        let tracker = ExtremaTracker::new(0);
        assert_eq!(tracker.stride(), 1);
    }
}
