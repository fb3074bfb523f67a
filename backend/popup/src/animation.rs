//! Ease-out counter animation.

use crate::state::AnimatedValues;

/// Value of `target` at zero-based `frame` of a `frames`-step ease-out cubic.
///
/// The last frame is exactly `target`; earlier frames are floored.
pub fn frame_value(target: u32, frame: u32, frames: u32) -> u32 {
    let frames = frames.max(1);
    if frame + 1 >= frames {
        return target;
    }
    let progress = f64::from(frame + 1) / f64::from(frames);
    let eased = 1.0 - (1.0 - progress).powi(3);
    (f64::from(target) * eased).floor() as u32
}

/// Three counters animated in lockstep on one schedule.
#[derive(Debug, Clone, Copy)]
pub struct CounterAnimation {
    targets: AnimatedValues,
    frames: u32,
}

impl CounterAnimation {
    pub fn new(targets: AnimatedValues, frames: u32) -> Self {
        Self {
            targets,
            frames: frames.max(1),
        }
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn is_last(&self, frame: u32) -> bool {
        frame + 1 >= self.frames
    }

    pub fn values_at(&self, frame: u32) -> AnimatedValues {
        AnimatedValues {
            reward: frame_value(self.targets.reward, frame, self.frames),
            discount_percent: frame_value(self.targets.discount_percent, frame, self.frames),
            max_earning: frame_value(self.targets.max_earning, frame, self.frames),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_frame_is_exact_target() {
        for target in [0, 1, 25, 500, 5_000, 999_999] {
            assert_eq!(frame_value(target, 59, 60), target);
        }
    }

    #[test]
    fn frames_are_monotonic_and_bounded() {
        let mut previous = 0;
        for frame in 0..60 {
            let value = frame_value(5_000, frame, 60);
            assert!(value >= previous);
            assert!(value <= 5_000);
            previous = value;
        }
    }

    #[test]
    fn eases_out() {
        // First frame: 1 - (59/60)^3 of 500 is about 24.6.
        assert_eq!(frame_value(500, 0, 60), 24);
        // Halfway the curve is already at 7/8.
        assert_eq!(frame_value(5_000, 29, 60), 4_375);
    }

    #[test]
    fn single_frame_jumps_to_target() {
        assert_eq!(frame_value(25, 0, 1), 25);
        assert_eq!(frame_value(25, 0, 0), 25);
    }

    #[test]
    fn lockstep_values() {
        let animation = CounterAnimation::new(
            AnimatedValues {
                reward: 500,
                discount_percent: 25,
                max_earning: 5_000,
            },
            60,
        );
        assert!(animation.is_last(59));
        let last = animation.values_at(59);
        assert_eq!(
            (last.reward, last.discount_percent, last.max_earning),
            (500, 25, 5_000)
        );
    }
}
