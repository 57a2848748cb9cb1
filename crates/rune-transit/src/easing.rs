//! Easing curves handed to the tween driver.
//!
//! The coordinator never evaluates these itself; they are carried through to
//! [`TweenDriver::create_tween`](crate::tween::TweenDriver::create_tween) so a
//! driver can map linear progress to eased progress. The simulated driver in
//! [`sim`](crate::sim) evaluates them.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing function for tween timing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EasingFunction {
    /// Linear interpolation (no easing).
    Linear,

    /// Cosine ramp: slow start, fast middle, slow end.
    AccelerateDecelerate,

    /// `cubic-bezier(0.42, 0, 1, 1)`.
    EaseIn,

    /// `cubic-bezier(0, 0, 0.58, 1)`.
    EaseOut,

    /// Custom cubic bezier curve with control points (x1, y1) and (x2, y2).
    CubicBezier { x1: f32, y1: f32, x2: f32, y2: f32 },
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::Linear
    }
}

impl EasingFunction {
    /// Evaluate the easing function at `t` in 0.0..=1.0.
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, t),
        }
    }

    /// Create a custom cubic bezier easing function.
    ///
    /// # Panics
    /// Panics if x1 or x2 are outside [0, 1].
    pub fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        assert!(
            (0.0..=1.0).contains(&x1) && (0.0..=1.0).contains(&x2),
            "Bezier x values must be in [0, 1]"
        );
        Self::CubicBezier { x1, y1, x2, y2 }
    }
}

fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, progress: f32) -> f32 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let t = solve_bezier_x(x1, x2, progress);
    bezier_component(y1, y2, t)
}

/// Newton-Raphson solve for the curve parameter whose x equals `target_x`.
fn solve_bezier_x(x1: f32, x2: f32, target_x: f32) -> f32 {
    let mut t = target_x;

    for _ in 0..8 {
        let x = bezier_component(x1, x2, t) - target_x;
        if x.abs() < 1e-6 {
            break;
        }

        let mt = 1.0 - t;
        let dx = 3.0 * mt * mt * x1 + 6.0 * mt * t * (x2 - x1) + 3.0 * t * t * (1.0 - x2);
        if dx.abs() < 1e-6 {
            break;
        }

        t = (t - x / dx).clamp(0.0, 1.0);
    }

    t
}

/// One axis of a cubic bezier anchored at 0 and 1.
#[inline]
fn bezier_component(c1: f32, c2: f32, t: f32) -> f32 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * c1 + 3.0 * mt * t * t * c2 + t * t * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_endpoints() {
        for easing in [
            EasingFunction::Linear,
            EasingFunction::AccelerateDecelerate,
            EasingFunction::EaseIn,
            EasingFunction::EaseOut,
            EasingFunction::cubic_bezier(0.4, 0.0, 0.2, 1.0),
        ] {
            assert!(approx(easing.evaluate(0.0), 0.0), "{easing:?} at 0");
            assert!(approx(easing.evaluate(1.0), 1.0), "{easing:?} at 1");
        }
    }

    #[test]
    fn test_accelerate_decelerate_is_symmetric() {
        let easing = EasingFunction::AccelerateDecelerate;
        assert!(approx(easing.evaluate(0.5), 0.5));
        assert!(easing.evaluate(0.25) < 0.25);
        assert!(easing.evaluate(0.75) > 0.75);
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(EasingFunction::Linear.evaluate(-1.0), 0.0);
        assert_eq!(EasingFunction::Linear.evaluate(2.0), 1.0);
    }

    #[test]
    #[should_panic(expected = "Bezier x values")]
    fn test_invalid_bezier_panics() {
        let _ = EasingFunction::cubic_bezier(1.5, 0.0, 0.5, 1.0);
    }
}
