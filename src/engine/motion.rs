//! Shared motion rules: Euler steps, easing, parallax and recycle predicates.

/// Duration of one nominal frame in seconds. Velocities are expressed per nominal frame.
pub const NOMINAL_STEP: f64 = 1.0 / 60.0;

/// Cap on a single frame's step factor so a stalled host does not teleport entities.
const MAX_STEP: f64 = 4.0;

/// Convert elapsed seconds into nominal-frame units.
pub fn step_factor(dt: f64) -> f64 {
    if !dt.is_finite() || dt <= 0.0 {
        return 0.0;
    }
    (dt / NOMINAL_STEP).min(MAX_STEP)
}

/// Exponential smoothing: `v += (target - v) * rate`.
#[inline]
pub fn ease(value: f64, target: f64, rate: f64) -> f64 {
    value + (target - value) * rate
}

/// Apparent size at depth `z` (0 = far, 1 = near).
#[inline]
pub fn parallax_size(base: f64, z: f64) -> f64 {
    base * (0.3 + z * 1.5)
}

/// Apparent speed at depth `z` (0 = far, 1 = near).
#[inline]
pub fn parallax_speed(base: f64, z: f64) -> f64 {
    base * (0.6 + z * 0.6)
}

/// True once the point is more than `margin` px outside the view.
#[inline]
pub fn outside(x: f64, y: f64, width: f64, height: f64, margin: f64) -> bool {
    x < -margin || x > width + margin || y < -margin || y > height + margin
}

/// Fade in over the first `window` fraction of a life and out over the last.
pub fn life_fade(life: f64, max_life: f64, window: f64) -> f64 {
    if max_life <= 0.0 {
        return 0.0;
    }
    let remaining = (life / max_life).clamp(0.0, 1.0);
    let age = 1.0 - remaining;
    let window = window.clamp(1e-6, 0.5);
    (age / window).min(remaining / window).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_parallax_near_and_far() {
        assert!(approx(parallax_size(10.0, 1.0), 18.0));
        assert!(approx(parallax_speed(2.0, 1.0), 2.4));
        assert!(approx(parallax_size(10.0, 0.1), 4.5));
        assert!(approx(parallax_speed(2.0, 0.1), 1.32));
    }

    #[test]
    fn test_ease_converges() {
        let mut v = 0.0;
        for _ in 0..200 {
            v = ease(v, 1.0, 0.1);
        }
        assert!(approx(v, 1.0) || (1.0 - v) < 1e-8);
    }

    #[test]
    fn test_step_factor_guards() {
        assert!(approx(step_factor(NOMINAL_STEP), 1.0));
        assert_eq!(step_factor(-1.0), 0.0);
        assert_eq!(step_factor(f64::NAN), 0.0);
        assert_eq!(step_factor(10.0), 4.0);
    }

    #[test]
    fn test_life_fade_window() {
        assert_eq!(life_fade(100.0, 100.0, 0.2), 0.0);
        assert!(approx(life_fade(50.0, 100.0, 0.2), 1.0));
        assert_eq!(life_fade(0.0, 100.0, 0.2), 0.0);
        assert_eq!(life_fade(5.0, 0.0, 0.2), 0.0);
    }

    #[test]
    fn test_outside_margin() {
        assert!(!outside(-5.0, 10.0, 100.0, 100.0, 10.0));
        assert!(outside(-11.0, 10.0, 100.0, 100.0, 10.0));
        assert!(outside(50.0, 111.0, 100.0, 100.0, 10.0));
    }
}
