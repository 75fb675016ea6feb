/// Easing curves for scripted camera motion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant speed throughout.
    Linear,
    /// Start fast, decelerate (quadratic).
    EaseOut,
    /// Start fast, decelerate hard: `1 - (1 - t)^3`.
    #[default]
    EaseOutCubic,
    /// Start slow, speed up, then slow down.
    EaseInOut,
}

impl Easing {
    /// Map linear progress in `0.0..=1.0` onto the curve. Input is clamped.
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
        }
    }
}
