//! Easing curves for scroll animation
//!
//! Pure maps from normalized time to normalized progress. The default curve
//! is a symmetric quadratic ease-in-out.

/// Easing curve selector
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    /// Symmetric quadratic ease-in-out (the engine default)
    #[default]
    Default,
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
    InQuart,
    OutQuart,
    InOutQuart,
    InQuint,
    OutQuint,
    InOutQuint,
}

impl Easing {
    /// Resolve a configuration name to a curve. Unknown names fall back to
    /// [`Easing::Default`], matching the engine's silent-recovery policy.
    pub fn from_name(name: &str) -> Easing {
        match name {
            "linear" => Easing::Linear,
            "easeInQuad" => Easing::InQuad,
            "easeOutQuad" => Easing::OutQuad,
            "easeInOutQuad" => Easing::InOutQuad,
            "easeInCubic" => Easing::InCubic,
            "easeOutCubic" => Easing::OutCubic,
            "easeInOutCubic" => Easing::InOutCubic,
            "easeInQuart" => Easing::InQuart,
            "easeOutQuart" => Easing::OutQuart,
            "easeInOutQuart" => Easing::InOutQuart,
            "easeInQuint" => Easing::InQuint,
            "easeOutQuint" => Easing::OutQuint,
            "easeInOutQuint" => Easing::InOutQuint,
            _ => Easing::Default,
        }
    }

    /// Evaluate the curve at `x ∈ [0, 1]`
    pub fn eval(self, x: f64) -> f64 {
        match self {
            Easing::Default => {
                if x < 0.5 {
                    (x * 2.0).powi(2) / 2.0
                } else {
                    1.0 - ((1.0 - x) * 2.0).powi(2) / 2.0
                }
            }
            Easing::Linear => x,
            Easing::InQuad => x * x,
            Easing::OutQuad => x * (2.0 - x),
            Easing::InOutQuad => {
                if x < 0.5 {
                    2.0 * x * x
                } else {
                    -1.0 + (4.0 - 2.0 * x) * x
                }
            }
            Easing::InCubic => x * x * x,
            Easing::OutCubic => {
                let x = x - 1.0;
                x * x * x + 1.0
            }
            Easing::InOutCubic => {
                if x < 0.5 {
                    4.0 * x * x * x
                } else {
                    (x - 1.0) * (2.0 * x - 2.0) * (2.0 * x - 2.0) + 1.0
                }
            }
            Easing::InQuart => x * x * x * x,
            Easing::OutQuart => {
                let x = x - 1.0;
                1.0 - x * x * x * x
            }
            Easing::InOutQuart => {
                if x < 0.5 {
                    8.0 * x * x * x * x
                } else {
                    let x = x - 1.0;
                    1.0 - 8.0 * x * x * x * x
                }
            }
            Easing::InQuint => x * x * x * x * x,
            Easing::OutQuint => {
                let x = x - 1.0;
                1.0 + x * x * x * x * x
            }
            Easing::InOutQuint => {
                if x < 0.5 {
                    16.0 * x * x * x * x * x
                } else {
                    let x = x - 1.0;
                    1.0 + 16.0 * x * x * x * x * x
                }
            }
        }
    }
}
