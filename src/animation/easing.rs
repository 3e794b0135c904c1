//! Easing curves for tween interpolation.
//!
//! Names follow the conventions used by page animation tooling
//! (`"power3.out"`, `"elastic.out(1, 0.5)"`), so choreography written for
//! the web reads the same here. All curves are designed for <100ns
//! evaluation time.

use std::f32::consts::{PI, TAU};
use std::str::FromStr;

use crate::error::VitrineError;

/// Easing function variants for animation curves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Ease {
    /// Linear interpolation (`"none"`, `"linear"`, `"power0"`).
    Linear,
    /// `powerN.in`: t^(N+1).
    PowerIn(u8),
    /// `powerN.out`: 1 - (1-t)^(N+1).
    PowerOut(u8),
    /// `powerN.inOut`: symmetric in/out.
    PowerInOut(u8),
    /// `sine.inOut`.
    SineInOut,
    /// `back.out(overshoot)`.
    BackOut {
        /// Overshoot amount (1.70158 by default).
        overshoot: f32,
    },
    /// `elastic.out(amplitude, period)`.
    ElasticOut {
        /// Peak amplitude, at least 1.
        amplitude: f32,
        /// Oscillation period.
        period: f32,
    },
    /// Cubic Hermite interpolation with configurable control points.
    /// Formula: c1·3t(1-t)² + c2·3(1-t)t² + t³
    CubicHermite {
        /// First control value.
        c1: f32,
        /// Second control value.
        c2: f32,
    },
}

impl Ease {
    /// Default tween ease, `power1.out`.
    pub const DEFAULT: Ease = Ease::PowerOut(1);

    /// Natural ease-out used for camera transitions.
    pub const HERMITE: Ease = Ease::CubicHermite { c1: 0.33, c2: 1.0 };

    /// Evaluate the easing function at time t.
    ///
    /// Input t is clamped to [0.0, 1.0]. Output starts at 0 and ends at 1;
    /// `back` and `elastic` overshoot in between.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match *self {
            Ease::Linear => t,
            Ease::PowerIn(n) => t.powi(i32::from(n) + 1),
            Ease::PowerOut(n) => 1.0 - (1.0 - t).powi(i32::from(n) + 1),
            Ease::PowerInOut(n) => {
                let k = i32::from(n) + 1;
                if t < 0.5 {
                    (2.0 * t).powi(k) / 2.0
                } else {
                    1.0 - (2.0 * (1.0 - t)).powi(k) / 2.0
                }
            }
            Ease::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Ease::BackOut { overshoot } => {
                let p = t - 1.0;
                p * p * ((overshoot + 1.0) * p + overshoot) + 1.0
            }
            Ease::ElasticOut { amplitude, period } => {
                if t >= 1.0 {
                    return 1.0;
                }
                let a = amplitude.max(1.0);
                let p = period / amplitude.min(1.0);
                let shift = p / TAU * (1.0 / a).asin();
                a * 2f32.powf(-10.0 * t) * ((t - shift) * TAU / p).sin() + 1.0
            }
            Ease::CubicHermite { c1, c2 } => {
                let omt = 1.0 - t;
                c1 * 3.0 * t * omt * omt + c2 * 3.0 * omt * t * t + t * t * t
            }
        }
    }
}

impl Default for Ease {
    #[inline]
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Parse `name[.in|.out|.inOut][(arg, arg)]`.
impl FromStr for Ease {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || VitrineError::InvalidTimeline(format!("unknown ease '{s}'"));
        let s = s.trim();
        let (head, args) = match s.split_once('(') {
            Some((head, rest)) => {
                let inner = rest.strip_suffix(')').ok_or_else(invalid)?;
                let args = inner
                    .split(',')
                    .map(|a| a.trim().parse::<f32>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| invalid())?;
                (head.trim(), args)
            }
            None => (s, Vec::new()),
        };
        let (family, kind) = head.split_once('.').unwrap_or((head, "out"));

        let power = match family {
            "power1" | "quad" => Some(1),
            "power2" | "cubic" => Some(2),
            "power3" | "quart" => Some(3),
            "power4" | "quint" | "strong" => Some(4),
            _ => None,
        };

        let ease = match (family, kind, power) {
            ("none" | "linear" | "power0", _, _) => Ease::Linear,
            (_, "in", Some(n)) => Ease::PowerIn(n),
            (_, "out", Some(n)) => Ease::PowerOut(n),
            (_, "inOut", Some(n)) => Ease::PowerInOut(n),
            ("sine", "inOut", _) => Ease::SineInOut,
            ("back", "out", _) => Ease::BackOut {
                overshoot: args.first().copied().unwrap_or(1.70158),
            },
            ("elastic", "out", _) => Ease::ElasticOut {
                amplitude: args.first().copied().unwrap_or(1.0),
                period: args.get(1).copied().unwrap_or(0.3),
            },
            _ => return Err(invalid()),
        };
        Ok(ease)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all() -> Vec<Ease> {
        vec![
            Ease::Linear,
            Ease::PowerIn(2),
            Ease::PowerOut(3),
            Ease::PowerInOut(1),
            Ease::SineInOut,
            Ease::BackOut { overshoot: 1.70158 },
            Ease::ElasticOut { amplitude: 1.0, period: 0.5 },
            Ease::HERMITE,
        ]
    }

    #[test]
    fn test_endpoints() {
        for ease in all() {
            assert!(ease.evaluate(0.0).abs() < 1e-5, "{ease:?} at 0");
            assert!((ease.evaluate(1.0) - 1.0).abs() < 1e-5, "{ease:?} at 1");
        }
    }

    #[test]
    fn test_input_clamping() {
        for ease in all() {
            assert!(ease.evaluate(-0.5).abs() < 1e-5);
            assert!((ease.evaluate(1.5) - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_power_shapes() {
        assert_eq!(Ease::PowerIn(1).evaluate(0.5), 0.25);
        assert_eq!(Ease::PowerOut(1).evaluate(0.5), 0.75);
        assert_eq!(Ease::PowerInOut(2).evaluate(0.5), 0.5);
        // power3.out front-loads progress
        assert!(Ease::PowerOut(3).evaluate(0.25) > 0.6);
    }

    #[test]
    fn test_cubic_hermite_ease_out_shape() {
        let result_at_quarter = Ease::HERMITE.evaluate(0.25);
        assert!(
            result_at_quarter > 0.25,
            "Ease-out should have value > 0.25 at t=0.25, got {result_at_quarter}"
        );
    }

    #[test]
    fn test_elastic_and_back_overshoot() {
        let elastic = Ease::ElasticOut { amplitude: 1.0, period: 0.5 };
        let peak = (1..100)
            .map(|i| elastic.evaluate(i as f32 / 100.0))
            .fold(f32::MIN, f32::max);
        assert!(peak > 1.0);
        let back = Ease::BackOut { overshoot: 1.70158 };
        assert!(back.evaluate(0.7) > 1.0);
    }

    #[test]
    fn test_parse() {
        assert_eq!("none".parse::<Ease>().unwrap(), Ease::Linear);
        assert_eq!("power3.out".parse::<Ease>().unwrap(), Ease::PowerOut(3));
        assert_eq!("power1.inOut".parse::<Ease>().unwrap(), Ease::PowerInOut(1));
        assert_eq!("power4.in".parse::<Ease>().unwrap(), Ease::PowerIn(4));
        assert_eq!("power2".parse::<Ease>().unwrap(), Ease::PowerOut(2));
        assert_eq!(
            "elastic.out(1, 0.5)".parse::<Ease>().unwrap(),
            Ease::ElasticOut { amplitude: 1.0, period: 0.5 }
        );
        assert!("wobble.out".parse::<Ease>().is_err());
        assert!("power2.sideways".parse::<Ease>().is_err());
        assert!("elastic.out(1".parse::<Ease>().is_err());
    }
}
