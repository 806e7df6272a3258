//! Animated progress (Layer 3)
//!
//! Per-value fill tweens and glow pulses, driven by an explicit clock.

#![warn(missing_docs)]

pub mod tween;
pub mod pulse;
pub mod controller;

pub use tween::{ease_out_cubic, Tween};
pub use pulse::{pulse_scale, PulseHandle};
pub use controller::{AnimatedValue, AnimationConfig, AnimationController, FillKind};
