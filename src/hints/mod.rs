//! Bundled hint definitions.

pub mod color_scheme;
pub mod reduced_motion;
pub mod time_zone;

pub use color_scheme::ColorScheme;
pub use reduced_motion::ReducedMotion;

use crate::error::Result;
use crate::registry::HintRegistry;

/// Registry with the three bundled hints under their conventional names:
/// `colorScheme`, `reducedMotion` and `timeZone`.
pub fn defaults() -> Result<HintRegistry> {
    HintRegistry::new()
        .with("colorScheme", color_scheme::hint())?
        .with("reducedMotion", reduced_motion::hint())?
        .with("timeZone", time_zone::hint())
}
