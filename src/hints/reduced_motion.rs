use crate::types::{ClientHint, HintValue};

pub const COOKIE_NAME: &str = "CH-reduced-motion";
pub const PROBE: &str =
    "window.matchMedia('(prefers-reduced-motion: reduce)').matches ? 'reduce' : 'no-preference'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReducedMotion {
    #[default]
    NoPreference,
    Reduce,
}

impl ReducedMotion {
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "reduce" => Self::Reduce,
            _ => Self::NoPreference,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPreference => "no-preference",
            Self::Reduce => "reduce",
        }
    }
}

impl HintValue for ReducedMotion {
    fn to_hint_string(&self) -> String {
        self.as_str().to_string()
    }
}

pub fn hint() -> ClientHint<ReducedMotion> {
    ClientHint::with_transform(
        COOKIE_NAME,
        PROBE,
        ReducedMotion::NoPreference,
        ReducedMotion::from_str_lossy,
    )
}
