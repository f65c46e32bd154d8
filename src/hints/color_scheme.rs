use crate::types::{ClientHint, HintValue};

pub const COOKIE_NAME: &str = "CH-prefers-color-scheme";
pub const PROBE: &str =
    "window.matchMedia('(prefers-color-scheme: dark)').matches ? 'dark' : 'light'";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    /// Anything other than `dark` is treated as light.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "dark" => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

impl HintValue for ColorScheme {
    fn to_hint_string(&self) -> String {
        self.as_str().to_string()
    }
}

pub fn hint() -> ClientHint<ColorScheme> {
    ClientHint::with_transform(COOKIE_NAME, PROBE, ColorScheme::Light, ColorScheme::from_str_lossy)
}
