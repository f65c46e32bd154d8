use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use crate::cookie;

/// A snippet of client-side script that evaluates to the hint's live value
/// in the browser (e.g. `Intl.DateTimeFormat().resolvedOptions().timeZone`).
///
/// The server never parses or validates it; it is pasted verbatim into the
/// reconciliation script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeExpression(Cow<'static, str>);

impl ProbeExpression {
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProbeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for ProbeExpression {
    fn from(code: &'static str) -> Self {
        Self::new(code)
    }
}

impl From<String> for ProbeExpression {
    fn from(code: String) -> Self {
        Self::new(code)
    }
}

#[doc(hidden)]
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A value a hint can resolve to.
///
/// `to_hint_string` is the form written into the cookie. For a transformed
/// hint, the string form of its fallback is what the transform receives when
/// no usable cookie exists, so the pair must round-trip.
pub trait HintValue: AsAny + fmt::Debug + Send + Sync + 'static {
    fn to_hint_string(&self) -> String;
}

impl HintValue for String {
    fn to_hint_string(&self) -> String {
        self.clone()
    }
}

impl HintValue for &'static str {
    fn to_hint_string(&self) -> String {
        (*self).to_string()
    }
}

pub(crate) enum Transform<V> {
    /// The decoded cookie text is the value.
    Verbatim(fn(String) -> V),
    /// Normalizes any decoded text, or the fallback's string form, into `V`.
    Custom(Arc<dyn Fn(&str) -> V + Send + Sync>),
}

impl<V> Clone for Transform<V> {
    fn clone(&self) -> Self {
        match self {
            Self::Verbatim(f) => Self::Verbatim(*f),
            Self::Custom(f) => Self::Custom(Arc::clone(f)),
        }
    }
}

/// Definition of one cookie-backed client hint.
pub struct ClientHint<V = String> {
    pub(crate) cookie_name: Cow<'static, str>,
    pub(crate) probe: ProbeExpression,
    pub(crate) fallback: V,
    pub(crate) transform: Transform<V>,
}

impl ClientHint<String> {
    /// A string-valued hint: the decoded cookie text is used as-is.
    pub fn new(
        cookie_name: impl Into<Cow<'static, str>>,
        probe: impl Into<ProbeExpression>,
        fallback: impl Into<String>,
    ) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            probe: probe.into(),
            fallback: fallback.into(),
            transform: Transform::Verbatim(std::convert::identity),
        }
    }
}

impl<V: HintValue + Clone> ClientHint<V> {
    /// A hint whose cookie text is normalized by `transform`.
    ///
    /// The transform is always called: with the decoded cookie value when
    /// there is one, otherwise with `fallback.to_hint_string()`. It should be
    /// total, mapping unexpected input to a canonical default.
    pub fn with_transform(
        cookie_name: impl Into<Cow<'static, str>>,
        probe: impl Into<ProbeExpression>,
        fallback: V,
        transform: impl Fn(&str) -> V + Send + Sync + 'static,
    ) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            probe: probe.into(),
            fallback,
            transform: Transform::Custom(Arc::new(transform)),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn probe(&self) -> &ProbeExpression {
        &self.probe
    }

    pub fn fallback(&self) -> &V {
        &self.fallback
    }

    pub fn has_transform(&self) -> bool {
        matches!(self.transform, Transform::Custom(_))
    }

    /// Turn the decoded cookie text (if any) into the hint's value.
    pub(crate) fn value_from(&self, raw: Option<String>) -> V {
        match &self.transform {
            Transform::Custom(transform) => match raw {
                Some(raw) => transform(&raw),
                None => transform(&self.fallback.to_hint_string()),
            },
            Transform::Verbatim(from_raw) => match raw {
                Some(raw) => from_raw(raw),
                None => self.fallback.clone(),
            },
        }
    }

    /// `Set-Cookie` header value persisting `value` for this hint, in the same
    /// shape the reconciliation script writes.
    pub fn set_cookie(&self, value: &V) -> String {
        cookie::set_cookie_line(
            &self.cookie_name,
            &value.to_hint_string(),
            cookie::DEFAULT_MAX_AGE,
        )
    }
}

impl<V: Clone> Clone for ClientHint<V> {
    fn clone(&self) -> Self {
        Self {
            cookie_name: self.cookie_name.clone(),
            probe: self.probe.clone(),
            fallback: self.fallback.clone(),
            transform: self.transform.clone(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for ClientHint<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHint")
            .field("cookie_name", &self.cookie_name)
            .field("probe", &self.probe)
            .field("fallback", &self.fallback)
            .field(
                "transform",
                &match self.transform {
                    Transform::Verbatim(_) => "verbatim",
                    Transform::Custom(_) => "custom",
                },
            )
            .finish()
    }
}
