use crate::cookie::{decode_value, find_cookie};
use crate::error::Result;
use crate::registry::{HintRegistry, RegisteredHint};
use crate::script::{self, ScriptOptions};
use crate::types::{CookieSource, ResolvedHints};

/// Resolves hint values from cookies and generates the client script that
/// keeps those cookies current. Both operations read the same registry.
///
/// The resolver holds no per-request state and can be shared freely.
#[derive(Debug)]
pub struct HintResolver {
    registry: HintRegistry,
    options: ScriptOptions,
}

impl HintResolver {
    pub fn new(registry: HintRegistry) -> Self {
        Self::with_options(registry, ScriptOptions::default())
    }

    pub fn with_options(registry: HintRegistry, options: ScriptOptions) -> Self {
        Self { registry, options }
    }

    pub fn registry(&self) -> &HintRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ScriptOptions {
        &self.options
    }

    /// Snapshot of every hint's value for one request.
    ///
    /// Missing, empty or undecodable cookies never fail: the hint falls back
    /// (through its transform, if it has one).
    pub fn resolve<'a>(&self, source: impl Into<Option<CookieSource<'a>>>) -> ResolvedHints {
        let source = source.into().unwrap_or(CookieSource::Empty);
        let header = source.cookie_header();

        let mut resolved = ResolvedHints::with_capacity(self.registry.len());
        for (name, hint) in self.registry.entries() {
            let raw = decoded_cookie(header, name, hint);
            resolved.insert(name, hint.resolve(raw));
        }
        resolved
    }

    /// Decoded cookie value of a single hint, looked up by logical name.
    ///
    /// `Ok(None)` when the cookie is absent, empty or undecodable.
    pub fn cookie_value(&self, cookie_header: &str, name: &str) -> Result<Option<String>> {
        let hint = self.registry.get(name)?;
        Ok(decoded_cookie(cookie_header, name, hint))
    }

    /// Inline script that re-derives every hint in the browser, rewrites the
    /// hint cookies and reloads the page when the stored values were stale.
    pub fn emit_script(&self) -> String {
        script::render(&self.registry, &self.options)
    }

    /// [`emit_script`](Self::emit_script) wrapped in a `<script>` element,
    /// with a CSP nonce when given.
    pub fn emit_script_tag(&self, nonce: Option<&str>) -> String {
        match nonce {
            Some(nonce) => format!(
                "<script nonce=\"{}\">{}</script>",
                script::escape_attribute(nonce),
                self.emit_script()
            ),
            None => format!("<script>{}</script>", self.emit_script()),
        }
    }
}

impl From<HintRegistry> for HintResolver {
    fn from(registry: HintRegistry) -> Self {
        Self::new(registry)
    }
}

fn decoded_cookie(header: &str, name: &str, hint: &dyn RegisteredHint) -> Option<String> {
    let raw = find_cookie(header, hint.cookie_name()).filter(|raw| !raw.is_empty())?;
    match decode_value(raw) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            tracing::warn!(
                hint = name,
                cookie = hint.cookie_name(),
                %error,
                "undecodable client hint cookie, using fallback"
            );
            None
        }
    }
}
