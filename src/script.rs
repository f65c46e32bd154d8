//! The inline reconciliation script.
//!
//! The generated code runs before first paint. It re-evaluates every hint's
//! probe, rewrites the hint cookies, and reloads the page once when a stored
//! value was stale. Two guards keep it from reloading forever: a throwaway
//! cookie proves cookies can be persisted at all, and a `sessionStorage`
//! counter stops reconciling once it exceeds `reload_threshold`.

use std::fmt::Write;

use serde::Deserialize;

use crate::cookie::DEFAULT_MAX_AGE;
use crate::registry::HintRegistry;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScriptOptions {
    /// Reconciliation is skipped once the session reload counter exceeds this.
    pub reload_threshold: u32,
    /// `sessionStorage` key holding the reload counter.
    pub attempts_key: String,
    /// Name of the short-lived cookie used to test cookie persistence.
    pub probe_cookie: String,
    /// `Max-Age` of written hint cookies, in seconds.
    pub max_age: u64,
    /// Hide the document before reloading to avoid a flash of stale content.
    pub hide_content_on_reload: bool,
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self {
            reload_threshold: 3,
            attempts_key: "clientHintReloadAttempts".to_string(),
            probe_cookie: "canSetCookies".to_string(),
            max_age: DEFAULT_MAX_AGE,
            hide_content_on_reload: true,
        }
    }
}

/// Script string literal, safe to inline inside a `<script>` element.
pub(crate) fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

pub(crate) fn render(registry: &HintRegistry, options: &ScriptOptions) -> String {
    let hints = registry
        .entries()
        .map(|(_, hint)| {
            format!(
                "\t\t{{ name: {}, actual: String({}), fallback: {} }}",
                js_string(hint.cookie_name()),
                hint.probe(),
                js_string(&hint.fallback_string()),
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");

    let probe_cookie = js_string(&format!("{}=1", options.probe_cookie));
    let clear_probe_cookie = js_string(&format!("{}=; Max-Age=-1; path=/", options.probe_cookie));
    let set_probe_cookie = js_string(&format!(
        "{}=1; Max-Age=60; path=/; SameSite=Lax",
        options.probe_cookie
    ));
    let attempts_key = js_string(&options.attempts_key);
    let cookie_attributes = js_string(&format!("; Max-Age={}; path=/; SameSite=Lax", options.max_age));
    let hide = if options.hide_content_on_reload {
        "\t\tdocument.documentElement.style.visibility = 'hidden';\n"
    } else {
        ""
    };

    format!(
        r#"
// Re-derive client hints in the browser, sync their cookies and reload once
// if the server rendered with stale values.
(function checkClientHints() {{
	if (!navigator.cookieEnabled) return;

	// make sure cookies can actually be stored, or every load would reload
	document.cookie = {set_probe_cookie};
	const canSetCookies = document.cookie.includes({probe_cookie});
	document.cookie = {clear_probe_cookie};
	if (!canSetCookies) return;

	const cookies = Object.create(null);
	for (const segment of document.cookie.split(';')) {{
		const entry = segment.trim();
		if (!entry) continue;
		const index = entry.indexOf('=');
		const key = index === -1 ? entry : entry.slice(0, index);
		if (!(key in cookies)) cookies[key] = index === -1 ? '' : entry.slice(index + 1);
	}}

	const attemptsKey = {attempts_key};
	let attempts = 0;
	try {{
		attempts = Number(sessionStorage.getItem(attemptsKey)) || 0;
	}} catch (error) {{}}
	if (attempts > {threshold}) {{
		console.warn('Client hints: reloaded ' + attempts + ' times without settling, skipping check');
		return;
	}}

	let cookieChanged = false;
	const hints = [
{hints}
	];
	for (const hint of hints) {{
		const stored = hint.name in cookies ? cookies[hint.name] : encodeURIComponent(hint.fallback);
		document.cookie = encodeURIComponent(hint.name) + '=' + encodeURIComponent(hint.actual) + {cookie_attributes};
		try {{
			if (decodeURIComponent(stored) !== hint.actual) cookieChanged = true;
		}} catch (error) {{
			console.warn('Client hints: could not decode cookie ' + hint.name, error);
			cookieChanged = true;
		}}
	}}

	if (cookieChanged) {{
		try {{
			sessionStorage.setItem(attemptsKey, String(attempts + 1));
		}} catch (error) {{}}
{hide}		window.location.reload();
	}} else {{
		try {{
			sessionStorage.removeItem(attemptsKey);
		}} catch (error) {{}}
	}}
}})();
"#,
        threshold = options.reload_threshold,
    )
}

/// HTML attribute escaping for the `nonce` of the wrapping `<script>` tag.
pub(crate) fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            c => out.push(c),
        }
    }
    out
}
