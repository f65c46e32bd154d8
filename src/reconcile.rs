//! The client-side reconciliation protocol, run in-process.
//!
//! [`reconcile`] performs the same steps as the script from
//! [`HintResolver::emit_script`] against a [`ClientEnvironment`], so hosts
//! without a script engine (embedded webviews, test harnesses) can keep hint
//! cookies in sync too. The reload guard is a plain [`ReloadCounter`].

use crate::cookie::{self, decode_value, encode_value, parse_cookies};
use crate::resolver::HintResolver;
use crate::types::ProbeExpression;

/// What a client context offers the protocol.
pub trait ClientEnvironment {
    /// Whether the user agent claims cookies are enabled at all.
    fn cookies_enabled(&self) -> bool {
        true
    }
    /// Current `document.cookie`-style string.
    fn cookie_string(&self) -> String;
    /// Apply a `document.cookie = ...` style assignment.
    fn set_cookie(&mut self, assignment: &str);
    /// Evaluate a hint probe, returning its stringified result.
    fn evaluate(&mut self, probe: &ProbeExpression) -> String;
    fn session_get(&self, key: &str) -> Option<String>;
    fn session_set(&mut self, key: &str, value: &str);
    fn session_remove(&mut self, key: &str);
    fn hide_content(&mut self) {}
    fn reload(&mut self);
}

/// Session-scoped count of consecutive reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadCounter {
    attempts: u32,
    threshold: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterState {
    /// Reconciliation may run.
    Armed,
    /// Too many reloads this session; reconciliation is skipped.
    Tripped,
}

impl ReloadCounter {
    pub fn new(attempts: u32, threshold: u32) -> Self {
        Self {
            attempts,
            threshold,
        }
    }

    /// Read the counter the way the script does: anything unparsable is 0.
    pub fn load(stored: Option<&str>, threshold: u32) -> Self {
        let attempts = stored.and_then(|s| s.trim().parse().ok()).unwrap_or(0);
        Self::new(attempts, threshold)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn state(&self) -> CounterState {
        if self.attempts > self.threshold {
            CounterState::Tripped
        } else {
            CounterState::Armed
        }
    }

    /// A reload is about to happen.
    pub fn record_reload(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// All hints matched: back to steady state.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Cookies cannot be persisted; nothing was touched.
    CookiesUnavailable,
    /// The reload counter had tripped; nothing was touched.
    CircuitBroken { attempts: u32 },
    /// Every stored hint matched its probe.
    Steady,
    /// At least one hint was stale; cookies were rewritten and a reload requested.
    Reloaded { stale: Vec<String>, attempts: u32 },
}

pub fn reconcile(resolver: &HintResolver, env: &mut impl ClientEnvironment) -> ReconcileOutcome {
    let options = resolver.options();

    if !env.cookies_enabled() || !can_set_cookies(env, &options.probe_cookie) {
        tracing::debug!("cookies cannot be stored, skipping client hint check");
        return ReconcileOutcome::CookiesUnavailable;
    }

    let snapshot = env.cookie_string();
    let cookies = parse_cookies(&snapshot);

    let mut counter = ReloadCounter::load(
        env.session_get(&options.attempts_key).as_deref(),
        options.reload_threshold,
    );
    if counter.state() == CounterState::Tripped {
        tracing::debug!(
            attempts = counter.attempts(),
            "client hint reload limit reached, skipping check"
        );
        return ReconcileOutcome::CircuitBroken {
            attempts: counter.attempts(),
        };
    }

    let mut stale = Vec::new();
    for (name, hint) in resolver.registry().entries() {
        let actual = env.evaluate(hint.probe());
        let stored = match cookies.get(hint.cookie_name()) {
            Some(value) => value.to_string(),
            None => encode_value(&hint.fallback_string()),
        };
        env.set_cookie(&format!(
            "{}={}; Max-Age={}; path=/; SameSite=Lax",
            encode_value(hint.cookie_name()),
            encode_value(&actual),
            options.max_age
        ));
        let matches = match decode_value(&stored) {
            Ok(decoded) => decoded == actual,
            Err(error) => {
                tracing::warn!(hint = name, %error, "could not decode stored client hint");
                false
            }
        };
        if !matches {
            stale.push(name.to_string());
        }
    }

    if stale.is_empty() {
        counter.reset();
        env.session_remove(&options.attempts_key);
        tracing::debug!("client hints up to date");
        return ReconcileOutcome::Steady;
    }

    counter.record_reload();
    env.session_set(&options.attempts_key, &counter.attempts().to_string());
    if options.hide_content_on_reload {
        env.hide_content();
    }
    tracing::debug!(?stale, attempts = counter.attempts(), "client hints changed, reloading");
    env.reload();
    ReconcileOutcome::Reloaded {
        stale,
        attempts: counter.attempts(),
    }
}

fn can_set_cookies(env: &mut impl ClientEnvironment, probe_cookie: &str) -> bool {
    env.set_cookie(&format!("{probe_cookie}=1; Max-Age=60; path=/; SameSite=Lax"));
    let stored = cookie::find_cookie(&env.cookie_string(), probe_cookie) == Some("1");
    env.set_cookie(&format!("{probe_cookie}=; Max-Age=-1; path=/"));
    stored
}
