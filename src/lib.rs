mod config;
mod cookie;
mod error;
pub mod hints;
mod reconcile;
mod registry;
mod resolver;
mod script;
mod types;

pub use config::{HintEntry, HintsConfig};
pub use cookie::{find_cookie, parse_cookies, set_cookie_line, DEFAULT_MAX_AGE};
pub use error::{Error, Result};
pub use reconcile::{reconcile, ClientEnvironment, CounterState, ReconcileOutcome, ReloadCounter};
pub use registry::{HintInfo, HintRegistry};
pub use resolver::HintResolver;
pub use script::ScriptOptions;
pub use types::*;
