use std::env;
use std::time::Duration;

use crate::domain::artifact::DEFAULT_REPLAY_DELAY;
use crate::domain::method::SolveMethod;

pub const DEFAULT_SOLVER_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Runtime settings, read from the environment (and `.env` via dotenv).
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub solver_url: String,
    pub timeout: Duration,
    pub replay_delay: Duration,
    pub method: SolveMethod,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            solver_url: DEFAULT_SOLVER_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            replay_delay: DEFAULT_REPLAY_DELAY,
            method: SolveMethod::Auto,
        }
    }
}

impl Config {
    /// `SOLVER_URL`, `SOLVER_TIMEOUT_SECS`, `REPLAY_DELAY_MS`, `SOLVE_METHOD`;
    /// unset or unparsable values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Config::default();

        let solver_url = env::var("SOLVER_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(defaults.solver_url);

        let timeout = env::var("SOLVER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        let replay_delay = env::var("REPLAY_DELAY_MS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.replay_delay);

        let method = env::var("SOLVE_METHOD")
            .ok()
            .and_then(|s| SolveMethod::parse(&s))
            .unwrap_or(defaults.method);

        Config {
            solver_url,
            timeout,
            replay_delay,
            method,
        }
    }
}
