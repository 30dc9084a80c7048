//! Engine selection configuration.
//!
//! Read from the environment once at startup:
//!
//!   WALLET_ECIES_MODE     modern (default, alias "custom") | legacy
//!   WALLET_ECIES_BACKEND  auto (default) | native | software
//!
//! Unknown values fall back to the default with a warning.

use core::fmt;
use core::str::FromStr;

pub const MODE_ENV: &str = "WALLET_ECIES_MODE";
pub const BACKEND_ENV: &str = "WALLET_ECIES_BACKEND";

/// Which ECIES variant to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineMode {
    /// Fixed-width shared secret.
    #[default]
    Modern,
    /// Minimal-width shared secret, for data written by the older library.
    Legacy,
}

impl fmt::Display for EngineMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Modern => write!(f, "modern"),
            Self::Legacy => write!(f, "legacy"),
        }
    }
}

/// Which curve backend to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendPreference {
    /// Native when compiled in, software otherwise.
    #[default]
    Auto,
    Native,
    Software,
}

impl fmt::Display for BackendPreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Native => write!(f, "native"),
            Self::Software => write!(f, "software"),
        }
    }
}

/// Unrecognized configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    pub variable: &'static str,
    pub value: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized value for {}: {:?}", self.variable, self.value)
    }
}

impl std::error::Error for ConfigError {}

impl FromStr for EngineMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "modern" | "custom" => Ok(Self::Modern),
            "legacy" => Ok(Self::Legacy),
            _ => Err(ConfigError {
                variable: MODE_ENV,
                value: s.into(),
            }),
        }
    }
}

impl FromStr for BackendPreference {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" | "" => Ok(Self::Auto),
            "native" => Ok(Self::Native),
            "software" | "pure" => Ok(Self::Software),
            _ => Err(ConfigError {
                variable: BACKEND_ENV,
                value: s.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineConfig {
    pub mode: EngineMode,
    pub backend: BackendPreference,
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: EngineMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_backend(mut self, backend: BackendPreference) -> Self {
        self.backend = backend;
        self
    }

    /// Read `WALLET_ECIES_MODE` / `WALLET_ECIES_BACKEND`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`EngineConfig::from_env`] with an injectable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            mode: parse_or_default(lookup(MODE_ENV)),
            backend: parse_or_default(lookup(BACKEND_ENV)),
        }
    }
}

fn parse_or_default<T>(raw: Option<String>) -> T
where
    T: FromStr<Err = ConfigError> + Default + fmt::Display,
{
    match raw.map(|v| v.parse::<T>()) {
        None => T::default(),
        Some(Ok(v)) => v,
        Some(Err(e)) => {
            let fallback = T::default();
            tracing::warn!(variable = e.variable, value = %e.value, fallback = %fallback, "ignoring unrecognized ECIES setting");
            fallback
        }
    }
}
