//! Engine selection.
//!
//! Call sites never name a concrete engine; they ask for one here. The
//! process-wide choice is made once from [`EngineConfig::from_env`] and
//! cached.

use alloc::sync::Arc;
use std::sync::OnceLock;

use crate::config::{BackendPreference, EngineConfig, EngineMode};
use crate::engine::{EciesEngine, LegacySoftwareEngine, SoftwareEngine};

#[cfg(feature = "native")]
use crate::engine::{LegacyNativeEngine, NativeEngine};

static ENGINE: OnceLock<Arc<dyn EciesEngine>> = OnceLock::new();

/// Whether the libsecp256k1 backend is compiled into this build.
pub const fn native_available() -> bool {
    cfg!(feature = "native")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Native,
    Software,
}

fn resolve_backend(preference: BackendPreference) -> Backend {
    match preference {
        BackendPreference::Software => Backend::Software,
        BackendPreference::Auto | BackendPreference::Native if native_available() => Backend::Native,
        BackendPreference::Auto => Backend::Software,
        BackendPreference::Native => {
            tracing::warn!("native secp256k1 backend requested but not compiled in; using software backend");
            Backend::Software
        }
    }
}

/// Build the engine described by `config`.
pub fn select_engine(config: &EngineConfig) -> Arc<dyn EciesEngine> {
    match (config.mode, resolve_backend(config.backend)) {
        #[cfg(feature = "native")]
        (EngineMode::Modern, Backend::Native) => Arc::new(NativeEngine::new()),
        #[cfg(feature = "native")]
        (EngineMode::Legacy, Backend::Native) => Arc::new(LegacyNativeEngine::new()),
        (EngineMode::Legacy, _) => Arc::new(LegacySoftwareEngine::new()),
        (EngineMode::Modern, _) => Arc::new(SoftwareEngine::new()),
    }
}

/// The process-wide engine, chosen on first use.
pub fn get_engine() -> Arc<dyn EciesEngine> {
    ENGINE
        .get_or_init(|| {
            let config = EngineConfig::from_env();
            let engine = select_engine(&config);
            tracing::info!(
                mode = %config.mode,
                requested_backend = %config.backend,
                engine = %engine.name(),
                "selected ECIES engine"
            );
            engine
        })
        .clone()
}
