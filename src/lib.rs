//! A bridge from Rust callers into one native shared library.
//!
//! The library is loaded by logical name (`raw` → `libraw.so`), the
//! `hello` export is resolved once, and each call copies the native string
//! into a caller-owned `String` before handing the buffer back to the
//! library's release export.

pub mod bridge;
pub mod config;
pub mod error;
pub mod load;
pub mod locate;
pub mod native_string;
pub mod process_cache;
pub mod signature;
pub mod subtitle;
#[cfg(test)]
mod test_support;

pub use bridge::{BridgeState, NativeBridge};
pub use config::BridgeConfig;
pub use error::BridgeError;
pub use load::{Export, Library};
pub use subtitle::subtitle;

use log::debug;
use std::sync::OnceLock;

/// The process-global bridge. Set at most once; every caller observes the
/// same loaded bridge or the same load failure.
static BRIDGE: OnceLock<Result<NativeBridge, BridgeError>> = OnceLock::new();

fn global(
    init: impl FnOnce() -> Result<BridgeConfig, BridgeError>,
) -> Result<&'static NativeBridge, BridgeError> {
    BRIDGE
        .get_or_init(|| {
            let config = init()?;
            debug!("initializing global bridge for {}", config.library);
            NativeBridge::load(config)
        })
        .as_ref()
        .map_err(Clone::clone)
}

fn env_config(library: Option<&str>) -> Result<BridgeConfig, BridgeError> {
    let mut config = BridgeConfig::from_env().map_err(|e| {
        BridgeError::library_load(
            library.unwrap_or("raw"),
            format!("invalid configuration: {:#}", e),
        )
    })?;

    if let Some(name) = library {
        config.library = name.to_string();
    }

    Ok(config)
}

fn ensure_bound(bridge: &NativeBridge, name: &str) -> Result<(), BridgeError> {
    let bound = &bridge.config().library;
    if bound != name {
        return Err(BridgeError::library_load(
            name,
            format!("the global bridge is already bound to {}", bound),
        ));
    }

    Ok(())
}

/// Binds the process-global bridge to an explicit configuration and loads
/// its library. Repeating the call with an identical configuration is a
/// no-op; any other configuration is rejected once the bridge is bound.
pub fn init(config: BridgeConfig) -> Result<(), BridgeError> {
    let requested = config.clone();
    let bridge = global(|| Ok(config))?;
    ensure_bound(bridge, &requested.library)?;

    if bridge.config() != &requested {
        return Err(BridgeError::library_load(
            &requested.library,
            "the global bridge is already bound to a different configuration",
        ));
    }

    Ok(())
}

/// Loads the library `name` into the process-global bridge, using the
/// search paths from the environment. Repeating the call for the same
/// name is a no-op; a missing or rejected library is reported here, before
/// anything tries to call into it.
pub fn load_library(name: &str) -> Result<(), BridgeError> {
    let bridge = global(|| env_config(Some(name)))?;
    ensure_bound(bridge, name)
}

/// Calls `hello` through the process-global bridge, loading the library
/// from the environment configuration first if nobody did.
pub fn hello() -> Result<String, BridgeError> {
    global(|| env_config(None))?.hello()
}

/// Where the process-global bridge is in its load → resolve sequence.
/// A failed load stays `Unloaded`.
pub fn state() -> BridgeState {
    match BRIDGE.get() {
        Some(Ok(bridge)) => bridge.state(),
        _ => BridgeState::Unloaded,
    }
}
