use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::load::{Export, Library};
use crate::native_string::NativeString;
use crate::process_cache::cached_load;
use crate::signature::Signature;
use log::debug;
use std::ffi::c_char;
use std::sync::{Arc, OnceLock};

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

/// Observable progress of a bridge through load → resolve → call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Unloaded,
    Loaded,
    Resolved,
}

/// The string-returning export and the export that frees its result.
struct HelloExports {
    hello: Export<(), *mut c_char>,
    release: Export<(*mut c_char,), ()>,
}

/// A capability for calling into one native library.
///
/// Holding a `NativeBridge` means the library is loaded. The `hello`
/// export is resolved on first use, at most once, and the outcome of that
/// resolution (success or failure) is kept for the bridge's lifetime.
pub struct NativeBridge {
    config: BridgeConfig,
    library: Arc<Library>,
    hello: OnceLock<Result<HelloExports, BridgeError>>,
    #[cfg(test)]
    resolutions: AtomicUsize,
}

impl NativeBridge {
    /// Loads the configured library. Failures surface here, before any
    /// export is touched.
    pub fn load(config: BridgeConfig) -> Result<Self, BridgeError> {
        let library = cached_load(&config.library, &config.search_paths)?;

        Ok(Self {
            config,
            library,
            hello: OnceLock::new(),
            #[cfg(test)]
            resolutions: AtomicUsize::new(0),
        })
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn library(&self) -> &Arc<Library> {
        &self.library
    }

    pub fn state(&self) -> BridgeState {
        match self.hello.get() {
            Some(Ok(_)) => BridgeState::Resolved,
            _ => BridgeState::Loaded,
        }
    }

    /// Resolves an arbitrary export of the loaded library.
    ///
    /// # Safety
    /// The export must have the C signature `(Args) -> Res`.
    pub unsafe fn export<Args, Res>(
        &self,
        symbol: &str,
    ) -> Result<Export<Args, Res>, BridgeError>
    where
        (Args, Res): Signature,
    {
        unsafe { self.library.get_export(symbol) }
    }

    fn resolve_hello(&self) -> Result<HelloExports, BridgeError> {
        #[cfg(test)]
        self.resolutions.fetch_add(1, Ordering::SeqCst);

        debug!(
            "{}: resolving {} and {}",
            self.library.name(),
            self.config.symbol,
            self.config.release_symbol
        );

        // Both exports follow the C ABI documented for the native library:
        // `char *hello(void)` and `void release(char *)`.
        let hello = unsafe { self.export(&self.config.symbol)? };
        let release = unsafe { self.export(&self.config.release_symbol)? };

        Ok(HelloExports { hello, release })
    }

    /// Calls the native `hello` export and returns its text as an owned
    /// `String`. An empty string is a valid result.
    pub fn hello(&self) -> Result<String, BridgeError> {
        let exports = self
            .hello
            .get_or_init(|| self.resolve_hello())
            .as_ref()
            .map_err(Clone::clone)?;

        let symbol = exports.hello.name();
        let raw = unsafe { exports.hello.call(()) };
        let text = unsafe { NativeString::from_raw(raw, &exports.release, symbol)? };

        text.to_owned_string(symbol)
    }

    #[cfg(test)]
    pub(crate) fn resolution_count(&self) -> usize {
        self.resolutions.load(Ordering::SeqCst)
    }
}
