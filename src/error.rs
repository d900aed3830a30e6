use std::fmt::Display;

/// Failures of the native bridge.
///
/// Each kind points at a deployment or build defect, so none of them is
/// retried. The enum is `Clone` because a cached outcome is handed out to
/// every caller that raced on the first initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The library file is missing, or the dynamic loader rejected it.
    LibraryLoad { library: String, reason: String },
    /// The library is loaded but does not export the expected symbol.
    SymbolResolution {
        library: String,
        symbol: String,
        reason: String,
    },
    /// The native function ran but reported a fault.
    NativeCall { symbol: String, reason: String },
}

impl BridgeError {
    pub(crate) fn library_load(library: &str, reason: impl Display) -> Self {
        BridgeError::LibraryLoad {
            library: library.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn symbol_resolution(library: &str, symbol: &str, reason: impl Display) -> Self {
        BridgeError::SymbolResolution {
            library: library.to_string(),
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn native_call(symbol: &str, reason: impl Display) -> Self {
        BridgeError::NativeCall {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn is_library_load(&self) -> bool {
        matches!(self, BridgeError::LibraryLoad { .. })
    }

    pub fn is_symbol_resolution(&self) -> bool {
        matches!(self, BridgeError::SymbolResolution { .. })
    }

    pub fn is_native_call(&self) -> bool {
        matches!(self, BridgeError::NativeCall { .. })
    }
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BridgeError::LibraryLoad { library, reason } => {
                write!(f, "Failed to load library {}: {}", library, reason)
            }
            BridgeError::SymbolResolution {
                library,
                symbol,
                reason,
            } => {
                write!(
                    f,
                    "Symbol {} could not be resolved in {}: {}",
                    symbol, library, reason
                )
            }
            BridgeError::NativeCall { symbol, reason } => {
                write!(f, "Native call to {} failed: {}", symbol, reason)
            }
        }
    }
}

impl std::error::Error for BridgeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        let load = BridgeError::library_load("raw", "not found");
        let resolve = BridgeError::symbol_resolution("raw", "hello", "undefined symbol");
        let call = BridgeError::native_call("hello", "returned null");

        assert!(load.is_library_load() && !load.is_symbol_resolution());
        assert!(resolve.is_symbol_resolution() && !resolve.is_native_call());
        assert!(call.is_native_call() && !call.is_library_load());
    }

    #[test]
    fn display_names_the_culprit() {
        let e = BridgeError::symbol_resolution("raw", "hello", "undefined symbol");
        assert_eq!(
            e.to_string(),
            "Symbol hello could not be resolved in raw: undefined symbol"
        );
    }

    #[test]
    fn converts_into_anyhow() {
        let e: anyhow::Error = BridgeError::native_call("hello", "returned null").into();
        let back = e.downcast_ref::<BridgeError>().unwrap();
        assert!(back.is_native_call());
    }
}
