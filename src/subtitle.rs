use crate::bridge::NativeBridge;
use crate::error::BridgeError;
use log::warn;

/// What the host shows when the native text is unavailable.
pub const FALLBACK_SUBTITLE: &str = "";

fn or_fallback(result: Result<String, BridgeError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => {
            warn!("native subtitle unavailable, using placeholder: {}", e);
            FALLBACK_SUBTITLE.to_string()
        }
    }
}

/// Subtitle text from the process-global bridge, degraded to a placeholder
/// on any bridge failure.
pub fn subtitle() -> String {
    or_fallback(crate::hello())
}

/// Like [`subtitle`], for a host that owns its own bridge. A host whose
/// bridge failed to load passes that error straight through.
pub fn subtitle_from(bridge: Result<&NativeBridge, &BridgeError>) -> String {
    or_fallback(bridge.map_err(Clone::clone).and_then(NativeBridge::hello))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::test_support::fixture_config;

    #[test]
    fn shows_native_text() {
        let bridge = NativeBridge::load(fixture_config()).unwrap();
        assert_eq!(subtitle_from(Ok(&bridge)), "native-hello");
    }

    #[test]
    fn absent_library_shows_placeholder() {
        let loaded = NativeBridge::load(BridgeConfig::for_library("raw_bridge_not_deployed"));
        let err = loaded.as_ref().err().unwrap();
        assert!(err.is_library_load());

        assert_eq!(subtitle_from(Err(err)), FALLBACK_SUBTITLE);
    }

    #[test]
    fn native_fault_shows_placeholder() {
        let mut config = fixture_config();
        config.symbol = "hello_null".to_string();
        let bridge = NativeBridge::load(config).unwrap();

        assert_eq!(subtitle_from(Ok(&bridge)), FALLBACK_SUBTITLE);
    }
}
