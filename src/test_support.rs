//! Builds the `samples/raw_lib` fixture library for tests.

use crate::config::BridgeConfig;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

/// Directory holding the freshly built fixture (`libraw.so` and friends).
///
/// The fixture is built once per test process, into its own target
/// directory so the nested cargo never waits on the lock of the cargo that
/// is running the tests.
pub(crate) fn fixture_dir() -> &'static Path {
    static DIR: OnceLock<PathBuf> = OnceLock::new();

    DIR.get_or_init(|| {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let target_dir = root.join("target").join("raw-lib-fixture");

        let status = Command::new(env!("CARGO"))
            .arg("build")
            .arg("--quiet")
            .arg("--manifest-path")
            .arg(root.join("samples").join("raw_lib").join("Cargo.toml"))
            .arg("--target-dir")
            .arg(&target_dir)
            .env_remove("CARGO_TARGET_DIR")
            .env_remove("CARGO_BUILD_TARGET")
            .status()
            .expect("failed to run cargo for the fixture library");
        assert!(status.success(), "building the fixture library failed");

        target_dir.join("debug")
    })
}

/// Bridge configuration pointing at the fixture library.
pub(crate) fn fixture_config() -> BridgeConfig {
    BridgeConfig::default().with_search_path(fixture_dir())
}

mod tests {
    use std::path::Path;

    #[test]
    fn fixture_aborts_on_panic_in_every_profile() {
        let manifest = std::fs::read_to_string(
            Path::new(env!("CARGO_MANIFEST_DIR"))
                .join("samples")
                .join("raw_lib")
                .join("Cargo.toml"),
        )
        .unwrap();

        for profile in ["[profile.dev]", "[profile.release]"] {
            let section = manifest
                .split(profile)
                .nth(1)
                .unwrap_or_else(|| panic!("{} missing", profile));
            let body = section.split("\n[").next().unwrap();
            assert!(
                body.lines().any(|l| l.trim() == r#"panic = "abort""#),
                "{} does not abort on panic",
                profile
            );
        }
    }
}
