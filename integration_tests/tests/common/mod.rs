use std::path::PathBuf;
use std::sync::Once;

use fog_core::{load_fog_config_from_env, FogEngine, FOG_CONFIG_PATH_ENV};

static INIT: Once = Once::new();

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures")
            .join("test_fog_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test fog config at {}",
            config_path.display()
        );

        std::env::set_var(FOG_CONFIG_PATH_ENV, &config_path);
    });
}

/// Engine over the 10x10 fixture grid.
pub fn test_engine() -> FogEngine {
    ensure_test_config();
    let (config, path) = load_fog_config_from_env();
    assert!(path.is_some(), "fixture config should load from file");
    FogEngine::new(&config).expect("fixture config should build an engine")
}
