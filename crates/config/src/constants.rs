//! Fixed names shared by every stowage installation

/// Directory under the platform config/data dirs
pub const APP_DIR: &str = "stowage";

pub const CONFIG_FILE: &str = "config.toml";

/// Store location used when no platform data dir is known
pub const FALLBACK_STORE_DIR: &str = ".stowage/store";

pub const DEFAULT_TAG: &str = "latest";

pub const ENV_STORE_PATH: &str = "STOWAGE_STORE_PATH";
pub const ENV_LINK_LOCAL: &str = "STOWAGE_LINK_LOCAL";
pub const ENV_TAG: &str = "STOWAGE_TAG";
pub const ENV_NETWORK_RETRIES: &str = "STOWAGE_NETWORK_RETRIES";
pub const ENV_NETWORK_TIMEOUT: &str = "STOWAGE_NETWORK_TIMEOUT";
