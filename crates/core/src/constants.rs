/// Constants used throughout the cachext codebase
// Store and retry defaults
pub const DEFAULT_CACHE_NAME: &str = "myCache";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;
pub const DEFAULT_RETRY_FREQUENCY: u32 = 10;
pub const DEFAULT_SLEEP_UNIT_MS: u64 = 20;
pub const DEFAULT_LOCK_TIMEOUT_SECS: u64 = 60;

// Environment variable names
pub const CACHEXT_ENABLED_VAR: &str = "CACHEXT_ENABLED";
pub const CACHEXT_CACHE_NAME_VAR: &str = "CACHEXT_CACHE_NAME";
pub const CACHEXT_MAX_RETRIES_VAR: &str = "CACHEXT_MAX_RETRIES";
pub const CACHEXT_RETRY_FREQUENCY_VAR: &str = "CACHEXT_RETRY_FREQUENCY";
pub const CACHEXT_SLEEP_MS_VAR: &str = "CACHEXT_SLEEP_MS";
pub const CACHEXT_LOCK_TIMEOUT_MS_VAR: &str = "CACHEXT_LOCK_TIMEOUT_MS";
pub const CACHEXT_CONFIG_DIR_VAR: &str = "XDG_CONFIG_HOME";

// Config file location under the config directory
pub const CONFIG_DIR_NAME: &str = "cachext";
pub const CONFIG_FILE_NAME: &str = "config.json";
