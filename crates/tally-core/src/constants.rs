/// Upper bound on stepping iterations for a single recurrence expansion.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

/// Log filter used when no level is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Name of the optional TOML configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";
