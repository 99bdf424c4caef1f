// src/constants.rs

/// Environment variable that, when set to `true`, disables pseudo-terminal allocation.
pub const DISABLE_PTY_ENV: &str = "RELAY_DISABLE_PTY";

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "RELAY_CONFIG";

/// The name of the directory holding relay configuration (inside the system config dir).
pub const CONFIG_DIR_NAME: &str = "relay";

/// The name of the configuration file (inside the relay config directory).
pub const CONFIG_FILENAME: &str = "config.toml";

/// The changelog file used when none is given.
pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";

/// The header pattern that opens (and closes) a changelog section by default.
pub const DEFAULT_SECTION_HEADER: &str = "^## .+";

/// The GitHub Actions output variable written when none is named.
pub const DEFAULT_GITHUB_OUTPUT_VAR: &str = "changelog";

/// Exit code used when the program is interrupted with Ctrl+C.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;
