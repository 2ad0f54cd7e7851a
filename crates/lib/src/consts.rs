//! Well-known names shared across the crate.

/// Application name, used for log targets and user-facing messages.
pub const APP_NAME: &str = "mbuild";

/// Descriptor file that marks a directory as a package. It doubles as the
/// package's configuration script.
pub const DESCRIPTOR_FILE: &str = "configure.lua";

/// Directory (relative to the root or a package) holding generated config modules.
pub const MODULE_DIR: &str = ".mbuild";

/// File name of the single global config module.
pub const GLOBAL_MODULE_NAME: &str = "global.config.json";

/// File name of each package's local config module.
pub const LOCAL_MODULE_NAME: &str = "local.config.json";

/// Optional settings file at the discovery root.
pub const SETTINGS_FILE: &str = "mbuild.toml";

/// Environment variable selecting the environment name passed to hooks.
pub const ENV_VAR: &str = "MBUILD_ENV";

/// Environment name used when nothing else selects one.
pub const DEFAULT_ENV: &str = "development";

/// Package promoted to the front of the build order unless configured otherwise.
pub const DEFAULT_PROMOTED_PACKAGE: &str = "lbclient";
