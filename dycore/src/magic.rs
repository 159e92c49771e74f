/// Name of the environment variable containing the path to the scan configuration file.
/// If not set, defaults to
///  (1) on Linux and macOS: `$XDG_CONFIG_HOME/dyreflect/scan.toml` or `$HOME/.config/dyreflect/scan.toml`
///  (2) on Windows: `%APPDATA%\dyreflect\scan.toml`
pub const ENV_SCAN_CONFIG_PATH: &str = "DYREFLECT_CONFIG_PATH";

/// Directory name used under the platform configuration directory.
pub const CONFIG_DIR_NAME: &str = "dyreflect";

/// File name of the scan configuration.
pub const CONFIG_FILE_NAME: &str = "scan.toml";

/// Prefixes of exported symbols that are handed to the decoder.
pub const SWIFT_ENTRY_POINT_PREFIXES: [&str; 3] = ["__T", "_$s", "_$S"];

/// An image exporting a symbol with this prefix uses the older mangling scheme.
pub const OLD_MANGLING_MARKER: &str = "__TMd";

/// Length of the mangling prefix dropped before comparing a function with
/// witness table entries.
pub const MANGLING_PREFIX_LEN: usize = 3;
