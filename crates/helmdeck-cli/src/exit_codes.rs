//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// General error - unspecified failure
pub const ERROR: i32 = 1;

/// Config error - the build file could not be loaded
pub const CONFIG_ERROR: i32 = 2;

/// Resolution error - a release could not be resolved or ordered
pub const RESOLUTION_ERROR: i32 = 3;

/// Helm error - a `helm` invocation failed
pub const HELM_ERROR: i32 = 4;

/// IO error - file not found, permission denied, etc.
pub const IO_ERROR: i32 = 5;

/// Usage error - invalid arguments or options (following sysexits.h convention)
pub const USAGE_ERROR: i32 = 64;
