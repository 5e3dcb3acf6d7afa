//! CLI exit code registry.
//!
//! Exit codes are part of the shell contract; scripts rely on them.

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Config failed to parse or validate (includes unreachable thresholds).
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Runtime failure: unreadable source file, backend error.
pub const EXIT_RUNTIME: u8 = 4;

/// Run completed but produced possible matches that need human review.
pub const EXIT_REVIEW: u8 = 5;
