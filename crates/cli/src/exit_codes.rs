//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                         |
//! |------|-------------------------------------------------|
//! | 0    | Success                                         |
//! | 1    | General error (unspecified)                     |
//! | 2    | Usage error (bad args, missing config file)     |
//! | 3    | Handle not found in the identity sheet          |
//! | 4    | Player identified, but no row in the quest sheet|
//! | 5    | A sheet could not be fetched or parsed          |
//! | 6    | Lookup exceeded its deadline                    |
//! | 7    | Configuration file is invalid                   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use questgrid_resolve::Resolution;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing config file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Lookup (3-6)
// =============================================================================

/// No cell in the identity sheet holds the handle.
pub const EXIT_HANDLE_NOT_FOUND: u8 = 3;

/// The handle resolved, but the display name matched no quest row.
/// Progress is still printed.
pub const EXIT_NAME_ROW_NOT_FOUND: u8 = 4;

/// Identity or quest sheet unavailable (missing file, HTTP error, parse error).
pub const EXIT_GRID_UNAVAILABLE: u8 = 5;

/// `--timeout` elapsed before the lookup finished.
pub const EXIT_TIMED_OUT: u8 = 6;

// =============================================================================
// Config (7)
// =============================================================================

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 7;

/// Map a resolution outcome to its exit code.
pub fn resolution_exit_code(resolution: &Resolution) -> u8 {
    match resolution {
        Resolution::Resolved(_) => EXIT_SUCCESS,
        Resolution::HandleNotFound { .. } => EXIT_HANDLE_NOT_FOUND,
        Resolution::NameRowNotFound { .. } => EXIT_NAME_ROW_NOT_FOUND,
        Resolution::TimedOut { .. } => EXIT_TIMED_OUT,
    }
}
