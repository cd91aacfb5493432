//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing arg)  |
//! | 3-9     | local files      | Input/output file problems               |
//! | 10-19   | config           | Settings that no command can run with    |
//! | 50-59   | remote           | Node REST / indexer GraphQL failures     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the `CliError` constructors in `main.rs`

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Local files (3-9)
// =============================================================================

/// Input file or directory could not be read, or a report could not be written.
pub const EXIT_IO: u8 = 3;

/// Input file was read but is malformed (bad JSON/CSV, missing column).
pub const EXIT_DATA: u8 = 4;

// =============================================================================
// Config (10-19)
// =============================================================================

/// Config file unreadable or invalid, unknown network, bad override.
pub const EXIT_CONFIG: u8 = 10;

// =============================================================================
// Remote (50-59)
// =============================================================================

/// Auth rejected by upstream (401/403).
pub const EXIT_REMOTE_AUTH: u8 = 51;

/// Bad request rejected by upstream (400).
pub const EXIT_REMOTE_VALIDATION: u8 = 52;

/// Rate limited after retries (429).
pub const EXIT_REMOTE_RATE_LIMIT: u8 = 53;

/// Upstream error (5xx), network failure, or a response we cannot read.
pub const EXIT_REMOTE_UPSTREAM: u8 = 54;

/// Requested transaction, asset, or collection does not exist.
pub const EXIT_REMOTE_NOT_FOUND: u8 = 55;
