//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `skucheck` exit codes.
//! Scripts rely on them, so treat changes as breaking.
//!
//! | Code | Meaning                                                    |
//! |------|------------------------------------------------------------|
//! | 0    | Success                                                    |
//! | 1    | General error (unspecified)                                |
//! | 2    | CLI usage error (bad args)                                 |
//! | 3    | Config unreadable or invalid                               |
//! | 4    | Input dataset error (missing file, missing column, cost)   |
//! | 5    | Report could not be written                                |
//!
//! Fetch failures never change the exit code: a page that cannot be
//! retrieved contributes an empty group and the run continues.

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unreadable stdin.
pub const EXIT_USAGE: u8 = 2;

/// Config file missing, unparseable, or failing validation.
pub const EXIT_CONFIG: u8 = 3;

/// Input dataset missing, unreadable, or missing a required column.
pub const EXIT_DATASET: u8 = 4;

/// Output directory or report file could not be written.
pub const EXIT_REPORT: u8 = 5;
