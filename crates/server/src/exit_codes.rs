//! CLI Exit Code Registry
//!
//! Single source of truth for `validasexo` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 2    | Usage or configuration error                       |
//! | 3    | Model artifact could not be loaded                 |
//! | 4    | Input table rejected (unreadable, missing `Nome`)  |
//! | 5    | I/O error (files, socket bind, server failure)     |

/// Command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Bad arguments or invalid settings.
pub const EXIT_USAGE: u8 = 2;

/// Model artifact missing, unreadable or inconsistent.
pub const EXIT_MODEL: u8 = 3;

/// Input table could not be processed.
pub const EXIT_INPUT: u8 = 4;

/// Filesystem or network failure.
pub const EXIT_IO: u8 = 5;
