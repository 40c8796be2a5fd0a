//! ULIDs used to correlate log lines.
//!
//! The process id is fixed for the lifetime of the binary. Each ranking pass
//! draws a fresh one with [`generate`] and records both on its tracing span,
//! so every event of one pass, or of one process, can be grepped together.

use once_cell::sync::Lazy;
use ulid::Ulid;

static PROCESS_RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Id of this process, stable across calls.
#[inline]
pub fn process() -> &'static str {
    &PROCESS_RUN_ID
}

/// Fresh, time-ordered id for one pass or request.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
