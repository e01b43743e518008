//! Routing of GDAL's CPL error messages into `tracing`.
//!
//! GDAL reports warnings and errors through its own handler, which prints
//! to stderr by default. [`forward_to_tracing`] replaces that handler so the
//! messages end up in the same log stream as everything else, under the
//! `gdal` target.

use gdal::errors::CplErrType;
use tracing::{debug, trace, warn};

/// Installs a process-wide GDAL error handler that emits `tracing` events.
///
/// Failures are also returned as `GdalError`s by the call that raised them,
/// so they are logged at debug level only.
pub fn forward_to_tracing() {
    gdal::config::set_error_handler(|class, number, message| match class {
        CplErrType::None => {}
        CplErrType::Debug => trace!(target: "gdal", number, "{message}"),
        CplErrType::Warning => warn!(target: "gdal", number, "{message}"),
        CplErrType::Failure | CplErrType::Fatal => {
            debug!(target: "gdal", number, class = ?class, "{message}")
        }
    });
}

/// Restores GDAL's default stderr handler.
pub fn restore_default() {
    gdal::config::remove_error_handler();
}
