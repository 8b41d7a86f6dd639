//! Platform layer
//!
//! Handles browser/native differences for:
//! - Logger installation
//! - The JS-facing course handle (web only)

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::CourseHandle;

/// Install the logger for the current platform
///
/// Safe to call more than once; later calls are ignored.
pub fn init_logging() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            log::debug!("Logger already installed");
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        if env_logger::try_init().is_err() {
            log::debug!("Logger already installed");
        }
    }
}
