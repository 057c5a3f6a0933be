//! Finger state estimation and hand landmark overlays.
//!
//! This crate sits behind a hand landmark detector: it takes the 21 landmarks of every detected
//! hand, works out which fingers are extended, and draws the skeleton, landmarks and a per-hand
//! info panel onto a 2D [`Surface`][surface::Surface].
//!
//! # Coordinates
//!
//! All landmark coordinates are in display space of the render target: X points to the right, Y
//! points *down*. Landmark sources producing normalized coordinates have to scale them first (see
//! [`Hand::scale`][landmark::Hand::scale]).
//!
//! # Environment Variables
//!
//! * `RUST_LOG`: overrides the log filter configured by [`init_logger!`].
//! * `FINGERPOSE_WEBCAM_NAME`: forces the device to use for webcams opened without an explicit
//!   device name (only with the `webcam` feature).

use log::LevelFilter;

pub mod driver;
pub mod finger;
pub mod image;
pub mod landmark;
pub mod overlay;
pub mod resolution;
pub mod surface;
pub mod timer;
#[cfg(feature = "webcam")]
pub mod webcam;

pub type Error = Box<dyn std::error::Error + Sync + Send>;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Trace
    } else {
        LevelFilter::Debug
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_CRATE_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and this crate will log at *trace*
/// level. Otherwise, they will log at *debug* level. `RUST_LOG` is applied on top of that.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
