//! # wakeclock
//!
//! An always-on clock screen for browsers: a large ticking clock that keeps
//! the display awake and can switch itself to fullscreen.
//!
//! The crate is split into a platform-independent core and an optional
//! browser backend:
//! - [`ClockScreen`] composes the one-second ticker, the wake-lock
//!   coordinator and the fullscreen toggle over an injected [`Platform`]
//! - [`WakeLockCoordinator`] keeps at most one wake lock held and re-acquires
//!   it when the tab becomes visible again (and, with self-heal, as soon as
//!   the platform revokes it)
//! - [`ClockView`] formats the clock face as a pure function of the time
//! - [`ClockConfig`] selects between the three screen variants and loads
//!   overrides from YAML, JSON or the page's query string
//!
//! ## Quick Start (browser)
//!
//! ```rust,ignore
//! use wakeclock::web;
//!
//! #[wasm_bindgen(start)]
//! pub fn start() -> Result<(), JsValue> {
//!     let clock = web::mount_from_location()?;
//!     // Keep the screen alive for the lifetime of the page.
//!     std::mem::forget(clock);
//!     Ok(())
//! }
//! ```
//!
//! ## Wake-lock lifecycle
//!
//! | Event | Held | Acquiring | Unlocked |
//! |-------|------|-----------|----------|
//! | mount / fullscreen settled | - | - | request |
//! | tab becomes visible | - | - | request |
//! | platform revokes lock | unlock, request if self-heal and visible | - | - |
//! | unmount | release | release on arrival | - |
//!
//! ## Feature Flags
//!
//! - `web` - Browser backend (DOM rendering, Screen Wake Lock, Fullscreen API)
//! - `full` - All features

pub mod config;
mod error;
pub mod fullscreen;
pub mod platform;
pub mod render;
mod screen;
pub mod wake_lock;

use std::time::Duration;

pub use config::{ClockConfig, DateStyle, HourCycle, Variant};
pub use error::Error;
pub use fullscreen::{FullscreenRequest, FullscreenToggle};
pub use platform::Platform;
pub use render::ClockView;
pub use screen::ClockScreen;
pub use wake_lock::{Grant, RequestId, WakeLockCoordinator, WakeLockState};

/// Interval between clock refreshes.
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

// Optional modules
#[cfg(feature = "web")]
pub mod web;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(TICK_INTERVAL.as_millis(), 1000);
    }

    #[test]
    fn test_default_screen_config() {
        assert_eq!(ClockConfig::default(), Variant::Fullscreen.config());
    }
}
