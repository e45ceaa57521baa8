//! Platform capability interface.
//!
//! The screen never reaches for globals. Everything it needs from the host
//! (clock, timer, visibility, wake lock, fullscreen, drawing) goes through
//! [`Platform`], so the coordination logic runs the same in a browser and in
//! unit tests.
//!
//! Asynchronous capabilities are only *issued* here. The host reports their
//! outcome back through the completion methods on [`crate::ClockScreen`]:
//!
//! | Issued | Reported back with |
//! |--------|--------------------|
//! | [`Platform::start_ticker`] | [`ClockScreen::tick`](crate::ClockScreen::tick) |
//! | [`Platform::request_wake_lock`] | [`wake_lock_granted`](crate::ClockScreen::wake_lock_granted) / [`wake_lock_denied`](crate::ClockScreen::wake_lock_denied) |
//! | (sentinel release event) | [`wake_lock_released`](crate::ClockScreen::wake_lock_released) |
//! | [`Platform::request_fullscreen`] / [`Platform::exit_fullscreen`] | [`fullscreen_settled`](crate::ClockScreen::fullscreen_settled) |
//! | (visibility change event) | [`visibility_changed`](crate::ClockScreen::visibility_changed) |
//! | (fullscreen change event) | [`fullscreen_changed`](crate::ClockScreen::fullscreen_changed) |

use std::time::Duration;

use chrono::{Local, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::render::ClockView;
use crate::wake_lock::RequestId;

/// Host capabilities consumed by [`crate::ClockScreen`].
pub trait Platform {
    /// Opaque handle to a granted wake lock.
    type Sentinel;

    /// Current wall-clock time.
    fn now(&self) -> NaiveDateTime;

    /// Start a repeating timer that calls back every `period`.
    fn start_ticker(&mut self, period: Duration);

    /// Cancel the repeating timer. Must be safe to call when none is running.
    fn stop_ticker(&mut self);

    /// Whether the document is the visible foreground tab.
    fn is_visible(&self) -> bool;

    /// Feature detection for the wake-lock capability.
    fn wake_lock_supported(&self) -> bool;

    /// Ask for a screen wake lock; the answer is reported back tagged with `id`.
    fn request_wake_lock(&mut self, id: RequestId);

    /// Release a sentinel. Fire and forget.
    fn release_wake_lock(&mut self, sentinel: Self::Sentinel);

    /// Whether the document currently has a fullscreen element.
    fn is_fullscreen(&self) -> bool;

    /// Ask for fullscreen on the root element.
    fn request_fullscreen(&mut self);

    /// Ask to leave fullscreen.
    fn exit_fullscreen(&mut self);

    /// Draw a frame.
    fn present(&mut self, view: &ClockView);
}

/// Read the system clock, optionally converted into `tz`.
///
/// Without an override this is the platform's local time.
pub fn system_now(tz: Option<Tz>) -> NaiveDateTime {
    match tz {
        Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
        None => Local::now().naive_local(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_system_now_with_timezone() {
        let utc = system_now(Some(chrono_tz::UTC));
        let tokyo = system_now(Some(chrono_tz::Asia::Tokyo));
        // Tokyo is UTC+9 without DST.
        let diff = (tokyo - utc).num_minutes();
        assert!((539..=541).contains(&diff), "diff was {}", diff);
        assert!(tokyo.hour() < 24);
    }
}
