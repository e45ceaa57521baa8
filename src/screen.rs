//! The clock screen: ticker, wake-lock coordinator and fullscreen toggle
//! composed over one [`Platform`].
//!
//! All methods run on the host's single UI thread. Platform events and
//! asynchronous completions are delivered by calling the matching method;
//! nothing here blocks or suspends.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut screen = ClockScreen::new(ClockConfig::default(), platform);
//! screen.mount();
//!
//! // From the host's timer callback:
//! screen.tick();
//!
//! // From the host's visibilitychange listener:
//! screen.visibility_changed();
//!
//! screen.unmount();
//! ```

use chrono::NaiveDateTime;

use crate::config::ClockConfig;
use crate::fullscreen::{FullscreenRequest, FullscreenToggle};
use crate::platform::Platform;
use crate::render::ClockView;
use crate::wake_lock::{Grant, RequestId, WakeLockCoordinator, WakeLockState};
use crate::{Error, TICK_INTERVAL};

/// A mounted (or mountable) clock screen.
pub struct ClockScreen<P: Platform> {
    platform: P,
    config: ClockConfig,
    now: NaiveDateTime,
    wake_lock: WakeLockCoordinator<P::Sentinel>,
    fullscreen: FullscreenToggle,
    mounted: bool,
}

impl<P: Platform> ClockScreen<P> {
    /// Create an unmounted screen.
    pub fn new(config: ClockConfig, platform: P) -> Self {
        Self {
            now: platform.now(),
            fullscreen: FullscreenToggle::new(platform.is_fullscreen()),
            wake_lock: WakeLockCoordinator::new(config.self_heal),
            platform,
            config,
            mounted: false,
        }
    }

    /// Start ticking, draw the first frame and try to keep the display awake.
    ///
    /// A screen can only be mounted once; later calls are ignored.
    pub fn mount(&mut self) {
        if self.mounted || !self.wake_lock.is_active() {
            return;
        }
        self.mounted = true;
        tracing::info!(
            self_heal = self.config.self_heal,
            wake_lock_supported = self.platform.wake_lock_supported(),
            "clock screen mounted"
        );

        self.platform.start_ticker(TICK_INTERVAL);
        self.now = self.platform.now();
        self.present();
        self.acquire_wake_lock();
    }

    /// Stop the ticker and release the wake lock if one is held.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.platform.stop_ticker();
        if let Some(sentinel) = self.wake_lock.teardown() {
            self.platform.release_wake_lock(sentinel);
        }
        tracing::info!("clock screen unmounted");
    }

    /// Timer callback: refresh the current time and redraw.
    pub fn tick(&mut self) {
        if !self.mounted {
            return;
        }
        self.now = self.platform.now();
        self.present();
    }

    /// Visibility change callback.
    pub fn visibility_changed(&mut self) {
        if !self.mounted {
            return;
        }
        let visible = self.platform.is_visible();
        tracing::trace!(visible, "visibility changed");
        let supported = self.platform.wake_lock_supported();
        if let Some(id) = self.wake_lock.visibility_changed(visible, supported) {
            self.platform.request_wake_lock(id);
        }
    }

    /// Try to acquire the wake lock now (no-op if held, pending or unsupported).
    pub fn acquire_wake_lock(&mut self) {
        let supported = self.platform.wake_lock_supported();
        if let Some(id) = self.wake_lock.acquire(supported) {
            self.platform.request_wake_lock(id);
        }
    }

    /// The platform granted wake-lock request `id`.
    ///
    /// Grants arriving after unmount, or for a request that is no longer
    /// outstanding, are released straight away.
    pub fn wake_lock_granted(&mut self, id: RequestId, sentinel: P::Sentinel) {
        if let Grant::Release(sentinel) = self.wake_lock.granted(id, sentinel) {
            self.platform.release_wake_lock(sentinel);
        }
    }

    /// The platform rejected wake-lock request `id`. Nothing is retried here;
    /// the next visibility change or fullscreen transition tries again.
    pub fn wake_lock_denied(&mut self, id: RequestId, error: Error) {
        self.wake_lock.denied(id, &error);
    }

    /// The platform revoked the wake lock granted for `id`.
    pub fn wake_lock_released(&mut self, id: RequestId) {
        let visible = self.platform.is_visible();
        if let Some(next) = self.wake_lock.released(id, visible) {
            self.platform.request_wake_lock(next);
        }
    }

    /// User asked to toggle fullscreen.
    ///
    /// The host must call [`fullscreen_settled`](Self::fullscreen_settled)
    /// once the platform request resolves or rejects.
    pub fn toggle_fullscreen(&mut self) {
        if !self.mounted || !self.config.fullscreen_toggle {
            return;
        }
        match self.fullscreen.toggle(self.platform.is_fullscreen()) {
            FullscreenRequest::Enter => self.platform.request_fullscreen(),
            FullscreenRequest::Exit => self.platform.exit_fullscreen(),
        }
    }

    /// A fullscreen request finished (either way). Some platforms drop the
    /// wake lock across the transition, so ask for it again.
    pub fn fullscreen_settled(&mut self, outcome: Result<(), Error>) {
        if let Err(error) = outcome {
            tracing::debug!(%error, "fullscreen request failed");
        }
        if self.mounted {
            self.acquire_wake_lock();
        }
    }

    /// Fullscreen change callback: sync the flag and redraw if it moved.
    pub fn fullscreen_changed(&mut self) {
        let is_fullscreen = self.platform.is_fullscreen();
        if self.fullscreen.changed(is_fullscreen) && self.mounted {
            self.present();
        }
    }

    /// The view for the current state.
    pub fn view(&self) -> ClockView {
        ClockView::new(self.now, self.fullscreen.is_fullscreen(), &self.config)
    }

    /// Time shown by the last tick.
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Wake-lock coordinator state.
    pub fn wake_lock_state(&self) -> WakeLockState {
        self.wake_lock.state()
    }

    /// Last fullscreen state reported by the platform.
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen.is_fullscreen()
    }

    /// Whether the screen is mounted.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Active configuration.
    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// The underlying platform.
    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// The underlying platform, mutably.
    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    fn present(&mut self) {
        let view = self.view();
        self.platform.present(&view);
    }
}

impl<P: Platform> Drop for ClockScreen<P> {
    fn drop(&mut self) {
        self.unmount();
    }
}
