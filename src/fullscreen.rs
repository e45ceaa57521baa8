//! Fullscreen toggle.
//!
//! The direction of a toggle is decided from the platform's current
//! fullscreen element, never from the cached flag. The flag itself only moves
//! when the platform reports a change, so it always reflects what is actually
//! on screen rather than what was requested.

/// Which transition to ask the platform for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FullscreenRequest {
    /// Request fullscreen on the root element
    Enter,
    /// Leave fullscreen
    Exit,
}

/// Fullscreen flag mirror and toggle decision.
#[derive(Debug, Clone, Default)]
pub struct FullscreenToggle {
    is_fullscreen: bool,
}

impl FullscreenToggle {
    /// Start from the platform's current state.
    pub fn new(is_fullscreen: bool) -> Self {
        Self { is_fullscreen }
    }

    /// The last fullscreen state reported by the platform.
    pub fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Pick the transition for a toggle, given whether the document has a
    /// fullscreen element right now.
    pub fn toggle(&self, platform_fullscreen: bool) -> FullscreenRequest {
        if platform_fullscreen {
            FullscreenRequest::Exit
        } else {
            FullscreenRequest::Enter
        }
    }

    /// Record a platform change notification. Returns `true` if the flag moved.
    pub fn changed(&mut self, is_fullscreen: bool) -> bool {
        let moved = self.is_fullscreen != is_fullscreen;
        self.is_fullscreen = is_fullscreen;
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_direction_follows_platform() {
        let toggle = FullscreenToggle::new(false);
        assert_eq!(toggle.toggle(false), FullscreenRequest::Enter);
        assert_eq!(toggle.toggle(true), FullscreenRequest::Exit);
    }

    #[test]
    fn test_toggle_does_not_move_flag() {
        let toggle = FullscreenToggle::new(false);
        let _ = toggle.toggle(false);
        assert!(!toggle.is_fullscreen());
    }

    #[test]
    fn test_changed() {
        let mut toggle = FullscreenToggle::default();
        assert!(toggle.changed(true));
        assert!(toggle.is_fullscreen());
        assert!(!toggle.changed(true));
        assert!(toggle.changed(false));
    }
}
