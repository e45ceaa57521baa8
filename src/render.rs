//! Clock face formatting.
//!
//! Everything here is a pure function of the current time, the configuration
//! and the fullscreen flag. The one-second separator blink falls out of the
//! parity of the seconds field, so no extra timer is involved.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use wakeclock::{ClockView, Variant};
//!
//! let now = NaiveDate::from_ymd_opt(2026, 10, 19)
//!     .unwrap()
//!     .and_hms_opt(13, 0, 0)
//!     .unwrap();
//! let view = ClockView::new(now, false, &Variant::Meridiem.config());
//!
//! assert_eq!(view.hour, "01");
//! assert_eq!(view.meridiem, Some("PM"));
//! assert_eq!(view.time_text(), "01:00:00 PM");
//! ```

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

use crate::config::{ClockConfig, DateStyle, HourCycle};

/// Label of the fullscreen button (also used as its accessible name).
pub const FULLSCREEN_LABEL: &str = "Fullscreen";

/// Accessible description of the fullscreen button.
pub const FULLSCREEN_ARIA_LABEL: &str = "Enter fullscreen";

/// Everything a renderer needs to draw one frame of the clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClockView {
    /// Zero-padded hour field
    pub hour: String,
    /// Zero-padded minute field
    pub minute: String,
    /// Zero-padded second field, absent when seconds are hidden
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second: Option<String>,
    /// "AM" / "PM", absent when no marker is shown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meridiem: Option<&'static str>,
    /// Separators at full emphasis (even second) or dimmed (odd second)
    pub separators_lit: bool,
    /// Calendar date line
    pub date: String,
    /// Whether the fullscreen button is drawn
    pub show_fullscreen_button: bool,
}

impl ClockView {
    /// Derive the view for `now`.
    pub fn new(now: NaiveDateTime, is_fullscreen: bool, config: &ClockConfig) -> Self {
        let second = now.second();

        let hour = match config.hour_cycle {
            HourCycle::H12 => twelve_hour(now.hour()),
            HourCycle::H23 => now.hour(),
        };

        let meridiem = if config.renders_meridiem() {
            Some(if now.hour() < 12 { "AM" } else { "PM" })
        } else {
            None
        };

        Self {
            hour: format!("{:02}", hour),
            minute: format!("{:02}", now.minute()),
            second: config.show_seconds.then(|| format!("{:02}", second)),
            meridiem,
            separators_lit: !config.blink_separators || separators_lit(second),
            date: format_date(now, config.date_style),
            show_fullscreen_button: config.fullscreen_toggle && !is_fullscreen,
        }
    }

    /// The time as a single line, e.g. `01:00:00 PM`.
    pub fn time_text(&self) -> String {
        let mut text = format!("{}:{}", self.hour, self.minute);
        if let Some(second) = &self.second {
            text.push(':');
            text.push_str(second);
        }
        if let Some(meridiem) = self.meridiem {
            text.push(' ');
            text.push_str(meridiem);
        }
        text
    }
}

/// Separator emphasis for a given second: on for even, dim for odd.
pub fn separators_lit(second: u32) -> bool {
    second % 2 == 0
}

/// Map a 0-23 hour onto the 12-hour dial (0 and 12 both become 12).
fn twelve_hour(hour24: u32) -> u32 {
    match hour24 % 12 {
        0 => 12,
        h => h,
    }
}

/// Format the date line (en-GB field order).
pub fn format_date(now: NaiveDateTime, style: DateStyle) -> String {
    match style {
        DateStyle::Long => now.format("%d %b %Y - %A").to_string(),
        DateStyle::Numeric => now.format("%d/%m/%Y").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_afternoon_with_meridiem() {
        let view = ClockView::new(at(13, 0, 0), false, &Variant::Meridiem.config());
        assert_eq!(view.hour, "01");
        assert_eq!(view.minute, "00");
        assert_eq!(view.second.as_deref(), Some("00"));
        assert_eq!(view.meridiem, Some("PM"));
    }

    #[test]
    fn test_just_after_midnight() {
        let view = ClockView::new(at(0, 30, 5), false, &Variant::Meridiem.config());
        assert_eq!(view.hour, "12");
        assert_eq!(view.minute, "30");
        assert_eq!(view.second.as_deref(), Some("05"));
        assert_eq!(view.meridiem, Some("AM"));
        assert_eq!(view.time_text(), "12:30:05 AM");
    }

    #[test]
    fn test_noon_is_twelve_pm() {
        let view = ClockView::new(at(12, 0, 0), false, &Variant::Meridiem.config());
        assert_eq!(view.hour, "12");
        assert_eq!(view.meridiem, Some("PM"));
    }

    #[test]
    fn test_separator_blink_follows_second_parity() {
        let config = ClockConfig::default();
        for s in 0..60 {
            let view = ClockView::new(at(9, 15, s), false, &config);
            assert_eq!(view.separators_lit, s % 2 == 0, "second {}", s);
        }
    }

    #[test]
    fn test_blink_disabled_keeps_separators_lit() {
        let config = ClockConfig {
            blink_separators: false,
            ..ClockConfig::default()
        };
        assert!(ClockView::new(at(9, 15, 7), false, &config).separators_lit);
    }

    #[test]
    fn test_default_variant_has_no_meridiem() {
        let view = ClockView::new(at(18, 4, 9), false, &ClockConfig::default());
        assert_eq!(view.hour, "06");
        assert_eq!(view.meridiem, None);
        assert_eq!(view.time_text(), "06:04:09");
    }

    #[test]
    fn test_minimal_variant_is_short_time() {
        let view = ClockView::new(at(18, 4, 9), false, &Variant::Minimal.config());
        assert_eq!(view.second, None);
        assert_eq!(view.time_text(), "06:04");
        assert_eq!(view.date, "19/10/2026");
    }

    #[test]
    fn test_twenty_four_hour_cycle_suppresses_meridiem() {
        let config = ClockConfig {
            hour_cycle: HourCycle::H23,
            ..Variant::Meridiem.config()
        };
        let view = ClockView::new(at(0, 5, 0), false, &config);
        assert_eq!(view.hour, "00");
        assert_eq!(view.meridiem, None);
    }

    #[test]
    fn test_long_date() {
        assert_eq!(format_date(at(8, 0, 0), DateStyle::Long), "19 Oct 2026 - Monday");
        let early = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(format_date(early, DateStyle::Long), "01 Mar 2026 - Sunday");
        assert_eq!(format_date(early, DateStyle::Numeric), "01/03/2026");
    }

    #[test]
    fn test_fullscreen_button_visibility() {
        let config = ClockConfig::default();
        assert!(ClockView::new(at(8, 0, 0), false, &config).show_fullscreen_button);
        assert!(!ClockView::new(at(8, 0, 0), true, &config).show_fullscreen_button);

        let minimal = Variant::Minimal.config();
        assert!(!ClockView::new(at(8, 0, 0), false, &minimal).show_fullscreen_button);
    }

    #[test]
    fn test_view_serialization() {
        let view = ClockView::new(at(13, 0, 1), false, &ClockConfig::default());
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["hour"], "01");
        assert_eq!(json["separators_lit"], false);
        assert!(json.get("meridiem").is_none());
    }
}
