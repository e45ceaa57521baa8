//! Screen configuration: presets, overrides and loaders.
//!
//! Every field has a default, so a configuration document only lists what it
//! changes. A `variant` key selects one of the three presets first; the other
//! keys are then applied on top of it.
//!
//! # Example (YAML)
//!
//! ```yaml
//! variant: meridiem
//! date_style: long
//! timezone: "Europe/London"
//! ```
//!
//! # Example (page URL)
//!
//! `https://clock.example.com/?variant=minimal&seconds=1&tz=Asia/Tokyo`
//!
//! ```
//! use wakeclock::{ClockConfig, DateStyle};
//!
//! let config = ClockConfig::from_query_string("variant=minimal&date=long").unwrap();
//! assert!(!config.fullscreen_toggle);
//! assert_eq!(config.date_style, DateStyle::Long);
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::Error;

/// The three shipped flavours of the clock screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Short time without seconds, numeric date, no fullscreen button.
    ///
    /// A revoked wake lock is only re-acquired on the next visibility change.
    Minimal,
    /// Seconds plus an AM/PM marker, numeric date, fullscreen button.
    Meridiem,
    /// Seconds without a marker, long date with weekday, fullscreen button.
    #[default]
    Fullscreen,
}

impl Variant {
    /// The complete configuration for this preset.
    pub fn config(self) -> ClockConfig {
        match self {
            Variant::Minimal => ClockConfig {
                hour_cycle: HourCycle::H12,
                show_seconds: false,
                show_meridiem: false,
                blink_separators: true,
                date_style: DateStyle::Numeric,
                fullscreen_toggle: false,
                self_heal: false,
                timezone: None,
            },
            Variant::Meridiem => ClockConfig {
                hour_cycle: HourCycle::H12,
                show_seconds: true,
                show_meridiem: true,
                blink_separators: true,
                date_style: DateStyle::Numeric,
                fullscreen_toggle: true,
                self_heal: true,
                timezone: None,
            },
            Variant::Fullscreen => ClockConfig {
                hour_cycle: HourCycle::H12,
                show_seconds: true,
                show_meridiem: false,
                blink_separators: true,
                date_style: DateStyle::Long,
                fullscreen_toggle: true,
                self_heal: true,
                timezone: None,
            },
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "minimal" => Some(Variant::Minimal),
            "meridiem" | "ampm" => Some(Variant::Meridiem),
            "fullscreen" => Some(Variant::Fullscreen),
            _ => None,
        }
    }
}

/// Hour numbering used for the hour field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HourCycle {
    /// 12, 01, ... 11 (midnight and noon are 12)
    H12,
    /// 00 ... 23
    H23,
}

/// How the calendar date line is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// `19 Oct 2026 - Monday`
    Long,
    /// `19/10/2026`
    Numeric,
}

/// Clock screen configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ConfigOverlay")]
pub struct ClockConfig {
    /// 12- or 24-hour hour field
    pub hour_cycle: HourCycle,
    /// Render the seconds field
    pub show_seconds: bool,
    /// Render AM/PM (only meaningful with [`HourCycle::H12`])
    pub show_meridiem: bool,
    /// Dim the separators on odd seconds
    pub blink_separators: bool,
    /// Date line format
    pub date_style: DateStyle,
    /// Offer the fullscreen toggle button
    pub fullscreen_toggle: bool,
    /// Re-acquire the wake lock as soon as the platform revokes it while visible
    pub self_heal: bool,
    /// IANA timezone override (e.g. "Europe/London"); platform local time if absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Variant::default().config()
    }
}

impl ClockConfig {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::Io(format!(
                "Failed to read config file '{}': {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, Error> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse configuration from a JSON string (e.g. an inline page script block).
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse configuration from a URL query string.
    ///
    /// Recognised keys: `variant`, `hours` (`12`/`24`), `seconds`, `meridiem`,
    /// `blink`, `date` (`long`/`numeric`), `fullscreen`, `self_heal`, `tz`.
    /// Unknown keys are ignored since page URLs often carry unrelated parameters.
    /// A leading `?` is accepted.
    pub fn from_query_string(query: &str) -> Result<Self, Error> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let params: Params<'_> = form_urlencoded::parse(query.as_bytes()).collect();

        let mut overlay = ConfigOverlay::default();
        if let Some(v) = params.get("variant") {
            overlay.variant = Some(Variant::parse(v).ok_or_else(|| invalid("variant", v))?);
        }
        if let Some(v) = params.get("hours") {
            overlay.hour_cycle = Some(match &**v {
                "12" => HourCycle::H12,
                "24" | "23" => HourCycle::H23,
                _ => return Err(invalid("hours", v)),
            });
        }
        if let Some(v) = params.get("date") {
            overlay.date_style = Some(match v.to_lowercase().as_str() {
                "long" => DateStyle::Long,
                "numeric" | "short" => DateStyle::Numeric,
                _ => return Err(invalid("date", v)),
            });
        }
        overlay.show_seconds = flag(&params, "seconds")?;
        overlay.show_meridiem = flag(&params, "meridiem")?;
        overlay.blink_separators = flag(&params, "blink")?;
        overlay.fullscreen_toggle = flag(&params, "fullscreen")?;
        overlay.self_heal = flag(&params, "self_heal")?;
        overlay.timezone = params.get("tz").map(|s| s.to_string());

        overlay.try_into()
    }

    /// The parsed timezone override, if any.
    pub fn tz(&self) -> Option<Tz> {
        self.timezone.as_deref().and_then(|name| name.parse().ok())
    }

    /// Whether an AM/PM marker is rendered.
    pub fn renders_meridiem(&self) -> bool {
        self.show_meridiem && self.hour_cycle == HourCycle::H12
    }
}

/// Partial configuration as written by users; resolved against a preset.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverlay {
    variant: Option<Variant>,
    hour_cycle: Option<HourCycle>,
    show_seconds: Option<bool>,
    show_meridiem: Option<bool>,
    blink_separators: Option<bool>,
    date_style: Option<DateStyle>,
    fullscreen_toggle: Option<bool>,
    self_heal: Option<bool>,
    timezone: Option<String>,
}

impl TryFrom<ConfigOverlay> for ClockConfig {
    type Error = Error;

    fn try_from(overlay: ConfigOverlay) -> Result<Self, Self::Error> {
        let base = overlay.variant.unwrap_or_default().config();

        if let Some(name) = &overlay.timezone {
            name.parse::<Tz>()
                .map_err(|_| Error::Config(format!("unknown timezone '{}'", name)))?;
        }

        Ok(ClockConfig {
            hour_cycle: overlay.hour_cycle.unwrap_or(base.hour_cycle),
            show_seconds: overlay.show_seconds.unwrap_or(base.show_seconds),
            show_meridiem: overlay.show_meridiem.unwrap_or(base.show_meridiem),
            blink_separators: overlay.blink_separators.unwrap_or(base.blink_separators),
            date_style: overlay.date_style.unwrap_or(base.date_style),
            fullscreen_toggle: overlay.fullscreen_toggle.unwrap_or(base.fullscreen_toggle),
            self_heal: overlay.self_heal.unwrap_or(base.self_heal),
            timezone: overlay.timezone.or(base.timezone),
        })
    }
}

type Params<'a> = HashMap<Cow<'a, str>, Cow<'a, str>>;

fn flag(params: &Params<'_>, key: &str) -> Result<Option<bool>, Error> {
    match params.get(key) {
        None => Ok(None),
        Some(v) => match v.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" | "" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(invalid(key, v)),
        },
    }
}

fn invalid(key: &str, value: &str) -> Error {
    Error::Config(format!("invalid value '{}' for '{}'", value, key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fullscreen_variant() {
        let config = ClockConfig::default();
        assert_eq!(config, Variant::Fullscreen.config());
        assert!(config.show_seconds);
        assert!(!config.show_meridiem);
        assert!(config.fullscreen_toggle);
        assert!(config.self_heal);
        assert_eq!(config.date_style, DateStyle::Long);
    }

    #[test]
    fn test_minimal_variant_has_no_self_heal() {
        let config = Variant::Minimal.config();
        assert!(!config.self_heal);
        assert!(!config.fullscreen_toggle);
        assert!(!config.show_seconds);
    }

    #[test]
    fn test_from_yaml_overlays_variant() {
        let yaml = r#"
variant: meridiem
date_style: long
timezone: "Europe/London"
"#;
        let config = ClockConfig::from_yaml(yaml).unwrap();
        assert!(config.show_meridiem);
        assert_eq!(config.date_style, DateStyle::Long);
        assert_eq!(config.tz(), Some(chrono_tz::Europe::London));
    }

    #[test]
    fn test_from_yaml_empty_document_uses_defaults() {
        let config = ClockConfig::from_yaml("{}").unwrap();
        assert_eq!(config, ClockConfig::default());
    }

    #[test]
    fn test_from_yaml_rejects_unknown_field() {
        let err = ClockConfig::from_yaml("show_millis: true").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        let err = ClockConfig::from_json(r#"{"timezone": "Mars/Olympus"}"#).unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }

    #[test]
    fn test_json_roundtrip_preserves_config() {
        let config = ClockConfig {
            hour_cycle: HourCycle::H23,
            timezone: Some("Asia/Tokyo".to_string()),
            ..Variant::Minimal.config()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"hour_cycle\":\"h23\""));
        assert_eq!(ClockConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_from_query_string() {
        let config =
            ClockConfig::from_query_string("?variant=minimal&seconds=1&tz=Asia%2FTokyo&utm=x")
                .unwrap();
        assert!(config.show_seconds);
        assert!(!config.self_heal);
        assert_eq!(config.tz(), Some(chrono_tz::Asia::Tokyo));
    }

    #[test]
    fn test_from_query_string_flags_and_hours() {
        let config = ClockConfig::from_query_string("hours=24&self_heal=off&date=numeric").unwrap();
        assert_eq!(config.hour_cycle, HourCycle::H23);
        assert!(!config.self_heal);
        assert_eq!(config.date_style, DateStyle::Numeric);
        assert!(!config.renders_meridiem());
    }

    #[test]
    fn test_from_query_string_invalid_values() {
        assert!(ClockConfig::from_query_string("variant=huge").is_err());
        assert!(ClockConfig::from_query_string("seconds=maybe").is_err());
        assert!(ClockConfig::from_query_string("hours=13").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = ClockConfig::load("/nonexistent/wakeclock.yaml").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
