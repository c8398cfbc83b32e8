//! Maps provider condition codes and temperatures onto card artwork.

use chrono::{DateTime, Timelike};
use chrono_tz::Tz;

use crate::catalog::IconMap;
use crate::constants::icons::{NIGHT_SUFFIX, THERMOMETER};

/// Hour of day in `[0, 23]` at `unix_seconds` in the named IANA zone.
#[must_use]
pub fn local_hour(unix_seconds: i64, timezone: &str) -> Option<u32> {
    let tz: Tz = timezone.parse().ok()?;
    let instant = DateTime::from_timestamp(unix_seconds, 0)?;
    Some(instant.with_timezone(&tz).hour())
}

/// Fixed boundary, no sunrise/sunset lookup.
#[must_use]
pub const fn is_night_hour(hour: u32) -> bool {
    hour <= 5 || hour >= 18
}

#[must_use]
pub fn resolve_icon(
    icons: &IconMap,
    code: Option<&str>,
    unix_seconds: Option<i64>,
    timezone: Option<&str>,
) -> String {
    let Some(code) = code.filter(|c| icons.get(c).is_some()) else {
        return icons.default_icon().to_string();
    };

    let mut key = code.to_string();

    if !code.contains("day") && !code.contains("night") {
        let hour = unix_seconds
            .zip(timezone)
            .and_then(|(time, tz)| local_hour(time, tz));

        if hour.is_some_and(is_night_hour) {
            key.push_str(NIGHT_SUFFIX);
        }
    }

    icons.get_or_default(&key).to_string()
}

#[must_use]
pub fn thermometer_key(temperature: f64) -> &'static str {
    if temperature >= 85.0 {
        "thermo-100"
    } else if temperature >= 65.0 {
        "thermo-75"
    } else if temperature >= 45.0 {
        "thermo-50"
    } else if temperature >= 33.0 {
        "thermo-25"
    } else {
        "thermo-0"
    }
}

#[must_use]
pub fn resolve_thermometer(icons: &IconMap, temperature: f64) -> String {
    icons.get_or_default(thermometer_key(temperature)).to_string()
}

/// Thermometer shown when no temperature is known.
#[must_use]
pub fn neutral_thermometer(icons: &IconMap) -> String {
    icons.get_or_default(THERMOMETER).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn icons() -> IconMap {
        let entries: HashMap<String, String> = [
            ("default", "default.png"),
            ("clear", "clear.png"),
            ("clear-night", "clear-night.png"),
            ("clear-day", "clear-day.png"),
            ("rain", "rain.png"),
            ("thermo", "thermo.png"),
            ("thermo-0", "t0.png"),
            ("thermo-25", "t25.png"),
            ("thermo-50", "t50.png"),
            ("thermo-75", "t75.png"),
            ("thermo-100", "t100.png"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        IconMap::new(entries).unwrap()
    }

    // 2021-06-15T19:00:00Z and 2021-06-15T12:00:00Z
    const UTC_19H: i64 = 1_623_783_600;
    const UTC_12H: i64 = 1_623_758_400;

    #[test]
    fn test_local_hour_uses_location_timezone() {
        assert_eq!(local_hour(UTC_19H, "UTC"), Some(19));
        // UTC-4 during summer time
        assert_eq!(local_hour(UTC_19H, "America/New_York"), Some(15));
        assert_eq!(local_hour(UTC_12H, "Asia/Tokyo"), Some(21));
        assert_eq!(local_hour(UTC_12H, "Not/AZone"), None);
    }

    #[test]
    fn test_night_boundary() {
        for hour in 0..24 {
            assert_eq!(is_night_hour(hour), hour <= 5 || hour >= 18, "hour {hour}");
        }
    }

    #[test]
    fn test_night_variant_appended_in_the_evening() {
        let icons = icons();
        assert_eq!(
            resolve_icon(&icons, Some("clear"), Some(UTC_19H), Some("UTC")),
            "clear-night.png"
        );
        assert_eq!(
            resolve_icon(&icons, Some("clear"), Some(UTC_12H), Some("UTC")),
            "clear.png"
        );
    }

    #[test]
    fn test_explicit_day_night_codes_untouched() {
        let icons = icons();
        assert_eq!(
            resolve_icon(&icons, Some("clear-day"), Some(UTC_19H), Some("UTC")),
            "clear-day.png"
        );
    }

    #[test]
    fn test_missing_inputs_skip_night_logic() {
        let icons = icons();
        assert_eq!(resolve_icon(&icons, Some("clear"), None, Some("UTC")), "clear.png");
        assert_eq!(resolve_icon(&icons, Some("clear"), Some(UTC_19H), None), "clear.png");
    }

    #[test]
    fn test_unmapped_codes_fall_back_to_default() {
        let icons = icons();
        assert_eq!(resolve_icon(&icons, None, None, None), "default.png");
        assert_eq!(resolve_icon(&icons, Some("tornado"), None, None), "default.png");
        // "rain" is mapped but "rain-night" is not
        assert_eq!(
            resolve_icon(&icons, Some("rain"), Some(UTC_19H), Some("UTC")),
            "default.png"
        );
    }

    #[test]
    fn test_thermometer_bands() {
        let icons = icons();
        assert_eq!(resolve_thermometer(&icons, 100.0), "t100.png");
        assert_eq!(resolve_thermometer(&icons, 85.0), "t100.png");
        assert_eq!(resolve_thermometer(&icons, 84.9), "t75.png");
        assert_eq!(resolve_thermometer(&icons, 65.0), "t75.png");
        assert_eq!(resolve_thermometer(&icons, 64.9), "t50.png");
        assert_eq!(resolve_thermometer(&icons, 45.0), "t50.png");
        assert_eq!(resolve_thermometer(&icons, 44.9), "t25.png");
        assert_eq!(resolve_thermometer(&icons, 33.0), "t25.png");
        assert_eq!(resolve_thermometer(&icons, 32.9), "t0.png");
        assert_eq!(resolve_thermometer(&icons, -40.0), "t0.png");
        assert_eq!(neutral_thermometer(&icons), "thermo.png");
    }

    #[test]
    fn test_thermometer_monotonic() {
        let order = ["thermo-0", "thermo-25", "thermo-50", "thermo-75", "thermo-100"];
        let mut last = 0;
        for tenth in -200..1200 {
            let band = order
                .iter()
                .position(|k| *k == thermometer_key(f64::from(tenth) / 10.0))
                .unwrap();
            assert!(band >= last);
            last = band;
        }
    }
}
