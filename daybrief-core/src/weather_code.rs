//! WMO weather code lookup.
//!
//! See: https://open-meteo.com/en/docs#weathervariables

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCodeEntry {
    pub description: &'static str,
    pub emoji: &'static str,
}

impl WeatherCodeEntry {
    const fn new(description: &'static str, emoji: &'static str) -> Self {
        Self { description, emoji }
    }
}

/// Returned for any code missing from [`TABLE`].
pub const UNKNOWN: WeatherCodeEntry = WeatherCodeEntry::new("unknown", "🌤️");

const TABLE: &[(i32, WeatherCodeEntry)] = &[
    (0, WeatherCodeEntry::new("Clear sky", "☀️")),
    (1, WeatherCodeEntry::new("Mainly clear", "🌤️")),
    (2, WeatherCodeEntry::new("Partly cloudy", "⛅")),
    (3, WeatherCodeEntry::new("Overcast", "☁️")),
    (45, WeatherCodeEntry::new("Fog", "🌫️")),
    (48, WeatherCodeEntry::new("Dense fog", "🌫️")),
    (51, WeatherCodeEntry::new("Light drizzle", "🌦️")),
    (53, WeatherCodeEntry::new("Moderate drizzle", "🌧️")),
    (55, WeatherCodeEntry::new("Dense drizzle", "🌧️")),
    (56, WeatherCodeEntry::new("Freezing drizzle", "🌧️")),
    (57, WeatherCodeEntry::new("Freezing drizzle", "🌧️")),
    (61, WeatherCodeEntry::new("Light rain", "🌦️")),
    (63, WeatherCodeEntry::new("Moderate rain", "🌧️")),
    (65, WeatherCodeEntry::new("Heavy rain", "🌧️")),
    (66, WeatherCodeEntry::new("Freezing rain", "🌧️")),
    (67, WeatherCodeEntry::new("Freezing rain", "🌧️")),
    (71, WeatherCodeEntry::new("Light snow", "❄️")),
    (73, WeatherCodeEntry::new("Moderate snow", "❄️")),
    (75, WeatherCodeEntry::new("Heavy snow", "❄️")),
    (77, WeatherCodeEntry::new("Snow grains", "❄️")),
    (80, WeatherCodeEntry::new("Rain showers", "🌦️")),
    (81, WeatherCodeEntry::new("Rain showers", "🌧️")),
    (82, WeatherCodeEntry::new("Violent rain showers", "🌧️")),
    (85, WeatherCodeEntry::new("Snow showers", "❄️")),
    (86, WeatherCodeEntry::new("Snow showers", "❄️")),
    (95, WeatherCodeEntry::new("Thunderstorm", "⛈️")),
    (96, WeatherCodeEntry::new("Thunderstorm with hail", "⛈️")),
    (99, WeatherCodeEntry::new("Thunderstorm with hail", "⛈️")),
];

/// Resolve a WMO code, falling back to [`UNKNOWN`].
pub fn lookup(code: i32) -> WeatherCodeEntry {
    TABLE
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, entry)| *entry)
        .unwrap_or(UNKNOWN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_resolve() {
        assert_eq!(lookup(0).description, "Clear sky");
        assert_eq!(lookup(61).description, "Light rain");
        assert_eq!(lookup(95).emoji, "⛈️");
    }

    #[test]
    fn unknown_codes_fall_back() {
        for code in [4, 50, 100, 999, -1] {
            let entry = lookup(code);
            assert_eq!(entry, UNKNOWN, "code {code}");
            assert_eq!(entry.description, "unknown");
        }
    }

    #[test]
    fn table_has_no_duplicate_codes() {
        let mut codes: Vec<_> = TABLE.iter().map(|(c, _)| *c).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), TABLE.len());
    }
}
