use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// A place the briefing reports on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self { name: name.into(), latitude, longitude }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub wind_speed_kmh: f64,
    pub weather_code: i32,
    /// Observation time in the forecast's local timezone.
    pub observed_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlySample {
    pub time: NaiveDateTime,
    pub temperature_c: f64,
    pub weather_code: i32,
}

/// Fixed points of the day that get a forecast line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DaySlot {
    Morning,
    Noon,
    Evening,
}

impl DaySlot {
    pub const fn all() -> &'static [DaySlot] {
        &[DaySlot::Morning, DaySlot::Noon, DaySlot::Evening]
    }

    pub const fn hour(self) -> u32 {
        match self {
            DaySlot::Morning => 8,
            DaySlot::Noon => 12,
            DaySlot::Evening => 18,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DaySlot::Morning => "Morning",
            DaySlot::Noon => "Noon",
            DaySlot::Evening => "Evening",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            DaySlot::Morning => "🌅",
            DaySlot::Noon => "☀️",
            DaySlot::Evening => "🌆",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SlotForecast {
    pub slot: DaySlot,
    pub sample: HourlySample,
}

/// Everything the briefing shows for one city.
#[derive(Debug, Clone, PartialEq)]
pub struct CityWeather {
    pub current: CurrentConditions,
    /// Resolved slots, always in `DaySlot` order.
    pub forecast: Vec<SlotForecast>,
}

/// Picks the first sample for each [`DaySlot`] on `day`.
///
/// Samples from other dates are ignored, so a multi-day or unordered series
/// cannot leak tomorrow's 08:00 into today's morning line. Slots without a
/// matching sample are left out.
pub fn select_slots(day: NaiveDate, samples: &[HourlySample]) -> Vec<SlotForecast> {
    let mut found: [Option<&HourlySample>; 3] = [None, None, None];

    for sample in samples.iter().filter(|s| s.time.date() == day) {
        for (idx, slot) in DaySlot::all().iter().enumerate() {
            if found[idx].is_none() && sample.time.hour() == slot.hour() {
                found[idx] = Some(sample);
            }
        }
    }

    DaySlot::all()
        .iter()
        .zip(found)
        .filter_map(|(slot, sample)| {
            sample.map(|s| SlotForecast { slot: *slot, sample: s.clone() })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid test timestamp")
    }

    fn sample(day: u32, hour: u32, temp: f64) -> HourlySample {
        HourlySample { time: at(day, hour), temperature_c: temp, weather_code: 0 }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
    }

    fn full_day() -> Vec<HourlySample> {
        (0..24).map(|h| sample(17, h, f64::from(h))).collect()
    }

    #[test]
    fn picks_all_three_slots_in_order() {
        let slots = select_slots(today(), &full_day());

        let picked: Vec<_> = slots.iter().map(|s| (s.slot, s.sample.temperature_c)).collect();
        assert_eq!(
            picked,
            vec![(DaySlot::Morning, 8.0), (DaySlot::Noon, 12.0), (DaySlot::Evening, 18.0)]
        );
    }

    #[test]
    fn missing_slot_is_omitted_and_order_kept() {
        let samples: Vec<_> = full_day().into_iter().filter(|s| s.time.hour() != 12).collect();

        let slots = select_slots(today(), &samples);

        let picked: Vec<_> = slots.iter().map(|s| s.slot).collect();
        assert_eq!(picked, vec![DaySlot::Morning, DaySlot::Evening]);
    }

    #[test]
    fn first_duplicate_hour_wins() {
        let samples = vec![sample(17, 8, 21.0), sample(17, 8, 30.0), sample(17, 12, 25.0)];

        let first = select_slots(today(), &samples);
        let again = select_slots(today(), &samples);

        assert_eq!(first[0].sample.temperature_c, 21.0);
        assert_eq!(first, again);
    }

    #[test]
    fn other_days_are_ignored() {
        let samples = vec![sample(18, 8, 5.0), sample(17, 18, 19.0), sample(17, 8, 14.0)];

        let slots = select_slots(today(), &samples);

        let picked: Vec<_> = slots.iter().map(|s| (s.slot, s.sample.temperature_c)).collect();
        assert_eq!(picked, vec![(DaySlot::Morning, 14.0), (DaySlot::Evening, 19.0)]);
    }

    #[test]
    fn empty_series_yields_no_slots() {
        assert!(select_slots(today(), &[]).is_empty());
    }
}
