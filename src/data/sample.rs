//! Synthetic daily input generation.
//!
//! Produces a plausible household series (seasonal temperature, weekday
//! occupancy, solar tied to irradiance) and injects the defects the cleaning
//! stages exist for: negative readings, empty cells and consumption spikes.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;
use tracing::info;

use crate::domain::{DayRecord, Observed, Weather};
use crate::error::AppError;

/// Consumption at 18 °C on an average occupied day, kWh.
const BASE_CONSUMPTION: f64 = 32.0;
/// Extra kWh per degree away from the comfort temperature.
const HVAC_KWH_PER_DEGREE: f64 = 1.4;
const COMFORT_TEMPERATURE: f64 = 18.0;
/// kWh of solar per kWh/m² of irradiance.
const PANEL_YIELD: f64 = 2.2;
/// Spikes multiply the day's consumption by this.
const SPIKE_FACTOR: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct SampleConfig {
    pub days: usize,
    pub seed: u64,
    pub start: NaiveDate,
    /// Probability that a day's consumption is written negative.
    pub negative_rate: f64,
    /// Probability that a day's consumption or solar cell is left empty.
    pub missing_rate: f64,
    /// Probability that a day's consumption is a spike.
    pub spike_rate: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            days: 90,
            seed: 42,
            start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            negative_rate: 0.03,
            missing_rate: 0.03,
            spike_rate: 0.02,
        }
    }
}

pub fn generate_sample(config: &SampleConfig) -> Result<Vec<DayRecord>, AppError> {
    if config.days == 0 {
        return Err(AppError::input("Sample day count must be > 0."));
    }
    let rates = [config.negative_rate, config.missing_rate, config.spike_rate];
    if rates.iter().any(|p| !(0.0..=1.0).contains(p)) {
        return Err(AppError::input("Defect rates must be within [0, 1]."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::output(format!("Noise distribution error: {e}")))?;

    let mut records = Vec::with_capacity(config.days);
    for i in 0..config.days {
        let date = config.start + Duration::days(i as i64);
        let mut r = clean_day(&mut rng, &noise, i as u32 + 1, date);
        inject_defects(&mut rng, &mut r, config);
        records.push(r);
    }

    info!(
        days = config.days,
        seed = config.seed,
        missing = records.iter().filter(|r| r.observed.consumption.is_none()).count(),
        "sample generated"
    );
    Ok(records)
}

fn clean_day(rng: &mut StdRng, noise: &Normal<f64>, day: u32, date: NaiveDate) -> DayRecord {
    // Day of year as a phase; coldest in mid-July (southern hemisphere).
    let phase = f64::from(date.ordinal0()) / 365.25 * std::f64::consts::TAU;
    let temperature = 22.0 + 6.0 * phase.cos() + 1.5 * noise.sample(rng);
    let humidity = (65.0 - 1.2 * (temperature - 22.0) + 6.0 * noise.sample(rng)).clamp(20.0, 100.0);
    let irradiance = (4.5 + 1.5 * phase.cos() + 0.8 * noise.sample(rng)).max(0.0);
    let wind = (3.0 + 1.2 * noise.sample(rng)).max(0.0);

    let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
    let is_holiday = !weekend && rng.gen_bool(0.03);
    let is_workday = !weekend;
    let occupancy = if is_workday && !is_holiday {
        rng.gen_range(0.35..0.6)
    } else {
        rng.gen_range(0.75..1.0)
    };
    let peak_tariff = if is_workday { 0.92 } else { 0.61 };

    let hvac = HVAC_KWH_PER_DEGREE * (temperature - COMFORT_TEMPERATURE).abs();
    let consumption = (BASE_CONSUMPTION * (0.6 + occupancy) + hvac + 2.0 * noise.sample(rng)).max(1.0);
    let solar_generation = (PANEL_YIELD * irradiance + 0.5 * noise.sample(rng)).max(0.0);
    let ev_load = if rng.r#gen::<f64>() < 0.3 {
        rng.gen_range(6.0..14.0)
    } else {
        0.0
    };
    let grid_import = (consumption + ev_load - solar_generation).max(0.0);

    DayRecord {
        day,
        date: date.format("%Y-%m-%d").to_string(),
        weather: Weather {
            temperature,
            humidity,
            irradiance,
            wind,
        },
        occupancy,
        is_workday,
        is_holiday,
        peak_tariff,
        consumption,
        solar_generation,
        ev_load,
        grid_import,
        observed: Observed {
            consumption: Some(consumption),
            solar_generation: Some(solar_generation),
        },
        ..DayRecord::default()
    }
}

fn inject_defects(rng: &mut StdRng, r: &mut DayRecord, config: &SampleConfig) {
    let roll: f64 = rng.r#gen();
    let consumption = if roll < config.missing_rate {
        None
    } else if roll < config.missing_rate + config.negative_rate {
        Some(-r.consumption * rng.gen_range(0.05..0.5))
    } else if roll < config.missing_rate + config.negative_rate + config.spike_rate {
        Some(r.consumption * SPIKE_FACTOR)
    } else {
        Some(r.consumption)
    };
    r.observed.consumption = consumption;
    r.consumption = consumption.unwrap_or(0.0);

    if rng.gen_bool(config.missing_rate) {
        r.observed.solar_generation = None;
        r.solar_generation = 0.0;
    }
}
