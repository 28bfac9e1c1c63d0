//! Forecast run configuration and cadence-based date expansion.

use core::str::FromStr;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// Sampling rule restricting which dates in the horizon receive a forecast.
///
/// Unknown values are kept verbatim (`Unrecognized`) and match no dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cadence {
    Daily,
    Weekly,
    DayOfWeek,
    Monthly,
    DayOfMonth,
    Unrecognized(String),
}

impl Cadence {
    pub fn as_str(&self) -> &str {
        match self {
            Cadence::Daily => "daily",
            Cadence::Weekly => "weekly",
            Cadence::DayOfWeek => "dayOfWeek",
            Cadence::Monthly => "monthly",
            Cadence::DayOfMonth => "dayOfMonth",
            Cadence::Unrecognized(s) => s,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Cadence::Unrecognized(_))
    }
}

impl From<String> for Cadence {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" | "diaria" | "diária" => Cadence::Daily,
            "weekly" | "semanal" => Cadence::Weekly,
            "dayofweek" | "day_of_week" => Cadence::DayOfWeek,
            "monthly" | "mensal" => Cadence::Monthly,
            "dayofmonth" | "day_of_month" => Cadence::DayOfMonth,
            _ => Cadence::Unrecognized(value),
        }
    }
}

impl From<Cadence> for String {
    fn from(value: Cadence) -> Self {
        value.as_str().to_string()
    }
}

impl FromStr for Cadence {
    type Err = core::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Cadence::from(s.to_string()))
    }
}

impl core::fmt::Display for Cadence {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_cadence() -> Cadence {
    Cadence::Daily
}

fn default_horizon() -> u32 {
    30
}

fn default_include_promotions() -> bool {
    true
}

/// The active forecast configuration (one current config at a time).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub start_date: NaiveDate,
    #[serde(default = "default_cadence", alias = "frequencia")]
    pub cadence: Cadence,
    /// Weekday for weekly cadence: an English or Portuguese name (`"monday"`,
    /// `"tue"`, `"sexta"`) or `0..=6` with Monday = 0. Unset or unmapped
    /// falls back to Monday.
    #[serde(default, alias = "dia_semana")]
    pub day_of_week: Option<String>,
    /// Day of month for monthly cadence. Unset or outside `1..=31` matches no dates.
    #[serde(default, alias = "dia_mes")]
    pub day_of_month: Option<u32>,
    /// Number of calendar days from `start_date`.
    #[serde(default = "default_horizon", alias = "forecast_horizon")]
    pub horizon_days: u32,
    #[serde(default = "default_include_promotions")]
    pub include_promotions: bool,
}

impl ForecastConfig {
    pub fn daily(start_date: NaiveDate, horizon_days: u32) -> Self {
        Self {
            start_date,
            cadence: Cadence::Daily,
            day_of_week: None,
            day_of_month: None,
            horizon_days,
            include_promotions: true,
        }
    }

    pub fn with_cadence(mut self, cadence: Cadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn with_day_of_week(mut self, day: impl Into<String>) -> Self {
        self.day_of_week = Some(day.into());
        self
    }

    pub fn with_day_of_month(mut self, day: u32) -> Self {
        self.day_of_month = Some(day);
        self
    }

    pub fn with_promotions(mut self, include: bool) -> Self {
        self.include_promotions = include;
        self
    }

    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.horizon_days == 0 {
            return Err(ForecastError::InvalidConfig(
                "horizon_days must be a positive number of days".to_string(),
            ));
        }
        if let Some(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(ForecastError::InvalidConfig(format!(
                    "day_of_month must be within 1..=31 (got {day})"
                )));
            }
        }
        Ok(())
    }

    /// Resolved weekday for weekly cadence.
    pub fn weekday(&self) -> Weekday {
        self.day_of_week
            .as_deref()
            .and_then(parse_weekday)
            .unwrap_or(Weekday::Mon)
    }

    /// Dates in `[start_date, start_date + horizon_days)` admitted by the cadence.
    pub fn forecast_dates(&self) -> Vec<NaiveDate> {
        let weekday = self.weekday();
        (0..u64::from(self.horizon_days))
            .map_while(|offset| self.start_date.checked_add_days(Days::new(offset)))
            .filter(|date| match &self.cadence {
                Cadence::Daily => true,
                Cadence::Weekly | Cadence::DayOfWeek => date.weekday() == weekday,
                Cadence::Monthly | Cadence::DayOfMonth => {
                    self.day_of_month.is_some_and(|d| date.day() == d)
                }
                Cadence::Unrecognized(_) => false,
            })
            .collect()
    }
}

/// Weekday from a name/abbreviation or a Monday = 0 index.
///
/// Portuguese names (`segunda` .. `domingo`, with or without accents or the
/// `-feira` suffix) are accepted alongside chrono's English ones.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    let raw = raw.trim();
    if let Ok(index) = raw.parse::<u8>() {
        return Weekday::try_from(index).ok();
    }
    if let Ok(day) = raw.parse::<Weekday>() {
        return Some(day);
    }
    let lower = raw.to_lowercase();
    match lower.strip_suffix("-feira").unwrap_or(lower.as_str()) {
        "segunda" => Some(Weekday::Mon),
        "terca" | "terça" => Some(Weekday::Tue),
        "quarta" => Some(Weekday::Wed),
        "quinta" => Some(Weekday::Thu),
        "sexta" => Some(Weekday::Fri),
        "sabado" | "sábado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}
