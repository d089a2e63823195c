//! Per-user preferences: the day boundary and the locale.

use std::{fmt, str::FromStr};

use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
  #[default]
  En,
  Ru,
}

impl Locale {
  pub fn as_str(self) -> &'static str {
    match self {
      Locale::En => "en",
      Locale::Ru => "ru",
    }
  }
}

impl fmt::Display for Locale {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Locale {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "en" => Ok(Locale::En),
      "ru" => Ok(Locale::Ru),
      other => Err(Error::UnsupportedLocale(other.to_owned())),
    }
  }
}

/// Parse an `HH:MM` time of day.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(&format!("{raw}:00"), "%H:%M:%S")
    .map_err(|_| Error::InvalidTimeOfDay(raw.to_owned()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPreferences {
  pub owner:        String,
  /// Time of day (UTC) at which a new logging day begins.
  pub day_boundary: NaiveTime,
  pub locale:       Locale,
}

impl UserPreferences {
  /// Defaults for an owner who never set anything.
  pub fn defaults(owner: impl Into<String>) -> Self {
    Self { owner: owner.into(), day_boundary: NaiveTime::MIN, locale: Locale::default() }
  }

  /// The most recent day boundary at or before `now`.
  pub fn current_day_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = now.date_naive().and_time(self.day_boundary).and_utc();
    if today <= now { today } else { today - TimeDelta::days(1) }
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn locale_round_trip() {
    assert_eq!("ru".parse::<Locale>().unwrap(), Locale::Ru);
    assert_eq!(Locale::En.to_string(), "en");
    assert!(matches!("de".parse::<Locale>(), Err(Error::UnsupportedLocale(_))));
  }

  #[test]
  fn time_of_day_parsing() {
    assert_eq!(parse_time_of_day("03:00").unwrap(), NaiveTime::from_hms_opt(3, 0, 0).unwrap());
    assert_eq!(parse_time_of_day("23:59").unwrap(), NaiveTime::from_hms_opt(23, 59, 0).unwrap());
    assert!(parse_time_of_day("25:00").is_err());
    assert!(parse_time_of_day("noon").is_err());
    assert!(parse_time_of_day("03:00:00").is_err());
  }

  #[test]
  fn day_start_before_and_after_boundary() {
    let mut prefs = UserPreferences::defaults("alice");
    prefs.day_boundary = NaiveTime::from_hms_opt(3, 0, 0).unwrap();

    let late = Utc.with_ymd_and_hms(2024, 5, 10, 14, 0, 0).unwrap();
    assert_eq!(
      prefs.current_day_start(late),
      Utc.with_ymd_and_hms(2024, 5, 10, 3, 0, 0).unwrap()
    );

    let early = Utc.with_ymd_and_hms(2024, 5, 10, 1, 30, 0).unwrap();
    assert_eq!(
      prefs.current_day_start(early),
      Utc.with_ymd_and_hms(2024, 5, 9, 3, 0, 0).unwrap()
    );
  }

  #[test]
  fn default_boundary_is_midnight() {
    let prefs = UserPreferences::defaults("alice");
    let now = Utc.with_ymd_and_hms(2024, 5, 10, 0, 0, 0).unwrap();
    assert_eq!(prefs.current_day_start(now), now);
  }
}
