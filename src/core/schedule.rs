//! Cron schedules for the PR image builder
//!
//! Workflow schedules use the classic 5-field form
//! (`minute hour day-of-month month day-of-week`, day-of-week 0-7 with Sunday
//! as 0 or 7). The `cron` crate evaluates the 7-field form with a leading
//! seconds field and a trailing year field, so expressions are translated
//! once at parse time. All evaluation happens in UTC.
//!
//! When both day-of-month and day-of-week are restricted, classic cron fires
//! if either matches while the `cron` crate requires both. Such expressions
//! become two schedules whose fire times are merged.

use crate::core::error::{ConfigError, PipelineError, PipelineResult};
use chrono::{DateTime, Duration, Timelike, Utc};
use std::str::FromStr;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A validated 5-field cron schedule
#[derive(Debug, Clone)]
pub struct CronSchedule {
  expression: String,
  schedules: Vec<cron::Schedule>,
}

impl CronSchedule {
  /// Parse a 5-field expression or a named shortcut (`@monthly`, `@daily`, ...)
  pub fn parse(expression: &str) -> PipelineResult<Self> {
    let expression = expression.trim();
    let invalid = |reason: String| {
      PipelineError::Config(ConfigError::InvalidSchedule {
        expression: expression.to_string(),
        reason,
      })
    };

    let five_field = match expression {
      "@yearly" | "@annually" => "0 0 1 1 *",
      "@monthly" => "0 0 1 * *",
      "@weekly" => "0 0 * * 0",
      "@daily" | "@midnight" => "0 0 * * *",
      "@hourly" => "0 * * * *",
      named if named.starts_with('@') => return Err(invalid("unknown named schedule".to_string())),
      other => other,
    };

    let fields: Vec<&str> = five_field.split_whitespace().collect();
    if fields.len() != 5 {
      return Err(invalid(format!("expected 5 fields, found {}", fields.len())));
    }

    let (minute, hour, day_of_month, month) = (fields[0], fields[1], fields[2], fields[3]);
    let day_of_week = translate_day_of_week(fields[4]).map_err(&invalid)?;

    let day_pairs = if is_unrestricted(day_of_month) || is_unrestricted(fields[4]) {
      vec![(day_of_month, day_of_week.as_str())]
    } else {
      vec![(day_of_month, "*"), ("*", day_of_week.as_str())]
    };

    let mut schedules = Vec::with_capacity(day_pairs.len());
    for (dom, dow) in day_pairs {
      let seven_field = format!("0 {} {} {} {} {} *", minute, hour, dom, month, dow);
      let schedule = cron::Schedule::from_str(&seven_field).map_err(|e| invalid(e.to_string()))?;
      schedules.push(schedule);
    }

    Ok(Self {
      expression: expression.to_string(),
      schedules,
    })
  }

  /// The expression as written
  pub fn expression(&self) -> &str {
    &self.expression
  }

  /// Next `count` fire times strictly after `after`
  pub fn upcoming(&self, after: DateTime<Utc>, count: usize) -> Vec<DateTime<Utc>> {
    let mut times: Vec<DateTime<Utc>> = self
      .schedules
      .iter()
      .flat_map(|schedule| schedule.after(&after).take(count))
      .collect();
    times.sort();
    times.dedup();
    times.truncate(count);
    times
  }

  /// Whether the schedule fires during the minute containing `at`
  pub fn fires_at(&self, at: DateTime<Utc>) -> bool {
    let Some(minute) = at.with_second(0).and_then(|t| t.with_nanosecond(0)) else {
      return false;
    };
    let just_before = minute - Duration::seconds(1);
    self
      .schedules
      .iter()
      .any(|schedule| schedule.after(&just_before).next() == Some(minute))
  }
}

/// `*`, `*/n` and `?` leave a day field unrestricted
fn is_unrestricted(field: &str) -> bool {
  field.starts_with('*') || field == "?"
}

/// Translate numeric day-of-week items (0-7, Sunday = 0 or 7) into the names
/// the `cron` crate expects. Numeric ranges and steps are expanded into an
/// explicit list; named items pass through unchanged.
fn translate_day_of_week(field: &str) -> Result<String, String> {
  let is_number = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
  let day = |s: &str| -> Result<usize, String> {
    let day: usize = s.parse().map_err(|_| format!("invalid day of week '{}'", s))?;
    if day > 7 {
      return Err(format!("day of week {} is outside 0-7", day));
    }
    Ok(day)
  };

  let mut items: Vec<String> = Vec::new();
  for item in field.split(',') {
    let (range, step) = match item.split_once('/') {
      Some((range, step)) => {
        let step: usize = step
          .parse()
          .ok()
          .filter(|s| *s > 0)
          .ok_or_else(|| format!("invalid day-of-week step '{}'", step))?;
        (range, Some(step))
      }
      None => (item, None),
    };

    let (first, last) = match range.split_once('-') {
      _ if range == "*" && step.is_none() => {
        items.push(item.to_string());
        continue;
      }
      _ if range == "*" => (0, 6),
      Some((lo, hi)) if is_number(lo) && is_number(hi) => (day(lo)?, day(hi)?),
      None if is_number(range) => {
        let first = day(range)?;
        (first, if step.is_some() { 6.max(first) } else { first })
      }
      _ => {
        items.push(item.to_string());
        continue;
      }
    };

    if first > last {
      return Err(format!("day-of-week range {} is reversed", range));
    }
    for day in (first..=last).step_by(step.unwrap_or(1)) {
      let name = DAY_NAMES[day % 7].to_string();
      if !items.contains(&name) {
        items.push(name);
      }
    }
  }
  Ok(items.join(","))
}
