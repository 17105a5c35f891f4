//! `image-pipeline schedule` - when does the PR image builder run on its own?

use crate::core::context::PipelineContext;
use crate::core::error::PipelineResult;
use crate::core::schedule::CronSchedule;
use chrono::{DateTime, Utc};

/// Run the schedule command
///
/// With `at`, report whether the schedule fires during that minute; otherwise
/// list the next `count` fire times after `after` (default: now).
pub fn run_schedule(
  ctx: &PipelineContext,
  count: usize,
  after: Option<String>,
  at: Option<String>,
  json: bool,
) -> PipelineResult<()> {
  let schedule = CronSchedule::parse(&ctx.config.pull_request.schedule)?;

  if let Some(at) = at {
    let instant = parse_instant(&at)?;
    let fires = schedule.fires_at(instant);
    if json {
      println!(
        "{}",
        serde_json::json!({ "schedule": schedule.expression(), "at": instant.to_rfc3339(), "fires": fires })
      );
    } else if fires {
      println!("✅ '{}' fires at {}", schedule.expression(), instant.to_rfc3339());
    } else {
      println!("⏸️  '{}' does not fire at {}", schedule.expression(), instant.to_rfc3339());
    }
    return Ok(());
  }

  let after = match after {
    Some(after) => parse_instant(&after)?,
    None => Utc::now(),
  };
  let upcoming = schedule.upcoming(after, count);

  if json {
    let times: Vec<String> = upcoming.iter().map(|t| t.to_rfc3339()).collect();
    println!(
      "{}",
      serde_json::to_string_pretty(&serde_json::json!({ "schedule": schedule.expression(), "upcoming": times }))?
    );
  } else {
    println!("🗓️  Schedule '{}' (UTC)", schedule.expression());
    for time in &upcoming {
      println!("   • {}", time.format("%Y-%m-%d %H:%M"));
    }
  }

  Ok(())
}

fn parse_instant(value: &str) -> PipelineResult<DateTime<Utc>> {
  Ok(DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc))
}
