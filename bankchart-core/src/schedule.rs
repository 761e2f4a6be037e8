//! Refresh guard: only weekdays, only after the local close.

use crate::config::ScheduleSettings;
use chrono::{DateTime, Datelike, FixedOffset, Offset, Timelike, Utc, Weekday};

/// Whether a refresh should proceed at a given instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleDecision {
    Run,
    Skip(String),
}

/// Decide whether to refresh at `now`.
///
/// Local time is `now` shifted by `settings.utc_offset_hours`. Saturdays,
/// Sundays and any time before `run_after_hour` local are skipped.
pub fn check_schedule(now: DateTime<Utc>, settings: &ScheduleSettings) -> ScheduleDecision {
    let offset = FixedOffset::east_opt(settings.utc_offset_hours * 3600).unwrap_or(Utc.fix());
    let local = now.with_timezone(&offset);

    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return ScheduleDecision::Skip("Weekend detected (Sat/Sun). Skipping refresh.".into());
    }
    if local.hour() < settings.run_after_hour {
        return ScheduleDecision::Skip(format!(
            "It is not yet {:02}:00 local time (UTC{offset}). Skipping refresh.",
            settings.run_after_hour
        ));
    }
    ScheduleDecision::Run
}
