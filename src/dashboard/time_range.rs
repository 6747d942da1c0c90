use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};

const MINUTE: u64 = 60;
const HOUR: u64 = 60 * MINUTE;
const DAY: u64 = 24 * HOUR;

/// One end of the analyzed window, as understood by the service (Flux range syntax).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    Now,
    Ago(Duration),
}

impl TimeBound {
    /// Accepts `now()` or a negative duration such as `-1h` or `-90m`.
    pub fn parse(expression: &str) -> Result<Self> {
        let expression = expression.trim();
        if expression == "now()" {
            return Ok(Self::Now);
        }

        let Some(duration) = expression.strip_prefix('-') else {
            bail!("time bound must be `now()` or a negative duration, got `{expression}`");
        };

        let duration = humantime::parse_duration(duration)
            .with_context(|| format!("invalid time bound `{expression}`"))?;

        Ok(Self::Ago(duration))
    }

    pub fn to_flux(self) -> String {
        match self {
            Self::Now => "now()".to_string(),
            Self::Ago(duration) => format!("-{}", flux_duration(duration)),
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Now => "now".to_string(),
            Self::Ago(duration) => format!("{} ago", humantime::format_duration(duration)),
        }
    }

    pub fn resolve(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::Now => now,
            Self::Ago(duration) => chrono::Duration::from_std(duration)
                .ok()
                .and_then(|duration| now.checked_sub_signed(duration))
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }

    fn offset(self) -> Duration {
        match self {
            Self::Now => Duration::ZERO,
            Self::Ago(duration) => duration,
        }
    }
}

/// Largest whole unit Flux understands, so `-24h` goes out as `-1d`.
fn flux_duration(duration: Duration) -> String {
    if duration.subsec_nanos() != 0 {
        return format!("{}ms", duration.as_millis());
    }

    match duration.as_secs() {
        0 => "0s".to_string(),
        secs if secs % DAY == 0 => format!("{}d", secs / DAY),
        secs if secs % HOUR == 0 => format!("{}h", secs / HOUR),
        secs if secs % MINUTE == 0 => format!("{}m", secs / MINUTE),
        secs => format!("{secs}s"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub start: TimeBound,
    pub stop: TimeBound,
}

impl Default for TimeRange {
    fn default() -> Self {
        Self {
            start: TimeBound::Ago(Duration::from_secs(HOUR)),
            stop: TimeBound::Now,
        }
    }
}

impl TimeRange {
    pub fn is_ordered(self) -> bool {
        self.start.offset() > self.stop.offset()
    }

    pub fn window(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        (self.start.resolve(now), self.stop.resolve(now))
    }
}

pub fn start_presets() -> Vec<TimeBound> {
    [15 * MINUTE, HOUR, 6 * HOUR, 12 * HOUR, DAY, 7 * DAY]
        .into_iter()
        .map(|secs| TimeBound::Ago(Duration::from_secs(secs)))
        .collect()
}

pub fn stop_presets() -> Vec<TimeBound> {
    let mut presets = vec![TimeBound::Now];
    presets.extend(
        [5 * MINUTE, 15 * MINUTE, HOUR]
            .into_iter()
            .map(|secs| TimeBound::Ago(Duration::from_secs(secs))),
    );
    presets
}
