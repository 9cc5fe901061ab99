use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TimeExprError {
    #[error("invalid duration '{0}': {1}")]
    Duration(String, String),
    #[error("invalid time '{0}': {1}")]
    Time(String, String),
}

/// When a scan starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeExpr {
    /// Offset from the moment the request is made.
    Relative(Duration),
    Absolute(DateTime<Utc>),
}

impl Default for TimeExpr {
    fn default() -> Self {
        TimeExpr::Relative(Duration::zero())
    }
}

impl TimeExpr {
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeExpr::Relative(d) => now + *d,
            TimeExpr::Absolute(dt) => *dt,
        }
    }

    /// Accepts `now`, `T+10m`, `T-1h`, RFC3339, or RFC3339 with an offset
    /// such as `2026-01-12T10:00:00Z + 10s`.
    pub fn parse(s: &str) -> Result<Self, TimeExprError> {
        let s = s.trim();

        if s.eq_ignore_ascii_case("now") {
            return Ok(TimeExpr::default());
        }

        // Relative: T+10s, T-5m
        if let Some(rest) = s.strip_prefix(['t', 'T']) {
            let (neg, rest) = split_sign(rest);
            let dur = parse_duration(rest)?;
            return Ok(TimeExpr::Relative(if neg { -dur } else { dur }));
        }

        // Absolute with offset
        if let Some(idx) = s.rfind(['+', '-']) {
            if idx > 10 {
                if let Ok(base) = DateTime::parse_from_rfc3339(s[..idx].trim()) {
                    let (neg, rest) = split_sign(&s[idx..]);
                    let dur = parse_duration(rest)?;
                    return Ok(TimeExpr::Absolute(
                        base.with_timezone(&Utc) + if neg { -dur } else { dur },
                    ));
                }
            }
        }

        DateTime::parse_from_rfc3339(s)
            .map(|dt| TimeExpr::Absolute(dt.with_timezone(&Utc)))
            .map_err(|e| TimeExprError::Time(s.to_string(), e.to_string()))
    }
}

impl<'de> Deserialize<'de> for TimeExpr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TimeExpr::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    match s.strip_prefix('-') {
        Some(r) => (true, r),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    }
}

fn parse_duration(s: &str) -> Result<Duration, TimeExprError> {
    let invalid = |e: String| TimeExprError::Duration(s.trim().to_string(), e);
    let std = humantime::parse_duration(s.trim()).map_err(|e| invalid(e.to_string()))?;
    Duration::from_std(std).map_err(|e| invalid(e.to_string()))
}
