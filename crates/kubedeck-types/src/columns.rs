//! Table column derivations.
//!
//! Every function here is a pure projection of status fields so that a
//! refresh renders the same rows for the same resources (apart from ages).

use chrono::{DateTime, TimeDelta, Utc};

use crate::ContainerInfo;

/// `ready/total` container count, e.g. `2/3`
pub fn ready(containers: &[ContainerInfo]) -> String {
    let ready = containers.iter().filter(|c| c.ready).count();
    format!("{}/{}", ready, containers.len())
}

/// Sum of restart counts across containers
pub fn restarts(containers: &[ContainerInfo]) -> String {
    containers
        .iter()
        .map(|c| i64::from(c.restart_count))
        .sum::<i64>()
        .to_string()
}

/// Age of a resource relative to `now`
pub fn age(created: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match created {
        Some(created) => format_age(now - created),
        None => "?".to_string(),
    }
}

/// Greedy largest unit: days above 24h, hours above 1h, minutes above 1m,
/// seconds above 1s, `?` otherwise.
pub fn format_age(elapsed: TimeDelta) -> String {
    let secs = elapsed.num_milliseconds() as f64 / 1000.0;
    let hours = secs / 3600.0;
    let minutes = secs / 60.0;

    if hours > 24.0 {
        format!("{:.0}d", hours / 24.0)
    } else if hours > 1.0 {
        format!("{:.0}h", hours)
    } else if minutes > 1.0 {
        format!("{:.0}m", minutes)
    } else if secs > 1.0 {
        format!("{:.0}s", secs)
    } else {
        "?".to_string()
    }
}
