//! Human-relative timestamps for palette descriptions.

use chrono::{DateTime, Utc};

/// Render a published date relative to now, e.g. `"3h ago"`. A missing date
/// yields an empty string.
pub fn time_ago(published: Option<DateTime<Utc>>) -> String {
    relative_to(published, Utc::now())
}

/// Largest unit that is at least 1, checked years-first.
pub fn relative_to(published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(date) = published else {
        return String::new();
    };
    let elapsed = now.signed_duration_since(date);
    let minutes = elapsed.num_minutes().max(0);
    let hours = elapsed.num_hours().max(0);
    let days = elapsed.num_days().max(0);

    if days >= 365 {
        format!("{}y ago", days / 365)
    } else if days >= 30 {
        format!("{}mo ago", days / 30)
    } else if days >= 7 {
        format!("{}w ago", days / 7)
    } else if days >= 1 {
        format!("{}d ago", days)
    } else if hours >= 1 {
        format!("{}h ago", hours)
    } else if minutes >= 1 {
        format!("{}m ago", minutes)
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        "2026-08-30T12:00:00Z".parse().expect("timestamp")
    }

    #[test]
    fn missing_date_is_empty() {
        assert_eq!(relative_to(None, now()), "");
    }

    #[test]
    fn under_a_minute_is_just_now() {
        assert_eq!(relative_to(Some(now() - Duration::seconds(30)), now()), "just now");
    }

    #[test]
    fn picks_largest_unit() {
        let now = now();
        assert_eq!(relative_to(Some(now - Duration::minutes(5)), now), "5m ago");
        assert_eq!(relative_to(Some(now - Duration::hours(3)), now), "3h ago");
        assert_eq!(relative_to(Some(now - Duration::days(2)), now), "2d ago");
        assert_eq!(relative_to(Some(now - Duration::days(13)), now), "1w ago");
        assert_eq!(relative_to(Some(now - Duration::days(45)), now), "1mo ago");
        assert_eq!(relative_to(Some(now - Duration::days(400)), now), "1y ago");
    }

    #[test]
    fn weeks_floor_days_by_seven() {
        let now = now();
        assert_eq!(relative_to(Some(now - Duration::days(20)), now), "2w ago");
    }
}
