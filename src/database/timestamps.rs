use chrono::{DateTime, Utc};

/// Fixed-width UTC format; lexical order of stored values equals time order.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

pub fn to_db(value: DateTime<Utc>) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

pub fn from_db(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn now() -> String {
    to_db(Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn stored_values_sort_like_times() {
        let base = Utc.with_ymd_and_hms(2030, 1, 1, 9, 0, 0).unwrap();
        let earlier = to_db(base + Duration::milliseconds(5));
        let later = to_db(base + Duration::seconds(1));
        assert!(earlier < later);
        assert_eq!(earlier, "2030-01-01T09:00:00.005Z");
    }

    #[test]
    fn parses_back_what_it_writes() {
        let value = Utc.with_ymd_and_hms(2031, 6, 15, 18, 30, 0).unwrap();
        assert_eq!(from_db(&to_db(value)), Some(value));
        assert_eq!(from_db("not a date"), None);
    }
}
