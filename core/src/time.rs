//! Time related utils.

/// DateTime in UTC.
pub type DateTime = chrono::DateTime<chrono::Utc>;

/// Create a new DateTime with the current UTC time.
pub fn now() -> DateTime {
    chrono::Utc::now()
}

/// Format a DateTime as whole seconds since the Unix epoch.
pub fn format_unix_timestamp(t: DateTime) -> String {
    t.timestamp().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_unix_timestamp() {
        let t = chrono::DateTime::from_timestamp(1234567890, 0).unwrap();
        assert_eq!(format_unix_timestamp(t), "1234567890");
    }
}
