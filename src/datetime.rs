use chrono::{DateTime, Utc};

pub fn display_datetime(datetime: DateTime<Utc>) -> String {
    datetime
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
