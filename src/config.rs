use tracing::Level;

pub const API_URL: &str = match option_env!("CORRELATION_API_URL") {
    Some(url) => url,
    None => "http://localhost:9000",
};

/// Energy-metering device every machine is correlated against.
pub const ENERGY_DEVICE: &str = match option_env!("CORRELATION_ENERGY_DEVICE") {
    Some(device) => device,
    None => "SPPS-04",
};

const LOG_LEVEL: Option<&str> = option_env!("CORRELATION_LOG_LEVEL");

/// Wire names of the electrical parameters, with their display labels.
pub const ELECTRICAL_FIELDS: [(&str, &str); 3] = [
    ("apower", "power"),
    ("current", "current"),
    ("voltage", "voltage"),
];

pub fn log_level() -> Level {
    parse_log_level(LOG_LEVEL)
}

fn parse_log_level(level: Option<&str>) -> Level {
    level
        .and_then(|level| level.parse().ok())
        .unwrap_or(Level::INFO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_defaults_to_info() {
        assert_eq!(parse_log_level(None), Level::INFO);
        assert_eq!(parse_log_level(Some("loud")), Level::INFO);
    }

    #[test]
    fn log_level_accepts_tracing_names() {
        assert_eq!(parse_log_level(Some("debug")), Level::DEBUG);
        assert_eq!(parse_log_level(Some("WARN")), Level::WARN);
    }
}
