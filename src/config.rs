//! Configuration read once at startup.

use crate::error::ConfigError;

/// Checklist dimensions, read from the environment at startup.
///
/// Missing or non-numeric values are a fatal startup error, so everything
/// downstream can assume both counts are at least 1.
#[derive(Debug, Clone, Copy)]
pub struct ChecklistConfig {
    /// Number of selectable locations, rendered as "Location 1"…"Location K".
    pub locations: usize,
    /// Number of checklist entries per pass.
    pub entries: usize,
}

impl ChecklistConfig {
    /// Read `LOCATIONS_NUM` and `CHECK_LISTS_NUM` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            locations: read_count("LOCATIONS_NUM")?,
            entries: read_count("CHECK_LISTS_NUM")?,
        })
    }

    /// Canonical location labels offered to the user.
    pub fn location_labels(&self) -> Vec<String> {
        (1..=self.locations)
            .map(|i| format!("Location {i}"))
            .collect()
    }
}

fn read_count(key: &str) -> Result<usize, ConfigError> {
    let raw = std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))?;
    parse_count(key, &raw)
}

fn parse_count(key: &str, raw: &str) -> Result<usize, ConfigError> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n),
        Ok(n) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a positive count, got {n}"),
        }),
        Err(e) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_count_accepts_positive_integers() {
        assert_eq!(parse_count("CHECK_LISTS_NUM", "5").unwrap(), 5);
        assert_eq!(parse_count("CHECK_LISTS_NUM", " 12 ").unwrap(), 12);
        assert_eq!(parse_count("LOCATIONS_NUM", "1").unwrap(), 1);
    }

    #[test]
    fn parse_count_rejects_zero() {
        let err = parse_count("CHECK_LISTS_NUM", "0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn parse_count_rejects_garbage() {
        assert!(parse_count("LOCATIONS_NUM", "three").is_err());
        assert!(parse_count("LOCATIONS_NUM", "").is_err());
        assert!(parse_count("LOCATIONS_NUM", "-2").is_err());
        assert!(parse_count("LOCATIONS_NUM", "4.5").is_err());
    }

    #[test]
    fn location_labels_are_canonical() {
        let config = ChecklistConfig {
            locations: 3,
            entries: 2,
        };
        assert_eq!(
            config.location_labels(),
            vec!["Location 1", "Location 2", "Location 3"]
        );
    }
}
