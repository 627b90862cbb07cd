use serde::Deserialize;
use serde::de::IntoDeserializer;
use serde::de::value::{Error as ValueError, StrDeserializer};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid --set format: '{0}'. Expected KEY=VALUE.")]
    InvalidAssignment(String),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },

    #[error("List for {0} cannot be empty.")]
    EmptyList(String),
}

/// Splits `key=value` at the first `=`, trimming both sides.
pub fn parse_assignment(pair: &str) -> Result<(&str, &str), ParseError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim(), value.trim())),
        _ => Err(ParseError::InvalidAssignment(pair.to_string())),
    }
}

pub fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parses a kebab-case keyword such as `alpha-carbon` into the enum it names.
pub fn parse_keyword<T>(key: &str, value: &str) -> Result<T, ParseError>
where
    T: for<'de> Deserialize<'de>,
{
    let deserializer: StrDeserializer<'_, ValueError> = value.into_deserializer();
    T::deserialize(deserializer).map_err(|_| ParseError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Parses a comma-separated list such as `2,3,4`.
pub fn parse_list<T: FromStr>(key: &str, value: &str) -> Result<Vec<T>, ParseError> {
    let items = value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| parse_value(key, item))
        .collect::<Result<Vec<T>, _>>()?;
    if items.is_empty() {
        return Err(ParseError::EmptyList(key.to_string()));
    }
    Ok(items)
}

pub fn parse_seconds(key: &str, value: &str) -> Result<Duration, ParseError> {
    parse_value::<u64>(key, value).map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assignment_splits_at_first_equals_sign() {
        assert_eq!(
            parse_assignment("search.args=--flag=1").unwrap(),
            ("search.args", "--flag=1")
        );
        assert_eq!(
            parse_assignment(" sweep.timeout-secs = 60 ").unwrap(),
            ("sweep.timeout-secs", "60")
        );
    }

    #[test]
    fn parse_assignment_rejects_missing_key_or_separator() {
        assert!(matches!(
            parse_assignment("sweep.timeout-secs"),
            Err(ParseError::InvalidAssignment(_))
        ));
        assert!(matches!(
            parse_assignment("=5"),
            Err(ParseError::InvalidAssignment(_))
        ));
    }

    #[test]
    fn parse_list_reads_comma_separated_values() {
        let bins: Vec<u32> = parse_list("bins", "2, 3,4,").unwrap();
        assert_eq!(bins, vec![2, 3, 4]);
    }

    #[test]
    fn parse_list_reports_offending_key_and_value() {
        let err = parse_list::<u32>("bins", "2,x").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidValue {
                key: "bins".to_string(),
                value: "x".to_string()
            }
        );
        assert_eq!(
            parse_list::<u32>("bins", " , ").unwrap_err(),
            ParseError::EmptyList("bins".to_string())
        );
    }

    #[test]
    fn parse_keyword_uses_serde_names() {
        use fitbench::core::utils::geometry::ReferencePoint;

        let reference: ReferencePoint = parse_keyword("k", "alpha-carbon").unwrap();
        assert_eq!(reference, ReferencePoint::AlphaCarbon);
        assert!(parse_keyword::<ReferencePoint>("k", "AlphaCarbon").is_err());
    }

    #[test]
    fn parse_seconds_builds_duration() {
        assert_eq!(parse_seconds("t", "90").unwrap(), Duration::from_secs(90));
        assert!(parse_seconds("t", "-1").is_err());
    }
}
