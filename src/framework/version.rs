//! API version numbers.

use std::fmt;
use std::str::FromStr;

/// A `major.minor` API version. Versions order by major, then minor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiVersion {
    pub major: i64,
    pub minor: i64,
}

impl ApiVersion {
    /// The version these bindings were written against.
    pub const LATEST: ApiVersion = ApiVersion::new(2, 21);

    pub const fn new(major: i64, minor: i64) -> Self {
        Self { major, minor }
    }

    /// Calls are wire compatible as long as the major version agrees.
    pub fn is_compatible_with(&self, other: &ApiVersion) -> bool {
        self.major == other.major
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid API version `{0}`")]
pub struct ParseApiVersionError(String);

impl FromStr for ApiVersion {
    type Err = ParseApiVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseApiVersionError(s.to_string());
        let (major, minor) = s.trim().split_once('.').ok_or_else(invalid)?;
        Ok(Self {
            major: major.parse().map_err(|_| invalid())?,
            minor: minor.parse().map_err(|_| invalid())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_orders() {
        let old: ApiVersion = "1.10".parse().unwrap();
        let new: ApiVersion = "2.2".parse().unwrap();
        assert!(old < new);
        assert_eq!(new.to_string(), "2.2");
        assert!(!old.is_compatible_with(&new));
        assert!(ApiVersion::new(2, 0).is_compatible_with(&ApiVersion::LATEST));
    }

    #[test]
    fn rejects_garbage() {
        assert!("two".parse::<ApiVersion>().is_err());
        assert!("2.x".parse::<ApiVersion>().is_err());
    }
}
