use std::fmt;

use url::Url;

use super::FetcherError;

/// A request path relative to the fetcher's base endpoint.
///
/// Paths must start with a single `/`. A query string may follow the path.
///
/// ```rust
/// use abeg_fetch::ApiPath;
///
/// let path = ApiPath::try_from("/campaign/create/three")?;
/// assert_eq!(path.as_str(), "/campaign/create/three");
///
/// assert!(ApiPath::try_from("campaign").is_err());
/// # Ok::<(), abeg_fetch::FetcherError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath(String);

impl ApiPath {
    /// Returns the path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(in crate::client) fn join(&self, base: &Url) -> Result<Url, FetcherError> {
        let base = base.as_str().trim_end_matches('/');
        let url = format!("{base}{}", self.0).parse::<Url>()?;
        Ok(url)
    }
}

impl TryFrom<&str> for ApiPath {
    type Error = FetcherError;

    fn try_from(path: &str) -> Result<Self, Self::Error> {
        let reason = if !path.starts_with('/') {
            Some("must start with '/'")
        } else if path.starts_with("//") {
            Some("must not start with '//'")
        } else if path.chars().any(char::is_whitespace) {
            Some("must not contain whitespace")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(FetcherError::InvalidPath {
                path: path.to_string(),
                reason,
            }),
            None => Ok(Self(path.to_string())),
        }
    }
}

impl TryFrom<String> for ApiPath {
    type Error = FetcherError;

    fn try_from(path: String) -> Result<Self, Self::Error> {
        Self::try_from(path.as_str())
    }
}

impl TryFrom<&String> for ApiPath {
    type Error = FetcherError;

    fn try_from(path: &String) -> Result<Self, Self::Error> {
        Self::try_from(path.as_str())
    }
}

impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::relative("campaign", "must start with '/'")]
    #[case::empty("", "must start with '/'")]
    #[case::protocol_relative("//evil.test/steal", "must not start with '//'")]
    #[case::whitespace("/campaign/create three", "must not contain whitespace")]
    fn test_invalid_paths_are_rejected(#[case] path: &str, #[case] expected: &str) {
        let Err(FetcherError::InvalidPath { reason, .. }) = ApiPath::try_from(path) else {
            panic!("expected {path:?} to be rejected");
        };

        assert_eq!(reason, expected);
    }

    #[test]
    fn test_join_trims_base_trailing_slash() {
        let base = Url::parse("https://api.test/v1/").expect("valid url");
        let path = ApiPath::try_from("/campaign/create/one").expect("valid path");

        let url = path.join(&base).expect("should join");

        assert_eq!(url.as_str(), "https://api.test/v1/campaign/create/one");
    }

    #[test]
    fn test_join_keeps_query_string() {
        let base = Url::parse("https://api.test").expect("valid url");
        let path = ApiPath::try_from("/campaign?page=2").expect("valid path");

        let url = path.join(&base).expect("should join");

        assert_eq!(url.path(), "/campaign");
        assert_eq!(url.query(), Some("page=2"));
    }
}
