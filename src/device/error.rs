use std::fmt;
use std::time::Duration;

/// A poll that did not produce a snapshot. Always transient: the next
/// scheduled poll tries again.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection refused, DNS failure, reset while reading the body...
    Transport(String),
    /// No complete response within the request bound
    Timeout(Duration),
    /// Anything other than 200 OK
    Status(u16),
    /// Body is not JSON
    Decode(String),
    /// Body is JSON but not an object of records
    NotAnObject,
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Transport(e) => write!(f, "request failed: {e}"),
            FetchError::Timeout(after) => write!(f, "no response within {}s", after.as_secs()),
            FetchError::Status(code) => write!(f, "HTTP {code}"),
            FetchError::Decode(e) => write!(f, "invalid JSON body: {e}"),
            FetchError::NotAnObject => write!(f, "JSON body is not an object"),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Transport(err.to_string())
    }
}
