//! Failure classification and retry-hint extraction.
//!
//! Remote clients describe their own failures through [`Classify`]; the
//! executor never inspects concrete error types. Hint parsing is best-effort:
//! anything it cannot read degrades to "no hint".

use std::fmt;
use std::time::Duration;

/// Retry-relevant category of a remote failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Quota or throughput exhausted; retried after an extended wait.
    RateLimited,
    /// Known-temporary failure (timeouts, 5xx); retried with standard backoff.
    Transient,
    /// Anything else; still retried with standard backoff.
    Unclassified,
}

impl ErrorClass {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::RateLimited => "rate-limited",
            Self::Transient => "transient",
            Self::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implemented by remote-client error types the executor can retry.
pub trait Classify: fmt::Display {
    fn classify(&self) -> ErrorClass;

    /// Delay the service asked for out-of-band (for example `Retry-After`).
    fn suggested_delay(&self) -> Option<Duration> {
        None
    }
}

/// Classified snapshot of one failed attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorRecord {
    pub class: ErrorClass,
    pub message: String,
    pub suggested_delay: Option<Duration>,
}

impl ErrorRecord {
    /// Classify `err` and merge its out-of-band hint with any hint embedded
    /// in its message. The longer of the two wins.
    pub fn from_error<E: Classify + ?Sized>(err: &E) -> Self {
        let message = err.to_string();
        let parsed = extract_retry_delay(&message).map(Duration::from_secs);
        let suggested_delay = match (err.suggested_delay(), parsed) {
            (Some(header), Some(body)) => Some(header.max(body)),
            (header, body) => header.or(body),
        };
        Self {
            class: err.classify(),
            message,
            suggested_delay,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.class == ErrorClass::RateLimited
    }
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.message)
    }
}

/// Find a retry delay hint, in whole seconds, inside an error message.
///
/// Recognises the protobuf text form `retry_delay { seconds: 45 }` and the
/// JSON form `"retryDelay": "45s"` used by the REST surface of the same API.
pub fn extract_retry_delay(message: &str) -> Option<u64> {
    message
        .match_indices("retry_delay")
        .find_map(|(idx, label)| parse_text_hint(&message[idx + label.len()..]))
        .or_else(|| {
            message
                .match_indices("\"retryDelay\"")
                .find_map(|(idx, label)| parse_json_hint(&message[idx + label.len()..]))
        })
}

fn parse_text_hint(rest: &str) -> Option<u64> {
    let rest = rest.trim_start().strip_prefix('{')?;
    let rest = rest.trim_start().strip_prefix("seconds")?;
    let rest = rest.trim_start().strip_prefix(':')?;
    leading_integer(rest.trim_start())
}

fn parse_json_hint(rest: &str) -> Option<u64> {
    let rest = rest.trim_start().strip_prefix(':')?;
    let rest = rest.trim_start().strip_prefix('"')?;
    leading_integer(rest)
}

fn leading_integer(text: &str) -> Option<u64> {
    let end = text
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(text.len(), |(idx, _)| idx);
    text[..end].parse().ok()
}
