//! Error type for a single probe request

use std::time::Duration;

/// Error from one probe request.
///
/// Transport and timeout errors come from the HTTP client; anything else
/// that fails inside a single iteration is a runtime error.
#[derive(Debug)]
pub enum ProbeError {
    /// Network/HTTP level failure with a short category label
    Transport {
        kind: &'static str,
        message: String,
    },
    /// No complete response within the read timeout
    Timeout(Duration),
    /// Any other failure within one iteration
    Runtime(String),
}

impl std::fmt::Display for ProbeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport { message, .. } => write!(f, "{message}"),
            Self::Timeout(d) => write!(f, "no response within {}ms", d.as_millis()),
            Self::Runtime(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ProbeError {}

impl ProbeError {
    /// Create an error from a reqwest error.
    ///
    /// Builder errors (bad URL, invalid header) never reach the network and
    /// are reported as runtime errors.
    pub fn from_reqwest(e: &reqwest::Error) -> Self {
        if e.is_builder() {
            return Self::Runtime(error_chain(e));
        }
        let kind = if e.is_connect() {
            "connect"
        } else if e.is_timeout() {
            "timeout"
        } else if e.is_redirect() {
            "redirect"
        } else if e.is_decode() {
            "decode"
        } else if e.is_body() {
            "body"
        } else if e.is_request() {
            "request"
        } else {
            "other"
        };
        Self::Transport {
            kind,
            message: error_chain(e),
        }
    }

    /// Short label used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            Self::Transport { kind, .. } => *kind,
            Self::Timeout(_) => "timeout",
            Self::Runtime(_) => "runtime",
        }
    }

    /// Transport and timeout errors are the HTTP/network class
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout(_))
    }
}

/// reqwest's top-level message hides the root cause (e.g. "connection refused")
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut message = e.to_string();
    let mut source = e.source();
    while let Some(inner) = source {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = inner.source();
    }
    message
}
