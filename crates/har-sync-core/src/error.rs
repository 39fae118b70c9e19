use thiserror::Error;

/// Normalized error taxonomy for remote storage operations.
///
/// Adapters translate backend-specific status codes into these variants;
/// a 404 on read, list, or delete is never an error (it becomes an absent
/// result, an empty listing, or a silent success).
#[derive(Debug, Error)]
pub enum SyncError {
    /// An adapter operation was attempted before `initialize`.
    #[error("remote storage client is not initialized")]
    NotInitialized,

    /// A sync operation was requested while no backend is configured.
    #[error("no sync backend is configured")]
    NotConfigured,

    /// A non-success backend response or a network-level failure.
    /// `status` is `None` when the request never produced a response.
    #[error("remote request failed{}: {}", status_suffix(.status), .description)]
    Transport {
        status: Option<u16>,
        description: String,
    },

    /// A structured response body could not be parsed.
    #[error("malformed remote response: {0}")]
    Serialization(String),

    /// The configuration map is missing or malforms a required key.
    /// Unlike deferred provisioning failures, this is a hard error.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The operation observed the cancellation signal.
    #[error("operation cancelled")]
    Cancelled,
}

impl SyncError {
    /// Transport error for a response with a known status code.
    pub fn status(status: impl Into<u16>, description: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status.into()),
            description: description.into(),
        }
    }

    /// Transport error for a failure without a response (DNS, timeout, TLS).
    pub fn network(description: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            description: description.into(),
        }
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" with status {code}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_display_includes_status() {
        let err = SyncError::status(502u16, "bad gateway");
        assert_eq!(
            err.to_string(),
            "remote request failed with status 502: bad gateway"
        );
    }

    #[test]
    fn network_display_omits_status() {
        let err = SyncError::network("connection refused");
        assert_eq!(err.to_string(), "remote request failed: connection refused");
    }
}
