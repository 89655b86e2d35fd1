use rmcp::model::ErrorData;

#[derive(Debug, thiserror::Error)]
pub enum McpGithubOrgError {
    #[error("Invalid parameter: {0}")]
    InvalidParam(String),

    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single outbound GitHub call.
///
/// `context` names what was being fetched ("members", "issues") so the
/// message reads the same way for every endpoint.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("Failed to fetch {context}: {status} {body}")]
    Status {
        context: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to fetch {context}: malformed response ({reason})")]
    Malformed {
        context: &'static str,
        reason: String,
    },

    #[error("Failed to fetch {context}: {source}")]
    Transport {
        context: &'static str,
        #[source]
        source: octocrab::Error,
    },
}

impl UpstreamError {
    /// HTTP status of the failed response, if the call got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl McpGithubOrgError {
    pub fn to_mcp_error(&self) -> ErrorData {
        match self {
            McpGithubOrgError::InvalidParam(_) => ErrorData::invalid_params(self.to_string(), None),
            McpGithubOrgError::Upstream(_) | McpGithubOrgError::Other(_) => {
                ErrorData::internal_error(self.to_string(), None)
            }
        }
    }
}
