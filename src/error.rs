// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client error types with human-readable messages.

/// Error type for every client, session, and auth operation.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status; `message` is what the server said, or a
    /// per-operation default when it said nothing useful.
    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("{0}")]
    Validation(String),

    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),

    #[error("No registration in progress")]
    NoPendingRegistration,

    #[error("Another authentication request is already in progress")]
    Busy,

    #[error("Authentication required")]
    Unauthenticated,

    /// The session was ended (logout or cancelled registration) while the
    /// operation was in flight; its result was discarded.
    #[error("Session ended before the operation completed")]
    SessionEnded,
}

impl AppError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401/403 answers, i.e. the token or credentials were rejected.
    pub fn is_auth_rejection(&self) -> bool {
        matches!(self.status(), Some(401) | Some(403))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{}: {}", field, e.code),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_displays_server_message() {
        let err = AppError::Http {
            status: 400,
            message: "Email já cadastrado".to_string(),
        };
        assert_eq!(err.to_string(), "Email já cadastrado");
        assert_eq!(err.status(), Some(400));
        assert!(!err.is_auth_rejection());
    }

    #[test]
    fn test_auth_rejection() {
        let err = AppError::Http {
            status: 401,
            message: "Credenciais inválidas".to_string(),
        };
        assert!(err.is_auth_rejection());
        assert!(!AppError::Network("refused".to_string()).is_auth_rejection());
    }
}
