use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid input for `{field}`: {message}")]
    InvalidInput { field: &'static str, message: String },
}

impl DomainError {
    pub fn required(field: &'static str) -> Self {
        Self::InvalidInput { field, message: format!("`{field}` is required") }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("persistence failure: {0}")]
    Persistence(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterfaceErrorKind {
    BadRequest,
    NotFound,
    ServiceUnavailable,
}

/// An application failure as the outside world sees it. `message` keeps the
/// internal detail for logs; callers show `public_message()`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind:?} [{correlation_id}]: {message}")]
pub struct InterfaceError {
    pub kind: InterfaceErrorKind,
    pub message: String,
    pub correlation_id: String,
}

impl InterfaceErrorKind {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::BadRequest => "The request could not be processed. Check inputs and try again.",
            Self::NotFound => "The requested agent specification does not exist.",
            Self::ServiceUnavailable => {
                "The service is temporarily unavailable. Please retry shortly."
            }
        }
    }
}

impl InterfaceError {
    /// Input errors describe the caller's own mistake and are shown as-is.
    pub fn public_message(&self) -> &str {
        match self.kind {
            InterfaceErrorKind::BadRequest => &self.message,
            kind => kind.user_message(),
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let kind = match &self {
            Self::Domain(_) => InterfaceErrorKind::BadRequest,
            Self::NotFound(_) => InterfaceErrorKind::NotFound,
            Self::Persistence(_) => InterfaceErrorKind::ServiceUnavailable,
        };
        let message = match self {
            Self::Domain(error) => error.to_string(),
            Self::NotFound(message) | Self::Persistence(message) => message,
        };
        InterfaceError { kind, message, correlation_id: correlation_id.into() }
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::{ApplicationError, DomainError, InterfaceErrorKind};

    #[test]
    fn domain_error_becomes_bad_request_with_its_detail() {
        let interface =
            ApplicationError::from(DomainError::required("description")).into_interface("req-1");

        assert_eq!(interface.kind, InterfaceErrorKind::BadRequest);
        assert_eq!(interface.correlation_id, "req-1");
        assert_eq!(
            interface.public_message(),
            "invalid input for `description`: `description` is required"
        );
    }

    #[test]
    fn not_found_hides_the_internal_detail() {
        let interface =
            ApplicationError::NotFound("agent specification 7".to_owned()).into_interface("req-3");

        assert_eq!(interface.kind, InterfaceErrorKind::NotFound);
        assert_eq!(interface.message, "agent specification 7");
        assert_eq!(interface.public_message(), "The requested agent specification does not exist.");
    }

    #[test]
    fn persistence_error_maps_to_service_unavailable() {
        let interface = ApplicationError::Persistence("database lock timeout".to_owned())
            .into_interface("req-4");

        assert_eq!(interface.kind, InterfaceErrorKind::ServiceUnavailable);
        assert_eq!(
            interface.public_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
        assert!(interface.to_string().contains("req-4"));
    }
}
