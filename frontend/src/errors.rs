use thiserror::Error;

/// Errors returned by calls to the dashboard REST API
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Resource not found")]
    NotFound,
    #[error("Not signed in or session expired")]
    Unauthorized,
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Conflict: {message}")]
    Conflict { message: String },
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

impl ApiError {
    /// Map a non-success HTTP status and its `{message}` body to an error
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => ApiError::Unauthorized,
            404 => ApiError::NotFound,
            409 => ApiError::Conflict { message },
            _ => ApiError::Server { status, message },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Network(e.to_string())
        }
    }
}

/// Why a controller action could not run or complete
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ControllerError {
    #[error("No date selected")]
    NoDateSelected,
    #[error("Daily summary is not ready to save")]
    NotReady,
    #[error("Booking {0} is not on the statement")]
    UnknownBooking(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status() {
        assert_eq!(ApiError::from_status(404, String::new()), ApiError::NotFound);
        assert_eq!(ApiError::from_status(401, String::new()), ApiError::Unauthorized);
        assert_eq!(
            ApiError::from_status(409, "stale".to_string()),
            ApiError::Conflict { message: "stale".to_string() }
        );
        assert_eq!(
            ApiError::from_status(500, "boom".to_string()),
            ApiError::Server { status: 500, message: "boom".to_string() }
        );
    }
}
