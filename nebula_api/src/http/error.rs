use super::types::ErrorResponse;

/// A non-success response from a nebula server.
///
/// Returned inside `anyhow::Error` by every `NebulaApi` call, use
/// `downcast_ref::<ApiError>()` to inspect the status.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status: u16,
    pub error: String,
    pub message: String,
}

impl ApiError {
    /// Build from a status and raw response body. Bodies that are not the
    /// standard error envelope become the message verbatim.
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(ErrorResponse { error, message, .. }) => Self {
                status,
                error,
                message,
            },
            Err(_) => Self {
                status,
                error: format!("HTTP {status}"),
                message: body.to_string(),
            },
        }
    }

    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        match response.text().await {
            Ok(body) => Self::from_body(status, &body),
            Err(e) => Self {
                status,
                error: format!("HTTP {status}"),
                message: format!("failed to read response body: {e}"),
            },
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    pub fn is_conflict(&self) -> bool {
        self.status == 409
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.status == 400
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_error_envelope() {
        let e = ApiError::from_body(
            409,
            r#"{"success":false,"error":"Package already exists","message":"A package with this name already exists"}"#,
        );
        assert!(e.is_conflict());
        assert_eq!(e.error, "Package already exists");
        assert_eq!(e.to_string(), "A package with this name already exists");
    }

    #[test]
    fn falls_back_to_raw_body() {
        let e = ApiError::from_body(502, "bad gateway");
        assert_eq!(e.status, 502);
        assert_eq!(e.error, "HTTP 502");
        assert_eq!(e.message, "bad gateway");
    }
}
