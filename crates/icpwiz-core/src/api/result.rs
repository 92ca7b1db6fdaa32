//! Result envelope returned by every API call

use crate::error::CoreError;
use serde::Serialize;

/// `{ success, data, error, status }`
///
/// `status` is `None` when the request never produced an HTTP response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResult<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl<T> ApiResult<T> {
    pub fn ok(data: T, status: u16) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status: Some(status),
        }
    }

    pub fn failure(error: impl Into<String>, status: Option<u16>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            status,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == Some(404)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        ApiResult {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            status: self.status,
        }
    }

    /// Convert to a `Result` for callers that want `?`
    pub fn into_result(self) -> crate::error::Result<T> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(CoreError::Api {
                status: self.status,
                message: self
                    .error
                    .unwrap_or_else(|| "Request failed".to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_into_result() {
        let result: ApiResult<u32> = ApiResult::failure("Unauthorized", Some(401));
        assert!(result.is_unauthorized());
        match result.into_result() {
            Err(CoreError::Api { status, message }) => {
                assert_eq!(status, Some(401));
                assert_eq!(message, "Unauthorized");
            }
            other => panic!("expected Api error, got {:?}", other),
        }
    }

    #[test]
    fn test_ok_map_and_serialize() {
        let result = ApiResult::ok(2u32, 200).map(|n| n * 10);
        assert_eq!(result.data, Some(20));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"success": true, "data": 20, "status": 200}));
        assert_eq!(result.into_result().unwrap(), 20);
    }
}
