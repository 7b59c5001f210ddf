use serde::Deserialize;
use serde::Serialize;

use crate::db::PackageModel;
use crate::db::ReviewModel;

// Request bodies keep every field optional so the server can tell a missing
// field apart from a malformed body and answer with a validation error.

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct PublishRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantum_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl PublishRequest {
    pub fn new(name: &str, version: &str, description: &str, author: &str, code: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            version: Some(version.to_string()),
            description: Some(description.to_string()),
            author: Some(author.to_string()),
            quantum_level: None,
            code: Some(code.to_string()),
        }
    }

    pub fn with_quantum_level(mut self, quantum_level: i64) -> Self {
        self.quantum_level = Some(quantum_level);
        self
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ReviewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mind_destroyed: Option<bool>,
}

impl ReviewRequest {
    pub fn new(name: &str, rating: i64, title: &str, comment: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            rating: Some(rating),
            title: Some(title.to_string()),
            comment: Some(comment.to_string()),
            mind_destroyed: None,
        }
    }
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct ExecuteRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct StatusResponse {
    pub success: bool,
    pub status: String,
    pub message: String,
    pub version: String,
    /// ISO-8601 UTC with milliseconds, e.g. `2025-08-10T12:00:00.000Z`.
    pub timestamp: String,
    pub features: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct PackageListResponse {
    pub success: bool,
    pub packages: Vec<PackageModel>,
    pub count: usize,
    pub message: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackageResponse {
    pub success: bool,
    pub package: PackageModel,
    pub message: String,
    /// Only present on install responses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_message: Option<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ReviewListResponse {
    pub success: bool,
    pub reviews: Vec<ReviewModel>,
    pub count: usize,
    pub message: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ReviewResponse {
    pub success: bool,
    pub review: ReviewModel,
    pub message: String,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub success: bool,
    pub output: String,
    pub execution_time: String,
    pub actual_response_time: String,
    pub message: String,
    pub stats: ExecuteStats,
}

/// Randomly generated, carries no meaning.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStats {
    pub bytecode_instructions: u32,
    pub memory_used: String,
    pub quantum_states: u32,
    pub mind_destruction_level: u32,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: RegistryStats,
    pub message: String,
}

/// Registry wide aggregates. An aggregate the store failed to compute is
/// `None` and its name is listed in `unavailable`.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStats {
    pub packages: Option<u64>,
    pub reviews: Option<u64>,
    pub total_downloads: Option<u64>,
    pub average_rating: Option<f64>,
    pub version: String,
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_endpoints: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn publish_request_omits_unset_fields() {
        let request = PublishRequest {
            name: Some("a".to_string()),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({ "name": "a" }));
    }

    #[test]
    fn review_request_accepts_null_fields() {
        let request: ReviewRequest =
            serde_json::from_value(json!({ "name": null, "rating": 3 })).unwrap();
        assert_eq!(request.name, None);
        assert_eq!(request.rating, Some(3));
    }

    #[test]
    fn stats_report_missing_aggregates_as_null() {
        let stats = RegistryStats {
            packages: Some(2),
            reviews: None,
            total_downloads: Some(10),
            average_rating: None,
            version: "1.1.7".to_string(),
            features: vec![],
            unavailable: vec!["reviews".to_string(), "averageRating".to_string()],
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["reviews"], serde_json::Value::Null);
        assert_eq!(value["totalDownloads"], 10);
        assert_eq!(value["unavailable"], json!(["reviews", "averageRating"]));
    }
}
