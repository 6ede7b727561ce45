//! Minimal FHIR R4 wire models
//!
//! The remote registry protocol only exchanges three resource types:
//! `Parameters` (job submission payloads and status responses), `Bundle`
//! (embedded result sets), and `OperationOutcome` (error diagnostics).
//! These models cover exactly the fields the protocol touches; resources
//! inside bundle entries stay as raw JSON because mapping their contents is
//! the ingestion collaborator's concern.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// FHIR Parameters resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Parameters {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameter: Vec<ParametersParameter>,
}

/// One entry of a Parameters resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParametersParameter {
    pub name: String,

    #[serde(rename = "valueString", skip_serializing_if = "Option::is_none")]
    pub value_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
}

impl Parameters {
    /// Create an empty Parameters resource
    pub fn new() -> Self {
        Self {
            resource_type: "Parameters".to_string(),
            parameter: Vec::new(),
        }
    }

    /// Append a string-valued parameter
    pub fn add_string(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameter.push(ParametersParameter {
            name: name.into(),
            value_string: Some(value.into()),
            resource: None,
        });
        self
    }

    /// Parse from a JSON body, verifying the resourceType discriminator
    pub fn from_json(body: &str) -> std::result::Result<Self, String> {
        let parsed: Parameters = serde_json::from_str(body).map_err(|e| e.to_string())?;
        if parsed.resource_type != "Parameters" {
            return Err(format!(
                "expected Parameters resource, got '{}'",
                parsed.resource_type
            ));
        }
        Ok(parsed)
    }

    /// Look up a parameter by name
    pub fn find(&self, name: &str) -> Option<&ParametersParameter> {
        self.parameter.iter().find(|p| p.name == name)
    }

    /// String value of a named parameter, if present and non-empty
    pub fn string_value(&self, name: &str) -> Option<&str> {
        self.find(name)
            .and_then(|p| p.value_string.as_deref())
            .filter(|v| !v.is_empty())
    }

    /// Embedded resource of a named parameter, decoded as a Bundle
    pub fn bundle_resource(&self, name: &str) -> Option<Bundle> {
        self.find(name)
            .and_then(|p| p.resource.as_ref())
            .and_then(|r| serde_json::from_value(r.clone()).ok())
    }

    pub fn is_empty(&self) -> bool {
        self.parameter.is_empty()
    }
}

/// FHIR Bundle resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Bundle {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub bundle_type: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub entry: Vec<BundleEntry>,
}

/// One entry of a Bundle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleEntry {
    #[serde(rename = "fullUrl", skip_serializing_if = "Option::is_none")]
    pub full_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<BundleEntryResponse>,
}

/// Transaction/batch response portion of a bundle entry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BundleEntryResponse {
    /// HTTP-like status string, e.g. "201 Created"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Bundle {
    pub fn is_empty(&self) -> bool {
        self.entry.is_empty()
    }
}

impl BundleEntry {
    /// The `resourceType` of the embedded resource, if any
    pub fn resource_type(&self) -> Option<&str> {
        self.resource
            .as_ref()
            .and_then(|r| r.get("resourceType"))
            .and_then(Value::as_str)
    }
}

/// FHIR OperationOutcome resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationOutcome {
    #[serde(rename = "resourceType")]
    pub resource_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issue: Vec<OperationOutcomeIssue>,
}

/// One issue of an OperationOutcome
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationOutcomeIssue {
    /// Issue severity code, e.g. "error", "warning"
    #[serde(default)]
    pub severity: String,

    /// Issue type code, e.g. "code-invalid", "not-found"
    #[serde(default)]
    pub code: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<String>,
}

impl OperationOutcome {
    /// Parse from a JSON body, verifying the resourceType discriminator
    pub fn from_json(body: &str) -> std::result::Result<Self, String> {
        let parsed: OperationOutcome = serde_json::from_str(body).map_err(|e| e.to_string())?;
        if parsed.resource_type != "OperationOutcome" {
            return Err(format!(
                "expected OperationOutcome resource, got '{}'",
                parsed.resource_type
            ));
        }
        Ok(parsed)
    }

    /// Whether any issue carries the given severity and type codes
    pub fn has_issue(&self, severity: &str, code: &str) -> bool {
        self.issue
            .iter()
            .any(|i| i.severity == severity && i.code == code)
    }

    /// Comma-joined issue type codes, for audit log messages
    pub fn issue_codes(&self) -> String {
        self.issue
            .iter()
            .map(|i| i.code.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn is_empty(&self) -> bool {
        self.issue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_builder_serializes_to_fhir_json() {
        let params = Parameters::new()
            .add_string("patientIdentifier", "MRN|12345")
            .add_string("jobPackage", "syphilis-registry");

        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["resourceType"], "Parameters");
        assert_eq!(json["parameter"][0]["name"], "patientIdentifier");
        assert_eq!(json["parameter"][0]["valueString"], "MRN|12345");
        assert_eq!(json["parameter"][1]["valueString"], "syphilis-registry");
    }

    #[test]
    fn test_parameters_job_status_extraction() {
        let body = r#"{
            "resourceType": "Parameters",
            "parameter": [
                {"name": "jobStatus", "valueString": "inProgress"}
            ]
        }"#;
        let params = Parameters::from_json(body).unwrap();
        assert_eq!(params.string_value("jobStatus"), Some("inProgress"));
        assert_eq!(params.string_value("jobId"), None);
    }

    #[test]
    fn test_parameters_empty_value_treated_as_missing() {
        let body = r#"{
            "resourceType": "Parameters",
            "parameter": [{"name": "jobStatus", "valueString": ""}]
        }"#;
        let params = Parameters::from_json(body).unwrap();
        assert_eq!(params.string_value("jobStatus"), None);
    }

    #[test]
    fn test_parameters_wrong_resource_type_rejected() {
        let body = r#"{"resourceType": "Patient"}"#;
        assert!(Parameters::from_json(body).is_err());
    }

    #[test]
    fn test_result_bundle_extraction() {
        let body = r#"{
            "resourceType": "Parameters",
            "parameter": [
                {"name": "jobStatus", "valueString": "complete"},
                {"name": "result", "resource": {
                    "resourceType": "Bundle",
                    "type": "collection",
                    "entry": [
                        {"resource": {"resourceType": "Observation", "id": "obs1"}}
                    ]
                }}
            ]
        }"#;
        let params = Parameters::from_json(body).unwrap();
        let bundle = params.bundle_resource("result").unwrap();
        assert_eq!(bundle.entry.len(), 1);
        assert_eq!(bundle.entry[0].resource_type(), Some("Observation"));
    }

    #[test]
    fn test_operation_outcome_issue_match() {
        let body = r#"{
            "resourceType": "OperationOutcome",
            "issue": [
                {"severity": "error", "code": "code-invalid", "diagnostics": "unknown job id"}
            ]
        }"#;
        let oo = OperationOutcome::from_json(body).unwrap();
        assert!(oo.has_issue("error", "code-invalid"));
        assert!(!oo.has_issue("error", "not-found"));
        assert_eq!(oo.issue_codes(), "code-invalid");
    }

    #[test]
    fn test_operation_outcome_malformed_body() {
        assert!(OperationOutcome::from_json("not json at all").is_err());
        assert!(OperationOutcome::from_json(r#"{"resourceType": "Bundle"}"#).is_err());
    }
}
