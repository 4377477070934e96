use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, Visitor},
};

use std::fmt;

/// One contact-form submission as posted by the website.
///
/// Every field is optional on the wire so that an incomplete form still
/// reaches validation instead of being rejected by the extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub service: Option<String>,
    #[serde(default, deserialize_with = "scalar_as_text")]
    pub message: Option<String>,
}

struct ScalarVisitor;

impl Visitor<'_> for ScalarVisitor {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a string, number, boolean or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
        Ok(Some(v))
    }

    // `false` and zero are falsy on the website side, so they count as absent.
    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(v.then(|| "true".to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok((v != 0).then(|| v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok((v != 0).then(|| v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok((v != 0.0 && !v.is_nan()).then(|| v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }
}

/// Keeps any scalar form value as text; arrays and objects are rejected.
fn scalar_as_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ScalarVisitor)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Outcome {
    pub const SENT: &'static str = "Email sent successfully!";
    pub const MISSING_FIELDS: &'static str = "Missing required fields.";
    pub const SEND_FAILED: &'static str = "Failed to send email.";
    pub const INVALID_BODY: &'static str = "Invalid request body.";

    pub fn sent() -> Self {
        Self {
            success: true,
            message: Self::SENT.to_string(),
            error: None,
        }
    }

    pub fn failure(message: &str, error: Option<String>) -> Self {
        Self {
            success: false,
            message: message.to_string(),
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_fields_deserialize_as_none() {
        let submission: Submission =
            serde_json::from_str(r#"{"name":"Jane","email":null}"#).unwrap();

        assert_eq!(submission.name.as_deref(), Some("Jane"));
        assert!(submission.email.is_none());
        assert!(submission.message.is_none());
    }

    #[test]
    fn scalars_are_kept_as_text() {
        let submission: Submission = serde_json::from_str(
            r#"{"name":123,"email":"jane@x.com","role":true,"service":1.5,"message":0}"#,
        )
        .unwrap();

        assert_eq!(submission.name.as_deref(), Some("123"));
        assert_eq!(submission.role.as_deref(), Some("true"));
        assert_eq!(submission.service.as_deref(), Some("1.5"));
        assert!(submission.message.is_none());
    }

    #[test]
    fn false_counts_as_absent() {
        let submission: Submission = serde_json::from_str(r#"{"name":false}"#).unwrap();
        assert!(submission.name.is_none());
    }

    #[test]
    fn nested_values_are_rejected() {
        assert!(serde_json::from_str::<Submission>(r#"{"name":{"first":"Jane"}}"#).is_err());
        assert!(serde_json::from_str::<Submission>(r#"{"name":["Jane"]}"#).is_err());
    }

    #[test]
    fn error_is_omitted_when_absent() {
        let json = serde_json::to_value(Outcome::sent()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"success": true, "message": "Email sent successfully!"})
        );
    }

    #[test]
    fn error_is_serialized_when_present() {
        let outcome = Outcome::failure(Outcome::SEND_FAILED, Some("Connection refused".into()));
        let json = serde_json::to_value(outcome).unwrap();

        assert_eq!(json["error"], "Connection refused");
        assert_eq!(json["success"], false);
    }
}
