//! Resource payloads and the identifying fields read from them

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Raw contents of one resource file; sent to the server unchanged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePayload {
    pub path: PathBuf,
    pub body: String,
}

impl ResourcePayload {
    pub fn new(path: impl Into<PathBuf>, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            body: body.into(),
        }
    }
}

/// A resource file that is not a JSON object with a string `resourceType`
#[derive(Debug, thiserror::Error)]
#[error("Malformed resource payload in {}: {}", .path.display(), .source)]
pub struct MalformedPayload {
    pub path: PathBuf,
    #[source]
    pub source: serde_json::Error,
}

/// Only the fields needed to address the resource; everything else is ignored
#[derive(Debug, Deserialize)]
struct ResourceHeader {
    #[serde(rename = "resourceType")]
    resource_type: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Type, id and version of an actionable resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceDescriptor {
    pub resource_type: String,
    pub id: String,
    pub version: String,
}

impl ResourceDescriptor {
    /// Parse the payload's header fields.
    ///
    /// Returns `Ok(None)` when `id` or `version` is missing or empty; such
    /// resources are skipped without a diagnostic.
    pub fn parse(payload: &ResourcePayload) -> Result<Option<Self>, MalformedPayload> {
        let malformed = |source| MalformedPayload {
            path: payload.path.clone(),
            source,
        };

        let value: serde_json::Value = serde_json::from_str(&payload.body).map_err(malformed)?;
        if !value.is_object() {
            return Err(malformed(serde::de::Error::custom("expected a JSON object")));
        }
        let header: ResourceHeader = serde_json::from_value(value).map_err(malformed)?;

        let id = header.id.filter(|s| !s.is_empty());
        let version = header.version.filter(|s| !s.is_empty());

        Ok(match (id, version) {
            (Some(id), Some(version)) => Some(Self {
                resource_type: header.resource_type,
                id,
                version,
            }),
            _ => None,
        })
    }

    /// Console label for one version, e.g. `CodeSystem of id=abc ,version=1.0.`
    pub fn label(&self, version: &str) -> String {
        format!(
            "{} of id={} ,version={}.",
            self.resource_type, self.id, version
        )
    }
}

impl fmt::Display for ResourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(&self.version))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(body: &str) -> ResourcePayload {
        ResourcePayload::new("codesystems/abc.json", body)
    }

    #[test]
    fn test_parse_code_system() {
        let p = payload(
            r#"{"resourceType":"CodeSystem","id":"abc","version":"1.0","status":"active","concept":[]}"#,
        );
        let descriptor = ResourceDescriptor::parse(&p).unwrap().unwrap();
        assert_eq!(descriptor.resource_type, "CodeSystem");
        assert_eq!(descriptor.id, "abc");
        assert_eq!(descriptor.version, "1.0");
        assert_eq!(descriptor.to_string(), "CodeSystem of id=abc ,version=1.0.");
    }

    #[test]
    fn test_label_with_other_version() {
        let p = payload(r#"{"resourceType":"ValueSet","id":"vs1","version":"4.0.1"}"#);
        let descriptor = ResourceDescriptor::parse(&p).unwrap().unwrap();
        assert_eq!(descriptor.label("HEAD"), "ValueSet of id=vs1 ,version=HEAD.");
    }

    #[test]
    fn test_missing_version_is_skipped() {
        let p = payload(r#"{"resourceType":"CodeSystem","id":"abc"}"#);
        assert_eq!(ResourceDescriptor::parse(&p).unwrap(), None);
    }

    #[test]
    fn test_empty_or_null_id_is_skipped() {
        let empty = payload(r#"{"resourceType":"CodeSystem","id":"","version":"1.0"}"#);
        let null = payload(r#"{"resourceType":"CodeSystem","id":null,"version":"1.0"}"#);
        assert_eq!(ResourceDescriptor::parse(&empty).unwrap(), None);
        assert_eq!(ResourceDescriptor::parse(&null).unwrap(), None);
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let p = payload("{\"resourceType\": \"CodeSystem\",");
        let err = ResourceDescriptor::parse(&p).unwrap_err();
        assert!(err.to_string().starts_with("Malformed resource payload in codesystems/abc.json"));
    }

    #[test]
    fn test_missing_resource_type_is_malformed() {
        let p = payload(r#"{"id":"abc","version":"1.0"}"#);
        assert!(ResourceDescriptor::parse(&p).is_err());
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(ResourceDescriptor::parse(&payload("[]")).is_err());
        assert!(ResourceDescriptor::parse(&payload(r#"["CodeSystem","abc","1.0"]"#)).is_err());
        assert!(ResourceDescriptor::parse(&payload("")).is_err());
    }
}
