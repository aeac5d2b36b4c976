//! Request and response types for the App Center API

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{AppCenterError, Result};

/// Fully resolved app coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppRef {
    pub owner_name: String,
    pub app_name: String,
}

impl AppRef {
    /// Create app coordinates, rejecting empty names
    pub fn new(owner_name: impl Into<String>, app_name: impl Into<String>) -> Result<Self> {
        let owner_name = owner_name.into();
        let app_name = app_name.into();

        if owner_name.trim().is_empty() {
            return Err(AppCenterError::invalid_config(
                "owner_name",
                "No owner name for App Center given",
            ));
        }
        if app_name.trim().is_empty() {
            return Err(AppCenterError::invalid_config(
                "app_name",
                "No app name for App Center given",
            ));
        }

        Ok(Self {
            owner_name,
            app_name,
        })
    }
}

impl std::fmt::Display for AppRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner_name, self.app_name)
    }
}

/// Partially known app coordinates, resolved against the app list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppIdentity {
    pub owner_name: Option<String>,
    pub app_name: Option<String>,
}

impl AppIdentity {
    pub fn new(owner_name: Option<String>, app_name: Option<String>) -> Self {
        let non_empty = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Self {
            owner_name: non_empty(owner_name),
            app_name: non_empty(app_name),
        }
    }

    /// Both parts present, no lookup needed
    pub fn as_resolved(&self) -> Option<AppRef> {
        match (&self.owner_name, &self.app_name) {
            (Some(owner), Some(app)) => AppRef::new(owner.clone(), app.clone()).ok(),
            _ => None,
        }
    }
}

impl From<AppRef> for AppIdentity {
    fn from(app: AppRef) -> Self {
        Self {
            owner_name: Some(app.owner_name),
            app_name: Some(app.app_name),
        }
    }
}

/// Owner account kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OwnerType {
    #[default]
    User,
    #[serde(rename = "org", alias = "organization")]
    Organization,
}

impl OwnerType {
    /// Path fragment used by the web portal
    pub fn portal_segment(&self) -> &'static str {
        match self {
            OwnerType::User => "users",
            OwnerType::Organization => "orgs",
        }
    }
}

impl std::fmt::Display for OwnerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerType::User => write!(f, "user"),
            OwnerType::Organization => write!(f, "organization"),
        }
    }
}

impl std::str::FromStr for OwnerType {
    type Err = AppCenterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "user" => Ok(OwnerType::User),
            "org" | "organization" => Ok(OwnerType::Organization),
            other => Err(AppCenterError::invalid_config(
                "owner_type",
                format!("'{}' must be one of: user, organization", other),
            )),
        }
    }
}

/// Distribution destination kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationType {
    #[default]
    Group,
    Store,
}

impl DestinationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DestinationType::Group => "group",
            DestinationType::Store => "store",
        }
    }
}

impl std::fmt::Display for DestinationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DestinationType {
    type Err = AppCenterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "group" => Ok(DestinationType::Group),
            "store" => Ok(DestinationType::Store),
            other => Err(AppCenterError::invalid_config(
                "destination_type",
                format!("'{}' must be one of: group, store", other),
            )),
        }
    }
}

/// Terminal status of an upload session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Committed,
    Aborted,
}

impl std::fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UploadStatus::Committed => write!(f, "committed"),
            UploadStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// Debug symbol provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolType {
    /// dSYM bundle
    Apple,
    /// Proguard mapping file
    AndroidProguard,
}

impl SymbolType {
    /// Name used in notifications
    pub fn label(&self) -> &'static str {
        match self {
            SymbolType::Apple => "dSYM",
            SymbolType::AndroidProguard => "mapping",
        }
    }
}

/// Server-issued upload session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadSession {
    #[serde(alias = "upload_id", alias = "symbol_upload_id")]
    pub id: String,
    pub upload_url: String,
    #[serde(default)]
    pub expiration_date: Option<DateTime<Utc>>,
}

/// Body for creating a release upload
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReleaseUploadRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_number: Option<String>,
}

/// Body for creating a symbol upload
#[derive(Debug, Clone, Serialize)]
pub struct SymbolUploadRequest {
    pub symbol_type: SymbolType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl SymbolUploadRequest {
    pub fn apple() -> Self {
        Self {
            symbol_type: SymbolType::Apple,
            file_name: None,
            build: None,
            version: None,
        }
    }

    pub fn android_mapping(
        file_name: impl Into<String>,
        build: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            symbol_type: SymbolType::AndroidProguard,
            file_name: Some(file_name.into()),
            build: Some(build.into()),
            version: Some(version.into()),
        }
    }
}

/// Response to committing or aborting a release upload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseUploadUpdate {
    #[serde(default, deserialize_with = "id_from_string_or_number")]
    pub release_id: Option<u64>,
    #[serde(default)]
    pub release_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Release record as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub id: u64,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub short_version: String,
    #[serde(default)]
    pub download_url: Option<String>,
    #[serde(default)]
    pub release_notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Release plus the download URL read back after a mutation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributedRelease {
    pub download_url: Option<String>,
    pub release: Release,
}

impl From<Release> for DistributedRelease {
    fn from(release: Release) -> Self {
        Self {
            download_url: release.download_url.clone(),
            release,
        }
    }
}

/// Distribution group or store looked up by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Destination {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Attach request for a release
#[derive(Debug, Clone, PartialEq)]
pub struct DestinationAssignment {
    pub destination_type: DestinationType,
    pub destination_id: String,
    /// Group only
    pub mandatory_update: bool,
    /// Group only
    pub notify_testers: bool,
}

impl DestinationAssignment {
    pub(crate) fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("id".to_string(), Value::String(self.destination_id.clone()));
        if self.destination_type == DestinationType::Group {
            body.insert("mandatory_update".to_string(), Value::Bool(self.mandatory_update));
            body.insert("notify_testers".to_string(), Value::Bool(self.notify_testers));
        }
        Value::Object(body)
    }
}

/// Owner of an app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "type", default)]
    pub owner_type: Option<OwnerType>,
}

/// App record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct App {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub os: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub owner: Option<Owner>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl App {
    pub fn owner_name(&self) -> Option<&str> {
        self.owner.as_ref().map(|o| o.name.as_str())
    }
}

/// Body for creating an app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApp {
    pub display_name: String,
    pub name: String,
    pub os: String,
    pub platform: String,
}

/// Distribution group summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionGroup {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Raw device list export (CSV), passed through unparsed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList(Vec<u8>);

impl DeviceList {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

fn id_from_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("invalid release id {}", n))),
        Some(Value::String(s)) => s
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid release id '{}'", s))),
        Some(other) => Err(D::Error::custom(format!("invalid release id {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_app_ref_rejects_empty_names() {
        assert!(AppRef::new("", "app").is_err());
        assert!(AppRef::new("owner", " ").is_err());
        assert_eq!(AppRef::new("owner", "app").unwrap().to_string(), "owner/app");
    }

    #[test]
    fn test_identity_drops_blank_parts() {
        let identity = AppIdentity::new(Some(String::new()), Some("app".to_string()));
        assert_eq!(identity.owner_name, None);
        assert!(identity.as_resolved().is_none());

        let identity = AppIdentity::new(Some("owner".to_string()), Some("app".to_string()));
        assert_eq!(identity.as_resolved(), Some(AppRef::new("owner", "app").unwrap()));
        assert_eq!(AppIdentity::from(AppRef::new("owner", "app").unwrap()), identity);
    }

    #[test]
    fn test_upload_session_accepts_both_id_fields() {
        let release: UploadSession = serde_json::from_value(json!({
            "upload_id": "upload_id",
            "upload_url": "https://upload.com"
        }))
        .unwrap();
        assert_eq!(release.id, "upload_id");
        assert_eq!(release.expiration_date, None);

        let symbol: UploadSession = serde_json::from_value(json!({
            "symbol_upload_id": "symbol_upload_id",
            "upload_url": "https://upload_dsym.com",
            "expiration_date": "2026-10-18T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(symbol.id, "symbol_upload_id");
        assert!(symbol.expiration_date.is_some());
    }

    #[test]
    fn test_release_upload_update_release_id() {
        let update: ReleaseUploadUpdate = serde_json::from_value(json!({
            "release_id": "42",
            "release_url": "v0.1/apps/owner/app/releases/42"
        }))
        .unwrap();
        assert_eq!(update.release_id, Some(42));

        let update: ReleaseUploadUpdate =
            serde_json::from_value(json!({ "release_id": 7 })).unwrap();
        assert_eq!(update.release_id, Some(7));

        let update: ReleaseUploadUpdate =
            serde_json::from_value(json!({ "status": "aborted" })).unwrap();
        assert_eq!(update.release_id, None);
        assert_eq!(update.extra["status"], "aborted");
    }

    #[test]
    fn test_release_keeps_unknown_fields() {
        let body = json!({
            "id": 1,
            "version": "3",
            "short_version": "1.0.0",
            "download_url": "https://download.example/app.ipa",
            "app_name": "app",
            "enabled": true
        });
        let release: Release = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(release.short_version, "1.0.0");
        assert_eq!(release.extra["enabled"], true);
        assert_eq!(serde_json::to_value(&release).unwrap()["app_name"], "app");
    }

    #[test]
    fn test_symbol_request_bodies() {
        assert_eq!(
            serde_json::to_value(SymbolUploadRequest::apple()).unwrap(),
            json!({ "symbol_type": "Apple" })
        );
        assert_eq!(
            serde_json::to_value(SymbolUploadRequest::android_mapping("mapping.txt", "3", "1.0.0"))
                .unwrap(),
            json!({
                "symbol_type": "AndroidProguard",
                "file_name": "mapping.txt",
                "build": "3",
                "version": "1.0.0"
            })
        );
    }

    #[test]
    fn test_assignment_body_group_only_fields() {
        let group = DestinationAssignment {
            destination_type: DestinationType::Group,
            destination_id: "1".to_string(),
            mandatory_update: true,
            notify_testers: false,
        };
        assert_eq!(
            group.body(),
            json!({ "id": "1", "mandatory_update": true, "notify_testers": false })
        );

        let store = DestinationAssignment {
            destination_type: DestinationType::Store,
            ..group
        };
        assert_eq!(store.body(), json!({ "id": "1" }));
    }

    #[test]
    fn test_owner_type_parsing() {
        assert_eq!("user".parse::<OwnerType>().unwrap(), OwnerType::User);
        assert_eq!("organization".parse::<OwnerType>().unwrap(), OwnerType::Organization);
        assert!("team".parse::<OwnerType>().is_err());

        let owner: Owner = serde_json::from_value(json!({ "name": "acme", "type": "org" })).unwrap();
        assert_eq!(owner.owner_type, Some(OwnerType::Organization));
    }

    #[test]
    fn test_empty_release_upload_request() {
        assert_eq!(
            serde_json::to_value(ReleaseUploadRequest::default()).unwrap(),
            json!({})
        );
    }
}
