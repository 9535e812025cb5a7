//! Session-scoped client for the COROS training hub API.
//!
//! The [`CorosClient`] trait describes the three operations the hub exposes to
//! an account holder: log in, list recent activities and export an activity
//! file. [`http_client::ReqwestCorosClient`] is the reqwest-backed implementation.

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod config;
pub mod http_client;
pub mod response;

/// Production endpoint of the training hub (EU region).
pub const COROS_URL: &str = "https://teameuapi.coros.com";

/// Account-type discriminator sent with every login.
pub const ACCOUNT_TYPE: u32 = 2;

#[derive(Debug, Error)]
pub enum CorosError {
    /// Login returned a non-success HTTP status.
    #[error("login failed: {0}")]
    Transport(String),
    /// Login succeeded at the HTTP level but no access token came back.
    #[error("login failed, check credentials or API status: {0}")]
    Authentication(String),
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("could not retrieve file download URL")]
    FileResolution,
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration error: {0}")]
    Config(String),
}

/// Authentication state of one client instance.
///
/// The token starts absent and is only ever set by a successful login.
#[derive(Clone, Debug, Default)]
pub struct Session {
    token: Option<SecretString>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub(crate) fn require_token(&self) -> Result<&SecretString, CorosError> {
        self.token.as_ref().ok_or(CorosError::NotAuthenticated)
    }

    pub(crate) fn authenticate(&mut self, token: &str) {
        self.token = Some(SecretString::new(token.into()));
    }
}

/// A recorded activity as returned by the listing endpoint.
///
/// The record is kept as raw JSON; only `labelId` and `sportType` are read
/// back out, and only to be forwarded to the export endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Activity(Value);

impl Activity {
    /// Build a minimal activity carrying just the fields export needs.
    pub fn new(label_id: impl Into<String>, sport_type: impl Into<Value>) -> Self {
        Self(serde_json::json!({
            "labelId": label_id.into(),
            "sportType": sport_type.into(),
        }))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn label_id(&self) -> String {
        query_value(self.get("labelId"))
    }

    pub fn sport_type(&self) -> String {
        query_value(self.get("sportType"))
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(Value::as_str)
    }

    /// Start of the activity; the hub reports `startTime` in unix seconds.
    pub fn start_time(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let secs = match self.get("startTime")? {
            Value::Number(n) => n.as_i64()?,
            Value::String(s) => s.parse().ok()?,
            _ => return None,
        };
        chrono::DateTime::from_timestamp(secs, 0)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for Activity {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Render a JSON field the way it appears in a query string: strings bare,
/// numbers and booleans as text, missing or null as empty.
fn query_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Export format selector.
///
/// Codes outside the known set are still forwarded verbatim; the hub decides
/// whether to accept them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FileType(u32);

impl FileType {
    pub const CSV: Self = Self(0);
    pub const GPX: Self = Self(1);
    pub const KML: Self = Self(2);
    pub const TCX: Self = Self(3);
    pub const FIT: Self = Self(4);

    const NAMED: [(&'static str, FileType); 5] = [
        ("csv", Self::CSV),
        ("gpx", Self::GPX),
        ("kml", Self::KML),
        ("tcx", Self::TCX),
        ("fit", Self::FIT),
    ];

    pub const fn code(self) -> u32 {
        self.0
    }

    /// File extension for known formats.
    pub fn extension(self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, ft)| *ft == self)
            .map(|(ext, _)| *ext)
    }
}

impl From<u32> for FileType {
    fn from(code: u32) -> Self {
        Self(code)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extension() {
            Some(ext) => f.write_str(ext),
            None => write!(f, "{}", self.0),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown file type: {0}")]
pub struct UnknownFileType(pub String);

impl FromStr for FileType {
    type Err = UnknownFileType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        if let Some((_, ft)) = Self::NAMED.iter().find(|(name, _)| *name == lowered) {
            return Ok(*ft);
        }
        lowered
            .parse::<u32>()
            .map(Self)
            .map_err(|_| UnknownFileType(s.to_string()))
    }
}

#[async_trait]
pub trait CorosClient: Send + Sync + 'static {
    /// Authenticate with an account name and the MD5 hex of its password.
    ///
    /// Returns the full decoded login response. The session token is only
    /// stored when `data.accessToken` is a non-empty JSON string; a token of
    /// any other type (number, object, ...) is rejected with
    /// [`CorosError::Authentication`].
    async fn login(
        &mut self,
        account: &str,
        password_hash: &SecretString,
    ) -> Result<Value, CorosError>;

    /// Fetch a single page of the most recent activities.
    ///
    /// `type_codes` is sent as a comma-joined `modeList`; an empty slice is
    /// sent as an empty filter, which matches nothing.
    async fn list_activities(
        &self,
        count: u32,
        type_codes: &[u32],
    ) -> Result<Vec<Activity>, CorosError>;

    /// Export an activity file and return its raw bytes.
    async fn export_activity(
        &self,
        activity: &Activity,
        file_type: FileType,
    ) -> Result<Vec<u8>, CorosError>;
}
