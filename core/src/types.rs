//! Data-transfer records for the T.LY API.
//!
//! # Design
//! Response records mirror what the service returns; timestamps stay as the
//! strings it sends. Request records use `Option` with
//! `skip_serializing_if` for every field the service treats as "leave
//! unchanged when absent", so an unset field is omitted rather than sent as
//! `null` or `0`. `Some(vec![])` on `tags`/`pixels` is a deliberate explicit
//! empty list.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Read a missing or `null` field as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ---------------------------------------------------------------------------
// Pixels
// ---------------------------------------------------------------------------

/// A tracking pixel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pixel {
    pub id: u64,
    pub name: String,
    pub pixel_id: String,
    pub pixel_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PixelCreateRequest {
    pub name: String,
    pub pixel_id: String,
    pub pixel_type: String,
}

/// Update payload. `id` selects the pixel in the path and is echoed in the body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PixelUpdateRequest {
    pub id: u64,
    pub name: String,
    pub pixel_id: String,
    pub pixel_type: String,
}

// ---------------------------------------------------------------------------
// Short links
// ---------------------------------------------------------------------------

/// A short link as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShortLink {
    pub short_url: String,
    #[serde(default)]
    pub description: Option<String>,
    pub long_url: String,
    pub domain: String,
    pub short_id: String,
    #[serde(default)]
    pub expire_at_views: Option<u64>,
    #[serde(default)]
    pub expire_at_datetime: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub public_stats: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
    #[serde(default)]
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShortLinkCreateRequest {
    pub long_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    pub domain: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at_views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_stats: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ShortLinkCreateRequest {
    pub fn new(long_url: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            long_url: long_url.into(),
            domain: domain.into(),
            ..Default::default()
        }
    }
}

/// Update payload; `short_url` selects the link to change.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ShortLinkUpdateRequest {
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_id: Option<String>,
    pub long_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at_datetime: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expire_at_views: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_stats: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl ShortLinkUpdateRequest {
    pub fn new(short_url: impl Into<String>, long_url: impl Into<String>) -> Self {
        Self {
            short_url: short_url.into(),
            long_url: long_url.into(),
            ..Default::default()
        }
    }
}

/// Body of `DELETE /api/v1/link`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShortUrlRequest {
    pub short_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpandRequest {
    pub short_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExpandResponse {
    pub long_url: String,
    pub expired: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BulkShortenRequest {
    pub domain: String,
    pub links: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<u64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pixels: Option<Vec<u64>>,
}

/// Raw string delivered by the list and bulk endpoints.
///
/// Those endpoints send a JSON string whose content is itself encoded JSON.
/// The client decodes the outer string only and hands the inner text back
/// untouched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct EncodedPayload(pub String);

impl EncodedPayload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Second-pass decode of the inner text.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.0).map_err(ApiError::Deserialization)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Point-in-time click statistics for one short link.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Stats {
    pub clicks: u64,
    pub unique_clicks: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub browsers: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub countries: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub referrers: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platforms: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub daily_clicks: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: u64,
    pub tag: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Body of tag create and update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRequest {
    pub tag: String,
}
