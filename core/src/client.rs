//! Authenticated request dispatcher and the T.LY resource operations.
//!
//! # Design
//! `TlyClient` holds a base URL, the bearer token and a `Transport`, and
//! carries no mutable state between calls. Every operation funnels through
//! one generic dispatcher: build an `HttpRequest` for a catalog `Endpoint`,
//! execute it once, then parse the `HttpResponse`. The build and parse steps
//! are public so a caller can run the round-trip on its own HTTP stack.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::catalog::{join_query, Endpoint};
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::error::{ApiError, Result};
use crate::http::{HttpRequest, HttpResponse, Transport, UreqTransport};
use crate::types::{
    BulkShortenRequest, EncodedPayload, ExpandRequest, ExpandResponse, Pixel, PixelCreateRequest,
    PixelUpdateRequest, ShortLink, ShortLinkCreateRequest, ShortLinkUpdateRequest, ShortUrlRequest,
    Stats, Tag, TagRequest,
};

const JSON: &str = "application/json";
const NO_BODY: Option<&()> = None;

/// Synchronous client for the T.LY API.
///
/// Immutable after construction; share it by reference across threads.
#[derive(Clone)]
pub struct TlyClient<T = UreqTransport> {
    base_url: String,
    api_key: String,
    transport: T,
}

impl TlyClient<UreqTransport> {
    /// Client for the public service at `https://api.t.ly`.
    pub fn new(api_key: &str) -> Self {
        Self::with_transport(api_key, UreqTransport::new())
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_key).with_base_url(&config.base_url)
    }
}

impl<T: Transport> TlyClient<T> {
    pub fn with_transport(api_key: &str, transport: T) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.to_string(),
            transport,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Build the request for `endpoint` without sending it.
    ///
    /// `query` is appended after `?` as-is when non-empty. The header set is
    /// always authorization, content-type and accept, whatever the body.
    pub fn build_request<B>(
        &self,
        endpoint: Endpoint,
        query: &str,
        body: Option<&B>,
    ) -> Result<HttpRequest>
    where
        B: Serialize + ?Sized,
    {
        let mut url = format!("{}{}", self.base_url, endpoint.path());
        if !query.is_empty() {
            url.push('?');
            url.push_str(query);
        }
        let body = body
            .map(|b| serde_json::to_string(b))
            .transpose()
            .map_err(ApiError::Serialization)?;

        Ok(HttpRequest {
            method: endpoint.method(),
            url,
            headers: vec![
                ("authorization".to_string(), format!("Bearer {}", self.api_key)),
                ("content-type".to_string(), JSON.to_string()),
                ("accept".to_string(), JSON.to_string()),
            ],
            body,
        })
    }

    /// One round-trip. The response is returned unclassified.
    fn dispatch<B>(&self, endpoint: Endpoint, query: &str, body: Option<&B>) -> Result<HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        let request = self.build_request(endpoint, query, body)?;
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self
            .transport
            .execute(request)
            .map_err(ApiError::Transport)?;
        debug!(status = response.status, "received response");
        Ok(response)
    }

    fn call<B, R>(&self, endpoint: Endpoint, query: &str, body: Option<&B>) -> Result<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        parse_json(self.dispatch(endpoint, query, body)?)
    }

    fn call_empty<B>(&self, endpoint: Endpoint, query: &str, body: Option<&B>) -> Result<()>
    where
        B: Serialize + ?Sized,
    {
        parse_empty(self.dispatch(endpoint, query, body)?)
    }

    // -- pixels -------------------------------------------------------------

    pub fn create_pixel(&self, input: &PixelCreateRequest) -> Result<Pixel> {
        self.call(Endpoint::CreatePixel, "", Some(input))
    }

    pub fn list_pixels(&self) -> Result<Vec<Pixel>> {
        self.call(Endpoint::ListPixels, "", NO_BODY)
    }

    pub fn get_pixel(&self, id: u64) -> Result<Pixel> {
        self.call(Endpoint::GetPixel(id), "", NO_BODY)
    }

    pub fn update_pixel(&self, input: &PixelUpdateRequest) -> Result<Pixel> {
        self.call(Endpoint::UpdatePixel(input.id), "", Some(input))
    }

    pub fn delete_pixel(&self, id: u64) -> Result<()> {
        self.call_empty(Endpoint::DeletePixel(id), "", NO_BODY)
    }

    // -- short links --------------------------------------------------------

    pub fn create_short_link(&self, input: &ShortLinkCreateRequest) -> Result<ShortLink> {
        self.call(Endpoint::CreateShortLink, "", Some(input))
    }

    /// `short_url` goes into the query unescaped.
    pub fn get_short_link(&self, short_url: &str) -> Result<ShortLink> {
        let query = join_query([("short_url", short_url)]);
        self.call(Endpoint::GetShortLink, &query, NO_BODY)
    }

    pub fn update_short_link(&self, input: &ShortLinkUpdateRequest) -> Result<ShortLink> {
        self.call(Endpoint::UpdateShortLink, "", Some(input))
    }

    pub fn delete_short_link(&self, short_url: &str) -> Result<()> {
        let body = ShortUrlRequest {
            short_url: short_url.to_string(),
        };
        self.call_empty(Endpoint::DeleteShortLink, "", Some(&body))
    }

    pub fn expand_short_link(&self, input: &ExpandRequest) -> Result<ExpandResponse> {
        self.call(Endpoint::ExpandShortLink, "", Some(input))
    }

    /// List short links matching `filters` (`search`, `tag_ids`, `pixel_ids`, ...).
    ///
    /// The service answers with an encoded string; it is returned as-is.
    pub fn list_short_links(&self, filters: &HashMap<String, String>) -> Result<EncodedPayload> {
        let query = join_query(filters);
        parse_encoded(self.dispatch(Endpoint::ListShortLinks, &query, NO_BODY)?)
    }

    /// The service answers with an encoded string; it is returned as-is.
    pub fn bulk_shorten_links(&self, input: &BulkShortenRequest) -> Result<EncodedPayload> {
        parse_encoded(self.dispatch(Endpoint::BulkShortenLinks, "", Some(input))?)
    }

    // -- stats --------------------------------------------------------------

    pub fn get_stats(&self, short_url: &str) -> Result<Stats> {
        let query = join_query([("short_url", short_url)]);
        self.call(Endpoint::GetStats, &query, NO_BODY)
    }

    // -- tags ---------------------------------------------------------------

    pub fn list_tags(&self) -> Result<Vec<Tag>> {
        self.call(Endpoint::ListTags, "", NO_BODY)
    }

    pub fn create_tag(&self, tag: &str) -> Result<Tag> {
        let body = TagRequest {
            tag: tag.to_string(),
        };
        self.call(Endpoint::CreateTag, "", Some(&body))
    }

    pub fn get_tag(&self, id: u64) -> Result<Tag> {
        self.call(Endpoint::GetTag(id), "", NO_BODY)
    }

    pub fn update_tag(&self, id: u64, tag: &str) -> Result<Tag> {
        let body = TagRequest {
            tag: tag.to_string(),
        };
        self.call(Endpoint::UpdateTag(id), "", Some(&body))
    }

    pub fn delete_tag(&self, id: u64) -> Result<()> {
        self.call_empty(Endpoint::DeleteTag(id), "", NO_BODY)
    }
}

impl<T> fmt::Debug for TlyClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlyClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

/// Classify `response` and decode a 2xx body into `R`.
pub fn parse_json<R: DeserializeOwned>(response: HttpResponse) -> Result<R> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(ApiError::Deserialization)
}

/// Classify `response` and discard a 2xx body.
pub fn parse_empty(response: HttpResponse) -> Result<()> {
    check_status(&response)
}

/// Classify `response` and unwrap the encoded string of a list/bulk answer.
pub fn parse_encoded(response: HttpResponse) -> Result<EncodedPayload> {
    parse_json(response)
}

/// Anything outside `200..300` is an `Api` error carrying the raw body.
fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Api {
        status: response.status,
        body: response.body.clone(),
    })
}
