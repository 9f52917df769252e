//! Blocking client for the T.LY URL-shortener API.
//!
//! # Overview
//! Wraps the REST endpoints for short links, tracking pixels, tags and click
//! statistics. Every operation is one authenticated JSON request through a
//! single generic dispatcher in `TlyClient`.
//!
//! # Design
//! - `TlyClient` is immutable after construction: base URL, bearer token and
//!   a `Transport`. It can be shared across threads.
//! - `Endpoint` is the catalog of method + path pairs; operations differ only
//!   in the endpoint, query, payload type and result type they pass through.
//! - The build (`build_request`) and parse (`parse_json`, `parse_empty`,
//!   `parse_encoded`) halves are public for callers that do their own I/O.
//! - `UreqTransport` is the default blocking transport.
//! - List and bulk endpoints return an `EncodedPayload` string rather than
//!   typed records; `EncodedPayload::decode` is the optional second pass.
//!
//! ```no_run
//! use tly_core::{ShortLinkCreateRequest, TlyClient};
//!
//! let client = TlyClient::new("api-key");
//! let link = client.create_short_link(&ShortLinkCreateRequest::new(
//!     "https://example.com/",
//!     "https://t.ly/",
//! ))?;
//! println!("{}", link.short_url);
//! # Ok::<(), tly_core::ApiError>(())
//! ```

pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use catalog::Endpoint;
pub use client::{parse_empty, parse_encoded, parse_json, TlyClient};
pub use config::ClientConfig;
pub use error::ApiError;
pub use http::{BoxError, HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use types::{
    BulkShortenRequest, EncodedPayload, ExpandRequest, ExpandResponse, Pixel, PixelCreateRequest,
    PixelUpdateRequest, ShortLink, ShortLinkCreateRequest, ShortLinkUpdateRequest, ShortUrlRequest,
    Stats, Tag, TagRequest,
};
