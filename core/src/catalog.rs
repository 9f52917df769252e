//! Endpoint catalog: each API operation as a fixed method and path.

use crate::http::HttpMethod;

/// One T.LY endpoint. Variants that address a single pixel or tag carry its id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CreatePixel,
    ListPixels,
    GetPixel(u64),
    UpdatePixel(u64),
    DeletePixel(u64),
    CreateShortLink,
    GetShortLink,
    UpdateShortLink,
    DeleteShortLink,
    ExpandShortLink,
    ListShortLinks,
    BulkShortenLinks,
    GetStats,
    ListTags,
    CreateTag,
    GetTag(u64),
    UpdateTag(u64),
    DeleteTag(u64),
}

impl Endpoint {
    pub fn method(&self) -> HttpMethod {
        use Endpoint::*;
        match self {
            ListPixels | GetPixel(_) | GetShortLink | ListShortLinks | GetStats | ListTags
            | GetTag(_) => HttpMethod::Get,
            CreatePixel | CreateShortLink | ExpandShortLink | BulkShortenLinks | CreateTag => {
                HttpMethod::Post
            }
            UpdatePixel(_) | UpdateShortLink | UpdateTag(_) => HttpMethod::Put,
            DeletePixel(_) | DeleteShortLink | DeleteTag(_) => HttpMethod::Delete,
        }
    }

    pub fn path(&self) -> String {
        use Endpoint::*;
        match self {
            CreatePixel | ListPixels => "/api/v1/link/pixel".to_string(),
            GetPixel(id) | UpdatePixel(id) | DeletePixel(id) => format!("/api/v1/link/pixel/{id}"),
            CreateShortLink => "/api/v1/link/shorten".to_string(),
            GetShortLink | UpdateShortLink | DeleteShortLink => "/api/v1/link".to_string(),
            ExpandShortLink => "/api/v1/link/expand".to_string(),
            ListShortLinks => "/api/v1/link/list".to_string(),
            BulkShortenLinks => "/api/v1/link/bulk".to_string(),
            GetStats => "/api/v1/link/stats".to_string(),
            ListTags | CreateTag => "/api/v1/link/tag".to_string(),
            GetTag(id) | UpdateTag(id) | DeleteTag(id) => format!("/api/v1/link/tag/{id}"),
        }
    }
}

/// Join `key=value` pairs with `&`.
///
/// Nothing is percent-encoded; callers pass values that are already valid in
/// a query component.
pub fn join_query<K, V, I>(params: I) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
    I: IntoIterator<Item = (K, V)>,
{
    params
        .into_iter()
        .map(|(k, v)| format!("{}={}", k.as_ref(), v.as_ref()))
        .collect::<Vec<_>>()
        .join("&")
}
