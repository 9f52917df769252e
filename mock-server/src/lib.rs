use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

const TIMESTAMP: &str = "2024-01-01T00:00:00.000000Z";
const DEFAULT_DOMAIN: &str = "https://t.ly/";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Pixel {
    pub id: u64,
    pub name: String,
    pub pixel_id: String,
    pub pixel_type: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
pub struct PixelInput {
    pub name: String,
    pub pixel_id: String,
    pub pixel_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tag {
    pub id: u64,
    pub tag: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Deserialize)]
pub struct TagInput {
    pub tag: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ShortLink {
    pub short_url: String,
    pub description: Option<String>,
    pub long_url: String,
    pub domain: String,
    pub short_id: String,
    pub expire_at_views: Option<u64>,
    pub expire_at_datetime: Option<String>,
    pub public_stats: bool,
    pub created_at: String,
    pub updated_at: String,
    pub meta: Option<Value>,
}

#[derive(Deserialize)]
pub struct CreateLink {
    pub long_url: String,
    pub short_id: Option<String>,
    #[serde(default)]
    pub domain: String,
    pub expire_at_datetime: Option<String>,
    pub expire_at_views: Option<u64>,
    pub description: Option<String>,
    pub public_stats: Option<bool>,
    pub password: Option<String>,
    pub tags: Option<Vec<u64>>,
    pub pixels: Option<Vec<u64>>,
    pub meta: Option<Value>,
}

#[derive(Deserialize)]
pub struct UpdateLink {
    pub short_url: String,
    pub short_id: Option<String>,
    pub long_url: String,
    pub expire_at_datetime: Option<String>,
    pub expire_at_views: Option<u64>,
    pub description: Option<String>,
    pub public_stats: Option<bool>,
    pub password: Option<String>,
    pub tags: Option<Vec<u64>>,
    pub pixels: Option<Vec<u64>>,
    pub meta: Option<Value>,
}

#[derive(Deserialize)]
pub struct ShortUrl {
    pub short_url: String,
}

#[derive(Deserialize)]
pub struct ExpandInput {
    pub short_url: String,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExpandOutput {
    pub long_url: String,
    pub expired: bool,
}

#[derive(Deserialize)]
pub struct BulkInput {
    #[serde(default)]
    pub domain: String,
    pub links: Vec<String>,
    pub tags: Option<Vec<u64>>,
    pub pixels: Option<Vec<u64>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Stats {
    pub clicks: u64,
    pub unique_clicks: u64,
    pub browsers: Vec<Value>,
    pub countries: Vec<Value>,
    pub referrers: Vec<Value>,
    pub platforms: Vec<Value>,
    pub daily_clicks: Vec<Value>,
    pub data: Value,
}

struct StoredLink {
    link: ShortLink,
    password: Option<String>,
    tags: Vec<u64>,
    pixels: Vec<u64>,
    clicks: u64,
}

#[derive(Default)]
pub struct Store {
    next_id: u64,
    pixels: BTreeMap<u64, Pixel>,
    tags: BTreeMap<u64, Tag>,
    links: BTreeMap<String, StoredLink>,
}

impl Store {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_link(&mut self, input: CreateLink) -> Result<ShortLink, ApiFailure> {
        let domain = if input.domain.is_empty() {
            DEFAULT_DOMAIN.to_string()
        } else {
            input.domain
        };
        let short_id = input
            .short_id
            .unwrap_or_else(|| Uuid::new_v4().simple().to_string()[..6].to_string());
        let short_url = format!("{}/{short_id}", domain.trim_end_matches('/'));
        if self.links.contains_key(&short_url) {
            return Err(ApiFailure::unprocessable("The short id has already been taken."));
        }
        let link = ShortLink {
            short_url: short_url.clone(),
            description: input.description,
            long_url: input.long_url,
            domain,
            short_id,
            expire_at_views: input.expire_at_views,
            expire_at_datetime: input.expire_at_datetime,
            public_stats: input.public_stats.unwrap_or(false),
            created_at: TIMESTAMP.to_string(),
            updated_at: TIMESTAMP.to_string(),
            meta: input.meta,
        };
        self.links.insert(
            short_url,
            StoredLink {
                link: link.clone(),
                password: input.password,
                tags: input.tags.unwrap_or_default(),
                pixels: input.pixels.unwrap_or_default(),
                clicks: 0,
            },
        );
        Ok(link)
    }
}

#[derive(Clone)]
pub struct AppState {
    api_key: Arc<str>,
    store: Arc<RwLock<Store>>,
}

/// Error response in the service's `{"message": ...}` shape.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    message: &'static str,
}

impl ApiFailure {
    fn not_found() -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: "not found",
        }
    }

    fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Unauthenticated.",
        }
    }

    fn unprocessable(message: &'static str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

pub fn app(api_key: &str) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        store: Arc::new(RwLock::new(Store::default())),
    };
    Router::new()
        .route("/api/v1/link/pixel", get(list_pixels).post(create_pixel))
        .route(
            "/api/v1/link/pixel/{id}",
            get(get_pixel).put(update_pixel).delete(delete_pixel),
        )
        .route("/api/v1/link", get(get_link).put(update_link).delete(delete_link))
        .route("/api/v1/link/shorten", post(create_link))
        .route("/api/v1/link/expand", post(expand_link))
        .route("/api/v1/link/list", get(list_links))
        .route("/api/v1/link/bulk", post(bulk_shorten))
        .route("/api/v1/link/stats", get(link_stats))
        .route("/api/v1/link/tag", get(list_tags).post(create_tag))
        .route(
            "/api/v1/link/tag/{id}",
            get(get_tag).put(update_tag).delete(delete_tag),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_bearer))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

async fn require_bearer(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let expected = format!("Bearer {}", state.api_key);
    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    if presented != Some(expected.as_str()) {
        return ApiFailure::unauthenticated().into_response();
    }
    next.run(request).await
}

// --- pixels ---

async fn list_pixels(State(state): State<AppState>) -> Json<Vec<Pixel>> {
    let store = state.store.read().await;
    Json(store.pixels.values().cloned().collect())
}

async fn create_pixel(
    State(state): State<AppState>,
    Json(input): Json<PixelInput>,
) -> (StatusCode, Json<Pixel>) {
    let mut store = state.store.write().await;
    let pixel = Pixel {
        id: store.next_id(),
        name: input.name,
        pixel_id: input.pixel_id,
        pixel_type: input.pixel_type,
        created_at: TIMESTAMP.to_string(),
        updated_at: TIMESTAMP.to_string(),
    };
    store.pixels.insert(pixel.id, pixel.clone());
    (StatusCode::CREATED, Json(pixel))
}

async fn get_pixel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Pixel>, ApiFailure> {
    let store = state.store.read().await;
    store.pixels.get(&id).cloned().map(Json).ok_or_else(ApiFailure::not_found)
}

async fn update_pixel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<PixelInput>,
) -> Result<Json<Pixel>, ApiFailure> {
    let mut store = state.store.write().await;
    let pixel = store.pixels.get_mut(&id).ok_or_else(ApiFailure::not_found)?;
    pixel.name = input.name;
    pixel.pixel_id = input.pixel_id;
    pixel.pixel_type = input.pixel_type;
    Ok(Json(pixel.clone()))
}

async fn delete_pixel(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = state.store.write().await;
    store
        .pixels
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(ApiFailure::not_found)
}

// --- short links ---

async fn create_link(
    State(state): State<AppState>,
    Json(input): Json<CreateLink>,
) -> Result<Json<ShortLink>, ApiFailure> {
    let mut store = state.store.write().await;
    store.insert_link(input).map(Json)
}

async fn get_link(
    State(state): State<AppState>,
    Query(query): Query<ShortUrl>,
) -> Result<Json<ShortLink>, ApiFailure> {
    let store = state.store.read().await;
    store
        .links
        .get(&query.short_url)
        .map(|stored| Json(stored.link.clone()))
        .ok_or_else(ApiFailure::not_found)
}

async fn update_link(
    State(state): State<AppState>,
    Json(input): Json<UpdateLink>,
) -> Result<Json<ShortLink>, ApiFailure> {
    let mut store = state.store.write().await;
    let domain = store
        .links
        .get(&input.short_url)
        .map(|stored| stored.link.domain.clone())
        .ok_or_else(ApiFailure::not_found)?;
    let renamed = input
        .short_id
        .map(|short_id| (format!("{}/{short_id}", domain.trim_end_matches('/')), short_id));
    if let Some((short_url, _)) = &renamed {
        if *short_url != input.short_url && store.links.contains_key(short_url) {
            return Err(ApiFailure::unprocessable("The short id has already been taken."));
        }
    }
    let mut stored = store
        .links
        .remove(&input.short_url)
        .ok_or_else(ApiFailure::not_found)?;

    let link = &mut stored.link;
    link.long_url = input.long_url;
    if let Some((short_url, short_id)) = renamed {
        link.short_url = short_url;
        link.short_id = short_id;
    }
    if let Some(description) = input.description {
        link.description = Some(description);
    }
    if let Some(views) = input.expire_at_views {
        link.expire_at_views = Some(views);
    }
    if let Some(datetime) = input.expire_at_datetime {
        link.expire_at_datetime = Some(datetime);
    }
    if let Some(public_stats) = input.public_stats {
        link.public_stats = public_stats;
    }
    if let Some(meta) = input.meta {
        link.meta = Some(meta);
    }
    if let Some(password) = input.password {
        stored.password = Some(password);
    }
    if let Some(tags) = input.tags {
        stored.tags = tags;
    }
    if let Some(pixels) = input.pixels {
        stored.pixels = pixels;
    }

    let link = stored.link.clone();
    store.links.insert(link.short_url.clone(), stored);
    Ok(Json(link))
}

async fn delete_link(
    State(state): State<AppState>,
    Json(input): Json<ShortUrl>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = state.store.write().await;
    store
        .links
        .remove(&input.short_url)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(ApiFailure::not_found)
}

async fn expand_link(
    State(state): State<AppState>,
    Json(input): Json<ExpandInput>,
) -> Result<Json<ExpandOutput>, ApiFailure> {
    let mut store = state.store.write().await;
    let stored = store
        .links
        .get_mut(&input.short_url)
        .ok_or_else(ApiFailure::not_found)?;
    if stored.password.is_some() && stored.password != input.password {
        return Err(ApiFailure::unauthenticated());
    }
    let expired = stored
        .link
        .expire_at_views
        .is_some_and(|max| stored.clicks >= max);
    if !expired {
        stored.clicks += 1;
    }
    Ok(Json(ExpandOutput {
        long_url: stored.link.long_url.clone(),
        expired,
    }))
}

/// Answers with the matching links encoded into a JSON string.
async fn list_links(
    State(state): State<AppState>,
    Query(filters): Query<HashMap<String, String>>,
) -> Json<String> {
    let store = state.store.read().await;
    let search = filters.get("search").map(String::as_str).unwrap_or("");
    let tag_ids: Vec<u64> = filters
        .get("tag_ids")
        .map(|ids| ids.split(',').filter_map(|id| id.trim().parse().ok()).collect())
        .unwrap_or_default();
    let pixel_ids: Vec<u64> = filters
        .get("pixel_ids")
        .map(|ids| ids.split(',').filter_map(|id| id.trim().parse().ok()).collect())
        .unwrap_or_default();

    let links: Vec<&ShortLink> = store
        .links
        .values()
        .filter(|stored| {
            let link = &stored.link;
            search.is_empty()
                || link.long_url.contains(search)
                || link.short_url.contains(search)
                || link.description.as_deref().is_some_and(|d| d.contains(search))
        })
        .filter(|stored| tag_ids.iter().all(|id| stored.tags.contains(id)))
        .filter(|stored| pixel_ids.iter().all(|id| stored.pixels.contains(id)))
        .map(|stored| &stored.link)
        .collect();
    Json(json!({ "data": links }).to_string())
}

/// Answers with the created links encoded into a JSON string.
async fn bulk_shorten(
    State(state): State<AppState>,
    Json(input): Json<BulkInput>,
) -> Result<Json<String>, ApiFailure> {
    let mut store = state.store.write().await;
    let mut created = Vec::with_capacity(input.links.len());
    for long_url in input.links {
        let link = store.insert_link(CreateLink {
            long_url,
            short_id: None,
            domain: input.domain.clone(),
            expire_at_datetime: None,
            expire_at_views: None,
            description: None,
            public_stats: None,
            password: None,
            tags: input.tags.clone(),
            pixels: input.pixels.clone(),
            meta: None,
        })?;
        created.push(link);
    }
    Ok(Json(json!(created).to_string()))
}

async fn link_stats(
    State(state): State<AppState>,
    Query(query): Query<ShortUrl>,
) -> Result<Json<Stats>, ApiFailure> {
    let store = state.store.read().await;
    let stored = store
        .links
        .get(&query.short_url)
        .ok_or_else(ApiFailure::not_found)?;
    Ok(Json(Stats {
        clicks: stored.clicks,
        unique_clicks: stored.clicks,
        browsers: Vec::new(),
        countries: Vec::new(),
        referrers: Vec::new(),
        platforms: Vec::new(),
        daily_clicks: Vec::new(),
        data: json!({ "short_url": stored.link.short_url }),
    }))
}

// --- tags ---

async fn list_tags(State(state): State<AppState>) -> Json<Vec<Tag>> {
    let store = state.store.read().await;
    Json(store.tags.values().cloned().collect())
}

async fn create_tag(State(state): State<AppState>, Json(input): Json<TagInput>) -> Json<Tag> {
    let mut store = state.store.write().await;
    let tag = Tag {
        id: store.next_id(),
        tag: input.tag,
        created_at: TIMESTAMP.to_string(),
        updated_at: TIMESTAMP.to_string(),
    };
    store.tags.insert(tag.id, tag.clone());
    Json(tag)
}

async fn get_tag(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Tag>, ApiFailure> {
    let store = state.store.read().await;
    store.tags.get(&id).cloned().map(Json).ok_or_else(ApiFailure::not_found)
}

async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(input): Json<TagInput>,
) -> Result<Json<Tag>, ApiFailure> {
    let mut store = state.store.write().await;
    let tag = store.tags.get_mut(&id).ok_or_else(ApiFailure::not_found)?;
    tag.tag = input.tag;
    Ok(Json(tag.clone()))
}

async fn delete_tag(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, ApiFailure> {
    let mut store = state.store.write().await;
    store
        .tags
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(ApiFailure::not_found)
}
