use crate::config::ServerConfig;
use crate::error::AppError;
use crate::feed::{build_rss, Channel};
use crate::metrics::gather_text;
use crate::permalink::{invalid_article_permalink, invalid_page_permalink};
use crate::renderers::{Http500Renderer, JsonRenderer, RssRenderer};
use crate::services::{OptionMgmtService, PermalinkQueryService};
use crate::static_resources::StaticResources;
use axum::extract::{Path, Query, Request, State};
use axum::http::{StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use solo_core::OptionEntry;
use solo_storage::repository::{
    ArticleRepository, CategoryRepository, PageRepository, TagRepository, UserRepository,
};
use solo_storage::DocumentStore;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::debug;

/// Items in the blog feed.
const FEED_ITEMS: usize = 10;
const MOST_USED_DEFAULT: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub statics: Arc<StaticResources>,
    pub options: OptionMgmtService,
    pub permalinks: PermalinkQueryService,
    pub articles: ArticleRepository,
    pub categories: CategoryRepository,
    pub tags: TagRepository,
    pub pages: PageRepository,
    pub users: UserRepository,
    static_files: ServeDir,
}

impl AppState {
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        let statics = StaticResources::new(&config.static_resources, config.context_path.clone());
        Self {
            statics: Arc::new(statics),
            options: OptionMgmtService::new(store.clone()),
            permalinks: PermalinkQueryService::new(store.clone()),
            articles: ArticleRepository::new(store.clone()),
            categories: CategoryRepository::new(store.clone()),
            tags: TagRepository::new(store.clone()),
            pages: PageRepository::new(store.clone()),
            users: UserRepository::new(store),
            static_files: ServeDir::new(&config.webapp_dir),
            config: Arc::new(config),
        }
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .route("/blog-articles-rss.do", get(blog_articles_rss))
        .route("/console/option", put(put_option))
        .route("/console/option/:id", delete(delete_option))
        .route("/console/options", get(options_by_category))
        .route("/console/permalink/check", get(check_permalink))
        .route("/console/categories/most-used", get(most_used_categories))
        .route("/console/categories/lookup", get(lookup_category))
        .route("/console/categories/max-order", get(category_max_order))
        .route("/console/categories/by-order/:order", get(category_by_order))
        .route("/console/category/:id/upper", get(upper_category))
        .route("/console/category/:id/under", get(under_category))
        .route("/console/tags/most-used", get(most_used_tags))
        .route("/console/tags/lookup", get(lookup_tag))
        .route("/console/pages", get(list_pages))
        .route("/console/users/is-admin", get(is_admin))
        .route("/console/users/admin", get(admin_user))
        .route("/console/users/lookup", get(lookup_user));
    let ctx = state.config.context_path.clone();
    let app = if ctx.is_empty() {
        api
    } else {
        Router::new().nest(&ctx, api)
    };
    app.fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), static_gate))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

/// Static requests are answered from the webapp directory before routing.
async fn static_gate(State(app): State<AppState>, mut req: Request, next: Next) -> Response {
    match app.statics.is_static(&mut req) {
        Ok(false) => next.run(req).await,
        Ok(true) => serve_static(&app, req).await,
        Err(e) => AppError::from(e).into_response(),
    }
}

async fn serve_static(app: &AppState, mut req: Request) -> Response {
    let ctx = app.config.context_path.as_str();
    if !ctx.is_empty() {
        let stripped = match req.uri().path().strip_prefix(ctx) {
            Some("") | None => "/".to_string(),
            Some(p) => p.to_string(),
        };
        match Uri::try_from(stripped) {
            Ok(uri) => *req.uri_mut() = uri,
            Err(e) => return Http500Renderer::new(e).into_response(),
        }
    }
    debug!(path = %req.uri().path(), "serving static resource");
    match app.static_files.clone().oneshot(req).await {
        Ok(resp) => resp.into_response(),
        Err(never) => match never {},
    }
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn metrics() -> impl IntoResponse {
    (StatusCode::OK, gather_text())
}

async fn not_found() -> impl IntoResponse {
    StatusCode::NOT_FOUND
}

/// JSON body when present, bare 404 otherwise.
fn found<T: Serialize>(entity: Option<T>) -> Response {
    match entity {
        Some(e) => JsonRenderer(e).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn blog_articles_rss(State(app): State<AppState>) -> Result<RssRenderer, AppError> {
    let title = app
        .options
        .get_option(OptionEntry::ID_BLOG_TITLE)
        .await?
        .map(|o| o.value)
        .unwrap_or_else(|| app.config.blog_title.clone());
    let subtitle = app
        .options
        .get_option(OptionEntry::ID_BLOG_SUBTITLE)
        .await?
        .map(|o| o.value)
        .unwrap_or_default();
    let articles = app.articles.get_recent_published(FEED_ITEMS).await?;
    let link = format!("{}{}", app.config.server(), app.config.context_path);
    let channel = Channel {
        title: &title,
        description: &subtitle,
        link: &link,
    };
    Ok(RssRenderer::new(build_rss(&channel, &articles)))
}

async fn put_option(
    State(app): State<AppState>,
    Json(option): Json<OptionEntry>,
) -> Result<impl IntoResponse, AppError> {
    let id = app.options.add_or_update_option(option).await?;
    Ok(JsonRenderer(json!({ "id": id })))
}

async fn delete_option(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    app.options.remove_option(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PermalinkKind {
    #[default]
    Article,
    Page,
}

#[derive(Debug, Deserialize)]
struct PermalinkCheck {
    permalink: String,
    #[serde(default)]
    kind: PermalinkKind,
}

async fn check_permalink(
    State(app): State<AppState>,
    Query(q): Query<PermalinkCheck>,
) -> impl IntoResponse {
    let server = app.config.server();
    let invalid = match q.kind {
        PermalinkKind::Article => invalid_article_permalink(&q.permalink, &server),
        PermalinkKind::Page => invalid_page_permalink(&q.permalink, &server),
    };
    let exists = app.permalinks.exists(&q.permalink).await;
    JsonRenderer(json!({
        "permalink": q.permalink,
        "invalid": invalid,
        "exists": exists,
    }))
}

#[derive(Debug, Deserialize)]
struct MostUsed {
    n: Option<usize>,
}

async fn most_used_categories(
    State(app): State<AppState>,
    Query(q): Query<MostUsed>,
) -> Result<impl IntoResponse, AppError> {
    let n = q.n.unwrap_or(MOST_USED_DEFAULT);
    Ok(JsonRenderer(app.categories.get_most_used_categories(n).await?))
}

async fn upper_category(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    Ok(found(app.categories.get_upper(&id).await?))
}

async fn under_category(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    Ok(found(app.categories.get_under(&id).await?))
}

#[derive(Debug, Deserialize)]
struct CategoryLookup {
    title: Option<String>,
    uri: Option<String>,
}

/// By title when given, else by URI.
async fn lookup_category(
    State(app): State<AppState>,
    Query(q): Query<CategoryLookup>,
) -> Result<Response, AppError> {
    let category = match (q.title, q.uri) {
        (Some(title), _) => app.categories.get_by_title(&title).await?,
        (None, Some(uri)) => app.categories.get_by_uri(&uri).await?,
        (None, None) => return Ok(StatusCode::BAD_REQUEST.into_response()),
    };
    Ok(found(category))
}

async fn category_max_order(State(app): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let max = app.categories.get_max_order().await?;
    Ok(JsonRenderer(json!({ "maxOrder": max })))
}

async fn category_by_order(
    State(app): State<AppState>,
    Path(order): Path<i64>,
) -> Result<Response, AppError> {
    Ok(found(app.categories.get_by_order(order).await?))
}

async fn most_used_tags(
    State(app): State<AppState>,
    Query(q): Query<MostUsed>,
) -> Result<impl IntoResponse, AppError> {
    let n = q.n.unwrap_or(MOST_USED_DEFAULT);
    Ok(JsonRenderer(app.tags.get_most_used_tags(n).await?))
}

#[derive(Debug, Deserialize)]
struct TitleQuery {
    title: String,
}

async fn lookup_tag(
    State(app): State<AppState>,
    Query(q): Query<TitleQuery>,
) -> Result<Response, AppError> {
    Ok(found(app.tags.get_by_title(&q.title).await?))
}

async fn list_pages(State(app): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pages = app.pages.get_pages().await?;
    let max_order = app.pages.get_max_order().await?;
    Ok(JsonRenderer(json!({ "pages": pages, "maxOrder": max_order })))
}

#[derive(Debug, Deserialize)]
struct CategoryQuery {
    category: String,
}

async fn options_by_category(
    State(app): State<AppState>,
    Query(q): Query<CategoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    Ok(JsonRenderer(
        app.options.get_options_by_category(&q.category).await?,
    ))
}

async fn admin_user(State(app): State<AppState>) -> Response {
    found(app.users.get_admin().await)
}

#[derive(Debug, Deserialize)]
struct EmailQuery {
    email: String,
}

async fn is_admin(
    State(app): State<AppState>,
    Query(q): Query<EmailQuery>,
) -> Result<impl IntoResponse, AppError> {
    let admin = app.users.is_admin_email(&q.email).await?;
    Ok(JsonRenderer(json!({ "email": q.email, "admin": admin })))
}

/// Strict lookup: a store failure is a 500, not a 404.
async fn lookup_user(
    State(app): State<AppState>,
    Query(q): Query<EmailQuery>,
) -> Result<Response, AppError> {
    Ok(found(app.users.find_by_email(&q.email).await?))
}
