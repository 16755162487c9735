use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use solo_core::{Article, Category, OptionEntry, Page, Tag, User};
use solo_server::renderers::RSS_CONTENT_TYPE;
use solo_server::{router, AppState, ServerConfig};
use solo_storage::repository::{
    ArticleRepository, CategoryRepository, OptionRepository, PageRepository, TagRepository,
    UserRepository,
};
use solo_storage::{DocumentStore, InMemoryStore};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const STATIC_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<static-files>
    <include path="/css/**"/>
    <include path="/favicon.ico"/>
</static-files>"#;

fn webapp() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("WEB-INF")).unwrap();
    std::fs::create_dir_all(dir.path().join("css")).unwrap();
    std::fs::write(dir.path().join("WEB-INF/static-resources.xml"), STATIC_XML).unwrap();
    std::fs::write(dir.path().join("css/base.css"), "body{}").unwrap();
    dir
}

fn config(webapp: &TempDir, context_path: &str) -> ServerConfig {
    ServerConfig {
        webapp_dir: webapp.path().to_path_buf(),
        static_resources: webapp.path().join("WEB-INF/static-resources.xml"),
        context_path: context_path.into(),
        ..Default::default()
    }
}

fn app(webapp: &TempDir, store: Arc<dyn DocumentStore>) -> Router {
    router(AppState::new(config(webapp, ""), store))
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn json_body(bytes: &[u8]) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

#[tokio::test]
async fn health_and_metrics() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let (status, body) = send(app(&dir, store.clone()), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
    let (status, body) = send(app(&dir, store), get("/metrics")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(body).unwrap().contains("static_requests_total"));
}

#[tokio::test]
async fn static_files_are_served_and_others_fall_through() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let (status, body) = send(app(&dir, store.clone()), get("/css/base.css")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"body{}");
    let (status, _) = send(app(&dir, store.clone()), get("/css/missing.css")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(app(&dir, store), get("/no/such/page")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn context_path_prefixes_routes_and_patterns() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let app = router(AppState::new(config(&dir, "/blog"), store));
    let (status, body) = send(app.clone(), get("/blog/css/base.css")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"body{}");
    let (status, _) = send(app.clone(), get("/blog/health")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app, get("/css/base.css")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_static_definition_answers_500() {
    let dir = webapp();
    std::fs::remove_file(dir.path().join("WEB-INF/static-resources.xml")).unwrap();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let (status, body) = send(app(&dir, store), get("/health")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body.is_empty());
}

#[tokio::test]
async fn rss_feed_lists_published_articles() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let articles = ArticleRepository::new(store.clone());
    let mut published = Article::new("Published & live", "/live");
    published.is_published = true;
    articles.add(&published).await.unwrap();
    articles.add(&Article::new("Draft", "/draft")).await.unwrap();
    OptionRepository::new(store.clone())
        .add(&OptionEntry {
            id: Some(OptionEntry::ID_BLOG_TITLE.into()),
            category: OptionEntry::CATEGORY_PREFERENCE.into(),
            value: "Feed Test".into(),
        })
        .await
        .unwrap();

    let resp = app(&dir, store)
        .oneshot(get("/blog-articles-rss.do"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], RSS_CONTENT_TYPE);
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let xml = String::from_utf8(body.to_vec()).unwrap();
    assert!(xml.contains("<title>Feed Test</title>"));
    assert!(xml.contains("Published &amp; live"));
    assert!(xml.contains("http://localhost:8080/live"));
    assert!(!xml.contains("Draft"));
}

#[tokio::test]
async fn option_upsert_and_remove() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let put = |body: Value| {
        Request::builder()
            .method("PUT")
            .uri("/console/option")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    };
    let (status, body) = send(
        app(&dir, store.clone()),
        put(json!({"id": "blogTitle", "category": "preference", "value": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body), json!({"id": "blogTitle"}));
    send(
        app(&dir, store.clone()),
        put(json!({"id": "blogTitle", "category": "preference", "value": "B"})),
    )
    .await;
    let options = OptionRepository::new(store.clone());
    assert_eq!(options.get("blogTitle").await.unwrap().unwrap().value, "B");

    let del = Request::builder()
        .method("DELETE")
        .uri("/console/option/blogTitle")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(app(&dir, store), del).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(options.get("blogTitle").await.unwrap().is_none());
}

#[tokio::test]
async fn permalink_check() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    ArticleRepository::new(store.clone())
        .add(&Article::new("Taken", "/taken"))
        .await
        .unwrap();
    let check = |q: &str| get(&format!("/console/permalink/check?{}", q));

    let (_, body) = send(app(&dir, store.clone()), check("permalink=%2Flogin")).await;
    assert_eq!(
        json_body(&body),
        json!({"permalink": "/login", "invalid": true, "exists": true})
    );
    let (_, body) = send(app(&dir, store.clone()), check("permalink=%2Ftaken")).await;
    assert_eq!(
        json_body(&body),
        json!({"permalink": "/taken", "invalid": false, "exists": true})
    );
    let (_, body) = send(
        app(&dir, store.clone()),
        check("permalink=%2Fpages%2F7.html&kind=page"),
    )
    .await;
    assert_eq!(json_body(&body)["invalid"], json!(false));
    let (_, body) = send(app(&dir, store), check("permalink=%2Fpages%2F7.html")).await;
    assert_eq!(json_body(&body)["invalid"], json!(true));
}

#[tokio::test]
async fn category_navigation() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let repo = CategoryRepository::new(store.clone());
    for (i, title) in ["Rust", "Go", "Zig"].iter().enumerate() {
        repo.add(&Category {
            id: Some(format!("c{}", i)),
            title: title.to_string(),
            order: i as i64,
            ..Default::default()
        })
        .await
        .unwrap();
    }

    let (status, body) = send(app(&dir, store.clone()), get("/console/category/c1/upper")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["id"], json!("c0"));
    let (_, body) = send(app(&dir, store.clone()), get("/console/category/c1/under")).await;
    assert_eq!(json_body(&body)["id"], json!("c2"));
    let (status, _) = send(app(&dir, store.clone()), get("/console/category/c0/upper")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(app(&dir, store.clone()), get("/console/category/c2/under")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(app(&dir, store), get("/console/categories/most-used?n=2")).await;
    let titles: Vec<Value> = json_body(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["title"].clone())
        .collect();
    assert_eq!(titles, vec![json!("Go"), json!("Rust")]);
}

#[tokio::test]
async fn admin_check() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let users = UserRepository::new(store.clone());
    users
        .add(&User {
            name: "root".into(),
            email: "root@solo.dev".into(),
            role: Some(User::ADMIN_ROLE.into()),
            ..Default::default()
        })
        .await
        .unwrap();
    users
        .add(&User {
            name: "broken".into(),
            email: "broken@solo.dev".into(),
            role: None,
            ..Default::default()
        })
        .await
        .unwrap();

    let (status, body) = send(
        app(&dir, store.clone()),
        get("/console/users/is-admin?email=Root%40solo.dev"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({"email": "Root@solo.dev", "admin": true})
    );
    let (_, body) = send(
        app(&dir, store.clone()),
        get("/console/users/is-admin?email=ghost%40solo.dev"),
    )
    .await;
    assert_eq!(json_body(&body)["admin"], json!(false));
    let (status, _) = send(
        app(&dir, store),
        get("/console/users/is-admin?email=broken%40solo.dev"),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn console_lookups() {
    let dir = webapp();
    let store: Arc<dyn DocumentStore> = Arc::new(InMemoryStore::new());
    let categories = CategoryRepository::new(store.clone());
    for (i, title) in ["Rust", "Go"].iter().enumerate() {
        categories
            .add(&Category {
                id: Some(format!("c{}", i)),
                title: title.to_string(),
                uri: title.to_lowercase(),
                order: i as i64,
                ..Default::default()
            })
            .await
            .unwrap();
    }
    let tags = TagRepository::new(store.clone());
    for (title, refs) in [("async", 3u64), ("tokio", 8), ("serde", 5)] {
        tags.add(&Tag {
            title: title.into(),
            reference_count: refs,
            ..Default::default()
        })
        .await
        .unwrap();
    }
    PageRepository::new(store.clone())
        .add(&Page {
            title: "About".into(),
            permalink: "/about".into(),
            order: 4,
            ..Default::default()
        })
        .await
        .unwrap();
    let options = OptionRepository::new(store.clone());
    for (id, category) in [("blogTitle", "preference"), ("viewCount", "statistic")] {
        options
            .add(&OptionEntry {
                id: Some(id.into()),
                category: category.into(),
                value: "v".into(),
            })
            .await
            .unwrap();
    }
    UserRepository::new(store.clone())
        .add(&User {
            name: "root".into(),
            email: "root@solo.dev".into(),
            role: Some(User::ADMIN_ROLE.into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let (_, body) = send(app(&dir, store.clone()), get("/console/categories/lookup?title=Go")).await;
    assert_eq!(json_body(&body)["id"], json!("c1"));
    let (_, body) = send(app(&dir, store.clone()), get("/console/categories/lookup?uri=rust")).await;
    assert_eq!(json_body(&body)["id"], json!("c0"));
    let (status, _) = send(app(&dir, store.clone()), get("/console/categories/lookup")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, body) = send(app(&dir, store.clone()), get("/console/categories/max-order")).await;
    assert_eq!(json_body(&body), json!({"maxOrder": 1}));
    let (_, body) = send(app(&dir, store.clone()), get("/console/categories/by-order/0")).await;
    assert_eq!(json_body(&body)["title"], json!("Rust"));
    let (status, _) = send(app(&dir, store.clone()), get("/console/categories/by-order/9")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(app(&dir, store.clone()), get("/console/tags/most-used?n=2")).await;
    let titles: Vec<Value> = json_body(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["title"].clone())
        .collect();
    assert_eq!(titles, vec![json!("serde"), json!("tokio")]);
    let (status, _) = send(app(&dir, store.clone()), get("/console/tags/lookup?title=async")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app(&dir, store.clone()), get("/console/tags/lookup?title=nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(app(&dir, store.clone()), get("/console/pages")).await;
    let pages = json_body(&body);
    assert_eq!(pages["maxOrder"], json!(4));
    assert_eq!(pages["pages"][0]["permalink"], json!("/about"));

    let (_, body) = send(app(&dir, store.clone()), get("/console/options?category=statistic")).await;
    assert_eq!(json_body(&body)[0]["id"], json!("viewCount"));

    let (_, body) = send(app(&dir, store.clone()), get("/console/users/admin")).await;
    assert_eq!(json_body(&body)["email"], json!("root@solo.dev"));
    let (status, _) = send(
        app(&dir, store.clone()),
        get("/console/users/lookup?email=ROOT%40solo.dev"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(app(&dir, store), get("/console/users/lookup?email=x%40solo.dev")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
