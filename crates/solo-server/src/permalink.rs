//! Permalink classification.
//!
//! A permalink is either system generated (`/articles/yyyy/MM/dd/{id}.html`,
//! `/pages/{id}.html`) or user defined. User-defined permalinks are a single
//! path segment that is not reserved, not purely numeric and forms a valid
//! URL under the public server base.

use once_cell::sync::Lazy;
use regex::Regex;
use solo_core::util::is_blank;
use url::Url;

/// Paths owned by the system; never assignable as user permalinks.
pub const RESERVED_LINKS: &[&str] = &[
    "/",
    "/article",
    "/tags.html",
    "/tags",
    "/page",
    "/blog-articles-feed.do",
    "/tag-articles-feed.do",
    "/blog-articles-rss.do",
    "/tag-articles-rss.do",
    "/get-random-articles.do",
    "/article-random-double-gen.do",
    "/captcha.do",
    "/kill-browser",
    "/add-article-comment.do",
    "/add-article-from-symphony-comment.do",
    "/add-page-comment.do",
    "/get-article-content",
    "/sitemap.xml",
    "/login",
    "/logout",
    "/forgot",
    "/get-article-content",
    "/admin-index.do",
    "/admin-article.do",
    "/admin-article-list.do",
    "/admin-link-list.do",
    "/admin-preference.do",
    "/admin-file-list.do",
    "/admin-page-list.do",
    "/admin-others.do",
    "/admin-draft-list.do",
    "/admin-user-list.do",
    "/admin-plugin-list.do",
    "/admin-main.do",
    "/admin-about.do",
    "/admin-label",
    "/admin-about.do",
    "/rm-all-data.do",
    "/init",
    "/register.html",
];

static DEFAULT_ARTICLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/articles/[0-9]{4}/[0-9]{2}/[0-9]{2}/[0-9]+\.html$").unwrap()
});
static DEFAULT_PAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^/pages/[0-9]+\.html$").unwrap());
// RFC 3986 path characters, ASCII only
static URL_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/[-A-Za-z0-9_:@&=+,.!/~*'%$;()]*)?$").unwrap());

/// `/articles/yyyy/MM/dd/{digits}.html`; dates are not checked.
pub fn matches_default_article_format(permalink: &str) -> bool {
    DEFAULT_ARTICLE.is_match(permalink)
}

/// `/pages/{digits}.html`.
pub fn matches_default_page_format(permalink: &str) -> bool {
    DEFAULT_PAGE.is_match(permalink)
}

pub fn invalid_article_permalink(permalink: &str, server: &str) -> bool {
    if is_blank(permalink) {
        return true;
    }
    if matches_default_article_format(permalink) {
        return false;
    }
    invalid_user_defined_permalink(permalink, server)
}

pub fn invalid_page_permalink(permalink: &str, server: &str) -> bool {
    if is_blank(permalink) {
        return true;
    }
    if matches_default_page_format(permalink) {
        return false;
    }
    invalid_user_defined_permalink(permalink, server)
}

/// Invalid both as an article and as a page permalink.
pub fn invalid_permalink(permalink: &str, server: &str) -> bool {
    invalid_article_permalink(permalink, server) && invalid_page_permalink(permalink, server)
}

/// Rules are checked in order, the first hit wins.
pub fn invalid_user_defined_permalink(permalink: &str, server: &str) -> bool {
    if is_blank(permalink) {
        return true;
    }
    if is_reserved_link(permalink) {
        return true;
    }
    let tail: String = permalink.chars().skip(1).collect();
    if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()) {
        return true;
    }
    if permalink.matches('/').count() > 1 {
        return true;
    }
    !is_valid_url(server, permalink)
}

/// True when some reserved entry starts with `uri`. Note the direction:
/// `/admin` is reserved (a prefix of `/admin-index.do`) while
/// `/admin-index.do/x` is not.
pub fn is_reserved_link(uri: &str) -> bool {
    RESERVED_LINKS.iter().any(|reserved| reserved.starts_with(uri))
}

fn is_valid_url(server: &str, permalink: &str) -> bool {
    if Url::parse(&format!("{}{}", server, permalink)).is_err() {
        return false;
    }
    let without_fragment = permalink.split('#').next().unwrap_or_default();
    let (path, query) = match without_fragment.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (without_fragment, None),
    };
    if !URL_PATH.is_match(path) || path.contains("//") {
        return false;
    }
    // "/." and "/.." resolve to the site root
    if path.split('/').any(|seg| seg == "." || seg == "..") {
        return false;
    }
    query.map_or(true, |q| !q.chars().any(char::is_whitespace))
}
