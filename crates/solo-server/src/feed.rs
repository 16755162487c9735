use maud::{html, PreEscaped};
use solo_core::Article;

const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

pub struct Channel<'a> {
    pub title: &'a str,
    pub description: &'a str,
    /// Absolute blog URL, context path included.
    pub link: &'a str,
}

/// Builds an RSS 2.0 document for the given articles, in the given order.
pub fn build_rss(channel: &Channel<'_>, articles: &[Article]) -> String {
    let last_build = articles.iter().map(|a| a.updated).max();
    let markup = html! {
        (PreEscaped(XML_DECL))
        rss version="2.0" {
            channel {
                title { (channel.title) }
                link { (channel.link) }
                description { (channel.description) }
                generator { "Solo" }
                @if let Some(latest) = last_build {
                    lastBuildDate { (latest.to_rfc2822()) }
                }
                @for article in articles {
                    @let link = format!("{}{}", channel.link, article.permalink);
                    item {
                        title { (article.title) }
                        link { (link) }
                        description { (article.summary) }
                        @if !article.author_email.is_empty() {
                            author { (article.author_email) }
                        }
                        @for tag in article.tags.split(',').map(str::trim).filter(|t| !t.is_empty()) {
                            category { (tag) }
                        }
                        guid { (link) }
                        pubDate { (article.created.to_rfc2822()) }
                    }
                }
            }
        }
    };
    markup.into_string()
}
