use crate::errors::{RepositoryError, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Open property bag as held by the document store.
pub type Document = serde_json::Map<String, JsonValue>;

pub type EntityId = String; // ULID string unless supplied by the caller

/// Property under which every document keeps its id.
pub const ID: &str = "id";

/// A typed record stored as a document in its own table.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const TABLE: &'static str;

    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: EntityId);

    fn to_document(&self) -> Result<Document> {
        match serde_json::to_value(self)? {
            JsonValue::Object(map) => Ok(map),
            other => Err(RepositoryError::malformed(
                Self::TABLE,
                format!("expected an object, got {}", other),
            )),
        }
    }

    fn from_document(doc: Document) -> Result<Self> {
        serde_json::from_value(JsonValue::Object(doc))
            .map_err(|e| RepositoryError::malformed(Self::TABLE, e.to_string()))
    }
}

macro_rules! entity {
    ($ty:ty, $table:expr) => {
        impl Entity for $ty {
            const TABLE: &'static str = $table;

            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn set_id(&mut self, id: EntityId) {
                self.id = Some(id);
            }
        }
    };
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub description: String,
    /// Unique and dense per blog; callers keep it that way.
    pub order: i64,
    #[serde(default)]
    pub tag_count: u64,
}

impl Category {
    pub const TITLE: &'static str = "title";
    pub const URI: &'static str = "uri";
    pub const ORDER: &'static str = "order";
}

entity!(Category, "category");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    #[serde(default)]
    pub reference_count: u64,
    #[serde(default)]
    pub published_ref_count: u64,
}

impl Tag {
    pub const TITLE: &'static str = "title";
    pub const REFERENCE_COUNT: &'static str = "reference_count";
}

entity!(Tag, "tag");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub name: String,
    pub email: String,
    // Absent role is representable so a damaged record can be reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl User {
    pub const EMAIL: &'static str = "email";
    pub const ROLE: &'static str = "role";

    pub const ADMIN_ROLE: &'static str = "adminRole";
    pub const DEFAULT_ROLE: &'static str = "defaultRole";
    pub const VISITOR_ROLE: &'static str = "visitorRole";
}

entity!(User, "user");

/// A blog preference or other keyed setting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub value: String,
}

impl OptionEntry {
    pub const CATEGORY: &'static str = "category";
    pub const VALUE: &'static str = "value";

    pub const CATEGORY_PREFERENCE: &'static str = "preference";
    pub const ID_BLOG_TITLE: &'static str = "blogTitle";
    pub const ID_BLOG_SUBTITLE: &'static str = "blogSubtitle";
}

entity!(OptionEntry, "option");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    pub permalink: String,
    #[serde(default, rename = "abstract")]
    pub summary: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub is_published: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated: DateTime<Utc>,
}

impl Article {
    pub const PERMALINK: &'static str = "permalink";
    pub const IS_PUBLISHED: &'static str = "is_published";
    pub const CREATED: &'static str = "created";

    pub fn new(title: impl Into<String>, permalink: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            title: title.into(),
            permalink: permalink.into(),
            summary: String::new(),
            content: String::new(),
            author_email: String::new(),
            tags: String::new(),
            is_published: false,
            created: now,
            updated: now,
        }
    }
}

entity!(Article, "article");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub title: String,
    pub permalink: String,
    #[serde(default)]
    pub content: String,
    pub order: i64,
}

impl Page {
    pub const PERMALINK: &'static str = "permalink";
    pub const ORDER: &'static str = "order";
}

entity!(Page, "page");
