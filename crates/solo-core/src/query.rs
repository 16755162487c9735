use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Equal,
    NotEqual,
    In,
    /// SQL-style pattern: `%` any run, `_` one character.
    Like,
    NotLike,
}

/// A single predicate against one document property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFilter {
    property: String,
    operator: FilterOperator,
    value: JsonValue,
}

impl PropertyFilter {
    pub fn new(
        property: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<JsonValue>,
    ) -> Self {
        Self {
            property: property.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn value(&self) -> &JsonValue {
        &self.value
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    Property(PropertyFilter),
    And(Vec<Filter>),
    Or(Vec<Filter>),
}

impl From<PropertyFilter> for Filter {
    fn from(f: PropertyFilter) -> Self {
        Filter::Property(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Filter, ordering and paging for one store call. Built and thrown away per
/// call; values are not validated here, the store decides what to reject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub filter: Option<Filter>,
    pub sorts: Vec<(String, SortDirection)>,
    pub current_page_num: usize,
    // None = one unbounded page
    pub page_size: Option<usize>,
    pub page_count: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            filter: None,
            sorts: Vec::new(),
            current_page_num: 1,
            page_size: None,
            page_count: None,
        }
    }
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filter(mut self, filter: impl Into<Filter>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Appends a sort key. A property sorted twice keeps its first position
    /// and takes the latest direction.
    pub fn add_sort(mut self, property: impl Into<String>, direction: SortDirection) -> Self {
        let property = property.into();
        match self.sorts.iter_mut().find(|(p, _)| *p == property) {
            Some(entry) => entry.1 = direction,
            None => self.sorts.push((property, direction)),
        }
        self
    }

    pub fn set_current_page_num(mut self, page: usize) -> Self {
        self.current_page_num = page;
        self
    }

    pub fn set_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn set_page_count(mut self, count: usize) -> Self {
        self.page_count = Some(count);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_count: usize,
    pub record_count: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    pub results: Vec<crate::Document>,
    pub pagination: Pagination,
}

impl QueryResult {
    pub fn first(&self) -> Option<&crate::Document> {
        self.results.first()
    }
}
