//! Filter evaluation and ordering over raw documents.
//!
//! Numbers compare numerically regardless of int/float representation,
//! strings lexicographically. Values of different JSON types never satisfy
//! a comparison, and a missing property matches no predicate.

use serde_json::Value;
use solo_core::{Document, Filter, FilterOperator, PropertyFilter, SortDirection};
use std::cmp::Ordering;

pub fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::Property(p) => matches_property(doc, p),
        Filter::And(all) => all.iter().all(|f| matches(doc, f)),
        Filter::Or(any) => any.iter().any(|f| matches(doc, f)),
    }
}

fn matches_property(doc: &Document, filter: &PropertyFilter) -> bool {
    let actual = match doc.get(filter.property()) {
        Some(v) if !v.is_null() => v,
        _ => return false,
    };
    let expected = filter.value();
    match filter.operator() {
        FilterOperator::Equal => values_equal(actual, expected),
        FilterOperator::NotEqual => !values_equal(actual, expected),
        FilterOperator::LessThan => same_type_cmp(actual, expected) == Some(Ordering::Less),
        FilterOperator::LessThanOrEqual => matches!(
            same_type_cmp(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        FilterOperator::GreaterThan => {
            same_type_cmp(actual, expected) == Some(Ordering::Greater)
        }
        FilterOperator::GreaterThanOrEqual => matches!(
            same_type_cmp(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOperator::In => match expected {
            Value::Array(candidates) => candidates.iter().any(|c| values_equal(actual, c)),
            single => values_equal(actual, single),
        },
        FilterOperator::Like => like(actual, expected).unwrap_or(false),
        FilterOperator::NotLike => like(actual, expected).map(|m| !m).unwrap_or(false),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => same_type_cmp(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

fn same_type_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(xi), Some(yi)) = (x.as_i64(), y.as_i64()) {
                return Some(xi.cmp(&yi));
            }
            x.as_f64()?.partial_cmp(&y.as_f64()?)
        }
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn like(actual: &Value, pattern: &Value) -> Option<bool> {
    match (actual, pattern) {
        (Value::String(s), Value::String(p)) => Some(like_match(p, s)),
        _ => None,
    }
}

/// SQL `LIKE`: `%` matches any run of characters, `_` exactly one.
pub fn like_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();
    let (mut pi, mut ti) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;
    while ti < t.len() {
        if pi < p.len() && p[pi] == '%' {
            star = Some((pi, ti));
            pi += 1;
        } else if pi < p.len() && (p[pi] == '_' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if let Some((sp, st)) = star {
            pi = sp + 1;
            ti = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    p[pi..].iter().all(|c| *c == '%')
}

/// Total order used for sorting: missing < null < bool < number < string,
/// arrays and objects compare equal among themselves.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    }
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => rank(x)
            .cmp(&rank(y))
            .then_with(|| same_type_cmp(x, y).unwrap_or(Ordering::Equal)),
    }
}

pub fn sort_documents(docs: &mut [Document], sorts: &[(String, SortDirection)]) {
    if sorts.is_empty() {
        return;
    }
    docs.sort_by(|a, b| {
        for (property, direction) in sorts {
            let ord = compare_values(a.get(property), b.get(property));
            let ord = match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(v: Value) -> Document {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    fn pf(p: &str, op: FilterOperator, v: Value) -> Filter {
        PropertyFilter::new(p, op, v).into()
    }

    #[test]
    fn numeric_comparisons_cross_int_and_float() {
        let d = doc(json!({"order": 3}));
        assert!(matches(&d, &pf("order", FilterOperator::Equal, json!(3.0))));
        assert!(matches(&d, &pf("order", FilterOperator::LessThan, json!(3.5))));
        assert!(matches(&d, &pf("order", FilterOperator::GreaterThanOrEqual, json!(3))));
        assert!(!matches(&d, &pf("order", FilterOperator::GreaterThan, json!(3))));
        assert!(matches(&d, &pf("order", FilterOperator::LessThanOrEqual, json!(3))));
    }

    #[test]
    fn missing_and_mismatched_never_match() {
        let d = doc(json!({"title": "x"}));
        assert!(!matches(&d, &pf("order", FilterOperator::NotEqual, json!(1))));
        assert!(!matches(&d, &pf("title", FilterOperator::LessThan, json!(1))));
        assert!(matches(&d, &pf("title", FilterOperator::NotEqual, json!("y"))));
    }

    #[test]
    fn in_and_like() {
        let d = doc(json!({"role": "adminRole", "title": "Hello Rust"}));
        assert!(matches(
            &d,
            &pf("role", FilterOperator::In, json!(["defaultRole", "adminRole"]))
        ));
        assert!(matches(&d, &pf("title", FilterOperator::Like, json!("Hello%"))));
        assert!(matches(&d, &pf("title", FilterOperator::Like, json!("%R_st"))));
        assert!(matches(&d, &pf("title", FilterOperator::NotLike, json!("%Go%"))));
        assert!(!matches(&d, &pf("title", FilterOperator::Like, json!("Rust%"))));
    }

    #[test]
    fn like_edge_cases() {
        assert!(like_match("", ""));
        assert!(like_match("%", ""));
        assert!(!like_match("_", ""));
        assert!(like_match("a%b%c", "aXXbYc"));
        assert!(!like_match("a%b%c", "aXXbY"));
    }

    #[test]
    fn composite_filters() {
        let d = doc(json!({"order": 2, "title": "b"}));
        let and = Filter::And(vec![
            pf("order", FilterOperator::GreaterThan, json!(1)),
            pf("title", FilterOperator::Equal, json!("b")),
        ]);
        let or = Filter::Or(vec![
            pf("order", FilterOperator::GreaterThan, json!(5)),
            pf("title", FilterOperator::Equal, json!("b")),
        ]);
        assert!(matches(&d, &and));
        assert!(matches(&d, &or));
        assert!(!matches(&d, &Filter::Or(vec![])));
    }

    #[test]
    fn multi_key_sort() {
        let mut docs = vec![
            doc(json!({"a": 1, "b": "y"})),
            doc(json!({"a": 2, "b": "x"})),
            doc(json!({"a": 1, "b": "z"})),
            doc(json!({"b": "w"})),
        ];
        sort_documents(
            &mut docs,
            &[
                ("a".into(), SortDirection::Descending),
                ("b".into(), SortDirection::Ascending),
            ],
        );
        let bs: Vec<&str> = docs.iter().map(|d| d["b"].as_str().unwrap()).collect();
        assert_eq!(bs, vec!["x", "y", "z", "w"]);
    }
}
