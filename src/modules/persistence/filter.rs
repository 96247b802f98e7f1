//! Query arguments passed through the entity store: filters, column
//! assignments, and list options.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::modules::persistence::table::{DELETED_AT, ID};

/// A bindable column value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// JSON form, matching how rows come back from the store
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => json!(b),
            FieldValue::Int(i) => json!(i),
            FieldValue::Text(s) => json!(s),
            FieldValue::Uuid(u) => json!(u),
            FieldValue::Timestamp(ts) => json!(ts),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Int(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Int(i64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Uuid(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

/// A predicate on one column
#[derive(Debug, Clone, PartialEq)]
pub enum Condition<V = FieldValue> {
    Eq(V),
    Ne(V),
    /// Strictly less than; never matches NULL
    Lt(V),
    In(Vec<V>),
    IsNull,
    IsNotNull,
}

/// AND-combined column predicates, at most one per column
#[derive(Debug, Clone, PartialEq)]
pub struct Filter<V = FieldValue> {
    conditions: BTreeMap<String, Condition<V>>,
}

impl<V> Default for Filter<V> {
    fn default() -> Self {
        Self {
            conditions: BTreeMap::new(),
        }
    }
}

impl<V> Filter<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, condition: Condition<V>) -> Self {
        self.conditions.insert(column.into(), condition);
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<V>) -> Self {
        self.with(column, Condition::Eq(value.into()))
    }

    pub fn is_null(self, column: impl Into<String>) -> Self {
        self.with(column, Condition::IsNull)
    }

    pub fn is_not_null(self, column: impl Into<String>) -> Self {
        self.with(column, Condition::IsNotNull)
    }

    /// AND-combine with `other`; where both constrain a column, `other` wins
    pub fn merge(mut self, other: Filter<V>) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Condition<V>> {
        self.conditions.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition<V>)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

impl Filter<FieldValue> {
    pub fn by_id(id: Uuid) -> Self {
        Self::new().eq(ID, id)
    }
}

/// Predicate selecting LIVE rows
pub fn live<V>() -> Filter<V> {
    Filter::new().is_null(DELETED_AT)
}

/// Predicate selecting TOMBSTONED rows
pub fn tombstoned<V>() -> Filter<V> {
    Filter::new().is_not_null(DELETED_AT)
}

/// Column assignments for inserts and updates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changes {
    values: BTreeMap<String, FieldValue>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Set only when a value is present (PATCH semantics)
    pub fn set_some<T: Into<FieldValue>>(
        self,
        column: impl Into<String>,
        value: Option<T>,
    ) -> Self {
        match value {
            Some(value) => self.set(column, value),
            None => self,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// Ordering and paging for list queries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub order_by: Vec<(String, SortDirection)>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push((column.into(), direction));
        self
    }

    pub fn paginate(mut self, offset: i64, limit: i64) -> Self {
        self.offset = Some(offset);
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_lets_later_filter_win() {
        let caller: Filter = Filter::new()
            .eq("name", "Aria")
            .is_not_null(DELETED_AT);

        let scoped = caller.merge(live());
        assert_eq!(scoped.get(DELETED_AT), Some(&Condition::IsNull));
        assert_eq!(
            scoped.get("name"),
            Some(&Condition::Eq(FieldValue::Text("Aria".to_string())))
        );
    }

    #[test]
    fn test_merge_is_generic_over_value_type() {
        let filter: Filter<&str> = Filter::new().eq("slug", "home").merge(tombstoned());
        assert_eq!(filter.get("slug"), Some(&Condition::Eq("home")));
        assert_eq!(filter.get(DELETED_AT), Some(&Condition::IsNotNull));
    }

    #[test]
    fn test_changes_set_some_skips_absent() {
        let changes = Changes::new()
            .set_some("name", Some("Kai"))
            .set_some::<String>("description", None);
        let columns: Vec<&str> = changes.iter().map(|(k, _)| k).collect();
        assert_eq!(columns, vec!["name"]);
    }

    #[test]
    fn test_option_into_field_value() {
        assert_eq!(FieldValue::from(None::<Uuid>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3i64)), FieldValue::Int(3));
    }
}
