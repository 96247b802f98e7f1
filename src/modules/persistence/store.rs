use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::core::error::{AppError, Result};
use crate::modules::persistence::filter::{
    Changes, Condition, FieldValue, Filter, FindOptions, SortDirection,
};
use crate::modules::persistence::table::{Table, UPDATED_AT};
use crate::shared::validation::IDENTIFIER_REGEX;

/// A row as returned by the store, keyed by column name
pub type Row = Value;

/// Table-generic persistence operations.
///
/// Implementations apply filters exactly as given; scoping to live rows is
/// the job of the soft-delete guard layered on top.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn create(&self, table: Table, values: &Changes) -> Result<Row>;

    async fn find_first(&self, table: Table, filter: &Filter) -> Result<Option<Row>>;

    async fn find_many(
        &self,
        table: Table,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Row>>;

    /// Update the first matching row and return it
    async fn update(&self, table: Table, filter: &Filter, changes: &Changes)
        -> Result<Option<Row>>;

    async fn update_many(&self, table: Table, filter: &Filter, changes: &Changes) -> Result<u64>;

    async fn delete_many(&self, table: Table, filter: &Filter) -> Result<u64>;

    async fn count(&self, table: Table, filter: &Filter) -> Result<i64>;
}

/// Deserialize a store row into a typed model
pub fn decode<T: DeserializeOwned>(row: Row) -> Result<T> {
    serde_json::from_value(row)
        .map_err(|e| AppError::Internal(format!("Failed to decode row: {}", e)))
}

pub fn decode_all<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>> {
    rows.into_iter().map(decode).collect()
}

/// PostgreSQL-backed store. Rows are projected with `to_jsonb` so every
/// table shares one code path.
#[derive(Clone)]
pub struct PgEntityStore {
    pool: PgPool,
}

impl PgEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn check_identifier(column: &str) -> Result<&str> {
    if IDENTIFIER_REGEX.is_match(column) {
        Ok(column)
    } else {
        Err(AppError::BadRequest(format!("Invalid column name: {}", column)))
    }
}

fn push_value(qb: &mut QueryBuilder<'static, Postgres>, value: &FieldValue) {
    match value {
        FieldValue::Null => {
            qb.push("NULL");
        }
        FieldValue::Bool(b) => {
            qb.push_bind(*b);
        }
        FieldValue::Int(i) => {
            qb.push_bind(*i);
        }
        FieldValue::Text(s) => {
            qb.push_bind(s.clone());
        }
        FieldValue::Uuid(u) => {
            qb.push_bind(*u);
        }
        FieldValue::Timestamp(ts) => {
            qb.push_bind(*ts);
        }
    }
}

fn push_where(qb: &mut QueryBuilder<'static, Postgres>, filter: &Filter) -> Result<()> {
    let mut first = true;
    for (column, condition) in filter.iter() {
        let column = check_identifier(column)?;
        qb.push(if first { " WHERE " } else { " AND " });
        first = false;

        match condition {
            Condition::IsNull | Condition::Eq(FieldValue::Null) => {
                qb.push("t.").push(column).push(" IS NULL");
            }
            Condition::IsNotNull | Condition::Ne(FieldValue::Null) => {
                qb.push("t.").push(column).push(" IS NOT NULL");
            }
            Condition::Eq(value) => {
                qb.push("t.").push(column).push(" = ");
                push_value(qb, value);
            }
            Condition::Ne(value) => {
                qb.push("t.").push(column).push(" IS DISTINCT FROM ");
                push_value(qb, value);
            }
            Condition::Lt(value) => {
                qb.push("t.").push(column).push(" < ");
                push_value(qb, value);
            }
            Condition::In(values) if values.is_empty() => {
                qb.push("FALSE");
            }
            Condition::In(values) => {
                qb.push("t.").push(column).push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        qb.push(", ");
                    }
                    push_value(qb, value);
                }
                qb.push(")");
            }
        }
    }
    Ok(())
}

fn push_assignments(
    qb: &mut QueryBuilder<'static, Postgres>,
    table: Table,
    changes: &Changes,
) -> Result<()> {
    let mut first = true;
    for (column, value) in changes.iter() {
        let column = check_identifier(column)?;
        if !first {
            qb.push(", ");
        }
        first = false;
        qb.push(column).push(" = ");
        push_value(qb, value);
    }

    if table.tracks_updates() && changes.iter().all(|(column, _)| column != UPDATED_AT) {
        if !first {
            qb.push(", ");
        }
        first = false;
        qb.push(UPDATED_AT).push(" = NOW()");
    }

    if first {
        return Err(AppError::BadRequest("No fields to update".to_string()));
    }
    Ok(())
}

fn insert_query(table: Table, values: &Changes) -> Result<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("INSERT INTO ");
    qb.push(table.name()).push(" AS t");

    if values.is_empty() {
        qb.push(" DEFAULT VALUES");
    } else {
        qb.push(" (");
        for (i, (column, _)) in values.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(check_identifier(column)?);
        }
        qb.push(") VALUES (");
        for (i, (_, value)) in values.iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            push_value(&mut qb, value);
        }
        qb.push(")");
    }

    qb.push(" RETURNING to_jsonb(t)");
    Ok(qb)
}

fn select_query(
    table: Table,
    filter: &Filter,
    options: &FindOptions,
) -> Result<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("SELECT to_jsonb(t) FROM ");
    qb.push(table.name()).push(" AS t");
    push_where(&mut qb, filter)?;

    for (i, (column, direction)) in options.order_by.iter().enumerate() {
        qb.push(if i == 0 { " ORDER BY t." } else { ", t." });
        qb.push(check_identifier(column)?);
        qb.push(match direction {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        });
    }

    if let Some(limit) = options.limit {
        qb.push(" LIMIT ").push_bind(limit);
    }
    if let Some(offset) = options.offset {
        qb.push(" OFFSET ").push_bind(offset);
    }
    Ok(qb)
}

fn update_first_query(
    table: Table,
    filter: &Filter,
    changes: &Changes,
) -> Result<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("WITH target AS (SELECT t.id FROM ");
    qb.push(table.name()).push(" AS t");
    push_where(&mut qb, filter)?;
    qb.push(" LIMIT 1) UPDATE ")
        .push(table.name())
        .push(" AS t SET ");
    push_assignments(&mut qb, table, changes)?;
    qb.push(" FROM target WHERE t.id = target.id RETURNING to_jsonb(t)");
    Ok(qb)
}

fn update_many_query(
    table: Table,
    filter: &Filter,
    changes: &Changes,
) -> Result<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("UPDATE ");
    qb.push(table.name()).push(" AS t SET ");
    push_assignments(&mut qb, table, changes)?;
    push_where(&mut qb, filter)?;
    Ok(qb)
}

fn delete_query(table: Table, filter: &Filter) -> Result<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("DELETE FROM ");
    qb.push(table.name()).push(" AS t");
    push_where(&mut qb, filter)?;
    Ok(qb)
}

fn count_query(table: Table, filter: &Filter) -> Result<QueryBuilder<'static, Postgres>> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM ");
    qb.push(table.name()).push(" AS t");
    push_where(&mut qb, filter)?;
    Ok(qb)
}

fn conflict_or_db(table: Table, err: sqlx::Error) -> AppError {
    let err = AppError::from_db(err, format!("{} record already exists", table.name()));
    if let AppError::Database(ref e) = err {
        tracing::error!(table = table.name(), error = %e, "Entity store query failed");
    }
    err
}

#[async_trait]
impl EntityStore for PgEntityStore {
    async fn create(&self, table: Table, values: &Changes) -> Result<Row> {
        let mut qb = insert_query(table, values)?;
        qb.build_query_scalar::<Value>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_db(table, e))
    }

    async fn find_first(&self, table: Table, filter: &Filter) -> Result<Option<Row>> {
        let options = FindOptions {
            limit: Some(1),
            ..FindOptions::default()
        };
        let mut qb = select_query(table, filter, &options)?;
        Ok(qb
            .build_query_scalar::<Value>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_or_db(table, e))?)
    }

    async fn find_many(
        &self,
        table: Table,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<Row>> {
        let mut qb = select_query(table, filter, options)?;
        Ok(qb
            .build_query_scalar::<Value>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| conflict_or_db(table, e))?)
    }

    async fn update(
        &self,
        table: Table,
        filter: &Filter,
        changes: &Changes,
    ) -> Result<Option<Row>> {
        let mut qb = update_first_query(table, filter, changes)?;
        qb.build_query_scalar::<Value>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| conflict_or_db(table, e))
    }

    async fn update_many(&self, table: Table, filter: &Filter, changes: &Changes) -> Result<u64> {
        let mut qb = update_many_query(table, filter, changes)?;
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_db(table, e))?;
        Ok(result.rows_affected())
    }

    async fn delete_many(&self, table: Table, filter: &Filter) -> Result<u64> {
        let mut qb = delete_query(table, filter)?;
        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| conflict_or_db(table, e))?;
        Ok(result.rows_affected())
    }

    async fn count(&self, table: Table, filter: &Filter) -> Result<i64> {
        let mut qb = count_query(table, filter)?;
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| conflict_or_db(table, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::persistence::filter::live;
    use crate::modules::persistence::table::DELETED_AT;
    use uuid::Uuid;

    #[test]
    fn test_select_renders_live_scope() {
        let filter = Filter::new().eq("character_id", Uuid::nil()).merge(live());
        let options = FindOptions::new()
            .order_by("created_at", SortDirection::Desc)
            .paginate(20, 10);
        let qb = select_query(Table::Resources, &filter, &options).unwrap();

        assert_eq!(
            qb.sql(),
            "SELECT to_jsonb(t) FROM resources AS t WHERE t.character_id = $1 \
             AND t.deleted_at IS NULL ORDER BY t.created_at DESC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_update_first_sets_updated_at_when_tracked() {
        let changes = Changes::new().set("name", "Aria");
        let qb = update_first_query(Table::Characters, &Filter::by_id(Uuid::nil()), &changes)
            .unwrap();
        assert_eq!(
            qb.sql(),
            "WITH target AS (SELECT t.id FROM characters AS t WHERE t.id = $1 LIMIT 1) \
             UPDATE characters AS t SET name = $2, updated_at = NOW() \
             FROM target WHERE t.id = target.id RETURNING to_jsonb(t)"
        );
    }

    #[test]
    fn test_update_many_renders_null_assignment() {
        let changes = Changes::new().set(DELETED_AT, FieldValue::Null);
        let filter = Filter::new().is_not_null(DELETED_AT);
        let qb = update_many_query(Table::ResourceFiles, &filter, &changes).unwrap();
        assert_eq!(
            qb.sql(),
            "UPDATE resource_files AS t SET deleted_at = NULL WHERE t.deleted_at IS NOT NULL"
        );
    }

    #[test]
    fn test_empty_update_on_untracked_table_is_rejected() {
        let result = update_many_query(Table::Relations, &Filter::new(), &Changes::new());
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_insert_and_count() {
        let values = Changes::new().set("name", "ally").set("description", None::<String>);
        let qb = insert_query(Table::RelationTypes, &values).unwrap();
        assert_eq!(
            qb.sql(),
            "INSERT INTO relation_types AS t (description, name) VALUES (NULL, $1) \
             RETURNING to_jsonb(t)"
        );

        let qb = count_query(Table::Users, &Filter::new()).unwrap();
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM users AS t");
    }

    #[test]
    fn test_in_and_lt_conditions() {
        let filter = Filter::new()
            .with(
                "id",
                Condition::In(vec![Uuid::nil().into(), Uuid::from_u128(1).into()]),
            )
            .with(DELETED_AT, Condition::Lt(chrono::Utc::now().into()));
        let qb = delete_query(Table::Comments, &filter).unwrap();
        assert_eq!(
            qb.sql(),
            "DELETE FROM comments AS t WHERE t.deleted_at < $1 AND t.id IN ($2, $3)"
        );

        let empty = Filter::new().with("id", Condition::In(vec![]));
        let qb = delete_query(Table::Comments, &empty).unwrap();
        assert_eq!(qb.sql(), "DELETE FROM comments AS t WHERE FALSE");
    }

    #[test]
    fn test_unsafe_identifiers_are_rejected() {
        let filter = Filter::new().eq("name; DROP TABLE users", "x");
        assert!(matches!(
            count_query(Table::Users, &filter),
            Err(AppError::BadRequest(_))
        ));

        let options = FindOptions::new().order_by("created_at desc", SortDirection::Asc);
        assert!(select_query(Table::Users, &Filter::new(), &options).is_err());
    }
}
