//! Entity `SELECT` builder with removable global scopes.

use crate::model::entity::Entity;
use crate::query::Predicate;
use crate::repo::RepoResult;
use crate::scope::Scopes;
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// Sort direction for `ORDER BY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// `INNER JOIN table ON left = right`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub table: String,
    pub left: String,
    pub right: String,
}

/// Query over the table of `E`.
///
/// Global scopes booted for `E` apply by default. Each scope owns one slot
/// per query: removing a scope empties the slot, replacing it swaps in a new
/// predicate. The most recent call for a given scope name wins.
pub struct Select<E: Entity> {
    scopes: Arc<Scopes<E>>,
    scope_overrides: BTreeMap<&'static str, Option<Predicate>>,
    joins: Vec<Join>,
    predicates: Vec<Predicate>,
    order_by: Vec<(String, Order)>,
    limit: Option<u32>,
    offset: u32,
}

impl<E: Entity> Clone for Select<E> {
    fn clone(&self) -> Self {
        Self {
            scopes: Arc::clone(&self.scopes),
            scope_overrides: self.scope_overrides.clone(),
            joins: self.joins.clone(),
            predicates: self.predicates.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
        }
    }
}

impl<E: Entity> Debug for Select<E> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("table", &E::TABLE)
            .field("scopes", &self.scopes)
            .field("predicates", &self.predicates())
            .field("joins", &self.joins)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> Select<E> {
    pub fn new(scopes: Arc<Scopes<E>>) -> Self {
        Self {
            scopes,
            scope_overrides: BTreeMap::new(),
            joins: Vec::new(),
            predicates: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: 0,
        }
    }

    /// Drops the named global scope from this query.
    pub fn without_global_scope(mut self, name: &'static str) -> Self {
        self.scope_overrides.insert(name, None);
        self
    }

    /// Drops every registered global scope from this query.
    pub fn without_global_scopes(mut self) -> Self {
        for name in self.scopes.names() {
            self.scope_overrides.insert(name, None);
        }
        self
    }

    /// Drops the named global scope and puts `predicate` in its slot.
    pub fn replace_global_scope(mut self, name: &'static str, predicate: Predicate) -> Self {
        self.scope_overrides.insert(name, Some(predicate));
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn where_eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter(Predicate::eq(column, value))
    }

    pub fn inner_join(
        mut self,
        table: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        self.joins.push(Join {
            table: table.into(),
            left: left.into(),
            right: right.into(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, order: Order) -> Self {
        self.order_by.push((column.into(), order));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Every predicate this query will emit: scope slots first, then filters.
    pub fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        for scope in self.scopes.iter() {
            match self.scope_overrides.get(scope.name()) {
                None => predicates.push(scope.apply()),
                Some(Some(replacement)) => predicates.push(replacement.clone()),
                Some(None) => {}
            }
        }

        // Replacements for names that were never registered still apply.
        for (name, replacement) in &self.scope_overrides {
            if let Some(predicate) = replacement {
                if !self.scopes.contains(name) {
                    predicates.push(predicate.clone());
                }
            }
        }

        predicates.extend(self.predicates.iter().cloned());
        predicates
    }

    /// Renders the `SELECT` statement and its bound values.
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let columns = E::columns()
            .iter()
            .map(|column| E::qualify_column(column))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("SELECT {columns} FROM {}", E::TABLE);
        let mut binds = Vec::new();

        self.render_body(&mut sql, &mut binds);

        if !self.order_by.is_empty() {
            let order = self
                .order_by
                .iter()
                .map(|(column, order)| format!("{column} {}", order.as_sql()))
                .collect::<Vec<_>>()
                .join(", ");
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }

        if let Some(limit) = self.limit {
            binds.push(Value::Integer(i64::from(limit)));
            sql.push_str(&format!(" LIMIT ?{}", binds.len()));
            if self.offset > 0 {
                binds.push(Value::Integer(i64::from(self.offset)));
                sql.push_str(&format!(" OFFSET ?{}", binds.len()));
            }
        } else if self.offset > 0 {
            binds.push(Value::Integer(i64::from(self.offset)));
            sql.push_str(&format!(" LIMIT -1 OFFSET ?{}", binds.len()));
        }

        (sql, binds)
    }

    /// Renders `SELECT COUNT(*)` with the same joins and predicates.
    pub fn to_count_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let mut binds = Vec::new();
        self.render_body(&mut sql, &mut binds);
        (sql, binds)
    }

    /// Loads every matching entity.
    pub fn all(&self, conn: &Connection) -> RepoResult<Vec<E>> {
        let (sql, binds) = self.to_sql();
        debug!(
            "event=query_build module=query status=ok table={} predicates={}",
            E::TABLE,
            self.predicates().len()
        );

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(binds))?;
        let mut entities = Vec::new();
        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }
        Ok(entities)
    }

    /// Loads the first matching entity.
    pub fn first(&self, conn: &Connection) -> RepoResult<Option<E>> {
        let mut entities = self.clone().limit(1).all(conn)?;
        Ok(entities.pop())
    }

    /// Loads the entity whose primary key equals `key`, subject to scopes.
    pub fn find(&self, conn: &Connection, key: impl Into<Value>) -> RepoResult<Option<E>> {
        self.clone()
            .where_eq(E::qualify_column(E::PRIMARY_KEY), key)
            .first(conn)
    }

    pub fn count(&self, conn: &Connection) -> RepoResult<u64> {
        let (sql, binds) = self.to_count_sql();
        let count: i64 = conn.query_row(&sql, params_from_iter(binds), |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    fn render_body(&self, sql: &mut String, binds: &mut Vec<Value>) {
        for join in &self.joins {
            sql.push_str(&format!(
                " INNER JOIN {} ON {} = {}",
                join.table, join.left, join.right
            ));
        }

        for (index, predicate) in self.predicates().iter().enumerate() {
            sql.push_str(if index == 0 { " WHERE " } else { " AND " });
            predicate.render(sql, binds);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Order, Select};
    use crate::model::entity::Entity;
    use crate::query::Predicate;
    use crate::scope::{GlobalScope, Scopes};
    use rusqlite::types::Value;
    use rusqlite::Row;
    use std::sync::Arc;

    struct Post;

    impl Entity for Post {
        const TABLE: &'static str = "posts";

        fn columns() -> &'static [&'static str] {
            &["id", "title"]
        }

        fn to_values(&self) -> Vec<Value> {
            Vec::new()
        }

        fn from_row(_row: &Row<'_>) -> rusqlite::Result<Self> {
            Ok(Self)
        }
    }

    struct Published;

    impl GlobalScope<Post> for Published {
        fn name(&self) -> &'static str {
            "published"
        }

        fn apply(&self) -> Predicate {
            Predicate::is_not_null("posts.published_at")
        }
    }

    fn scoped_query() -> Select<Post> {
        let mut scopes = Scopes::<Post>::new();
        scopes.add(Published);
        Select::new(Arc::new(scopes))
    }

    #[test]
    fn registered_scope_applies_by_default() {
        let (sql, binds) = scoped_query().to_sql();
        assert_eq!(
            sql,
            "SELECT posts.id, posts.title FROM posts WHERE posts.published_at IS NOT NULL"
        );
        assert!(binds.is_empty());
    }

    #[test]
    fn latest_override_for_a_scope_wins() {
        let query = scoped_query()
            .replace_global_scope("published", Predicate::is_null("posts.published_at"))
            .without_global_scope("published");
        assert_eq!(query.to_sql().0, "SELECT posts.id, posts.title FROM posts");

        let query = query.replace_global_scope("published", Predicate::is_null("posts.published_at"));
        assert_eq!(
            query.predicates(),
            vec![Predicate::is_null("posts.published_at")]
        );
    }

    #[test]
    fn joins_filters_order_and_paging_render_in_place() {
        let (sql, binds) = scoped_query()
            .without_global_scopes()
            .inner_join("authors", "authors.id", "posts.author_id")
            .where_eq("authors.name", "ada".to_string())
            .order_by("posts.id", Order::Desc)
            .limit(10)
            .offset(20)
            .to_sql();

        assert_eq!(
            sql,
            "SELECT posts.id, posts.title FROM posts INNER JOIN authors ON authors.id = posts.author_id WHERE authors.name = ?1 ORDER BY posts.id DESC LIMIT ?2 OFFSET ?3"
        );
        assert_eq!(
            binds,
            vec![
                Value::Text("ada".to_string()),
                Value::Integer(10),
                Value::Integer(20)
            ]
        );
    }

    #[test]
    fn offset_without_limit_uses_unbounded_limit() {
        let (sql, _) = scoped_query().offset(5).to_sql();
        assert!(sql.ends_with("LIMIT -1 OFFSET ?1"));

        let (count_sql, _) = scoped_query().to_count_sql();
        assert_eq!(
            count_sql,
            "SELECT COUNT(*) FROM posts WHERE posts.published_at IS NOT NULL"
        );
    }
}
