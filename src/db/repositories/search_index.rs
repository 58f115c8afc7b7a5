use crate::db::bounded;
use crate::models::movie::MovieRecord;
use crate::services::catalog::{
    FieldWeight, IndexQueryError, MOVIE_SEARCH_FIELDS, SearchIndex, StoreError,
};
use sea_orm::{
    ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement, TransactionTrait, Value,
};
use std::time::Duration;
use tracing::{debug, info};

const CREATE_TABLE: &str = "CREATE VIRTUAL TABLE IF NOT EXISTS movie_search USING fts5(\
     external_id UNINDEXED, title, director, plot, document UNINDEXED, \
     tokenize = 'porter unicode61')";

/// Columns of `movie_search` in declaration order.
const COLUMNS: [&str; 5] = ["external_id", "title", "director", "plot", "document"];

fn query_tokens(term: &str) -> Vec<String> {
    term.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn searchable<'a>(fields: &'a [FieldWeight]) -> Vec<&'a FieldWeight> {
    let known: Vec<&FieldWeight> = fields
        .iter()
        .filter(|f| COLUMNS[1..4].contains(&f.field))
        .collect();
    if known.is_empty() {
        MOVIE_SEARCH_FIELDS.iter().collect()
    } else {
        known
    }
}

/// FTS5 expression restricted to the weighted columns, any token matching.
fn match_expression(tokens: &[String], fields: &[&FieldWeight]) -> String {
    let columns = fields.iter().map(|f| f.field).collect::<Vec<_>>().join(" ");
    let terms = tokens
        .iter()
        .map(|t| format!("\"{t}\""))
        .collect::<Vec<_>>()
        .join(" OR ");
    format!("{{{columns}}} : ({terms})")
}

/// `bm25()` argument list: one weight per column, zero for unweighted ones.
fn bm25_weights(fields: &[&FieldWeight]) -> String {
    COLUMNS
        .iter()
        .map(|column| {
            let weight = fields
                .iter()
                .find(|f| f.field == *column)
                .map_or(0.0, |f| f.weight);
            format!("{weight:.3}")
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Full-text index kept in an SQLite FTS5 table next to the catalog.
pub struct SqliteSearchIndex {
    conn: DatabaseConnection,
    op_timeout: Duration,
    max_results: usize,
}

impl SqliteSearchIndex {
    #[must_use]
    pub const fn new(conn: DatabaseConnection, op_timeout: Duration, max_results: usize) -> Self {
        Self {
            conn,
            op_timeout,
            max_results,
        }
    }

    fn statement(sql: &str, values: Vec<Value>) -> Statement {
        Statement::from_sql_and_values(DatabaseBackend::Sqlite, sql, values)
    }
}

#[async_trait::async_trait]
impl SearchIndex for SqliteSearchIndex {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        bounded(self.op_timeout, || StoreError::Timeout, async {
            self.conn.execute_unprepared(CREATE_TABLE).await?;
            info!("Search index table ready");
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn index_document(&self, key: &str, record: &MovieRecord) -> Result<(), StoreError> {
        let document = serde_json::to_string(record)?;

        bounded(self.op_timeout, || StoreError::Timeout, async {
            let txn = self.conn.begin().await?;

            txn.execute(Self::statement(
                "DELETE FROM movie_search WHERE external_id = ?",
                vec![key.into()],
            ))
            .await?;

            txn.execute(Self::statement(
                "INSERT INTO movie_search (external_id, title, director, plot, document) \
                 VALUES (?, ?, ?, ?, ?)",
                vec![
                    key.into(),
                    record.title.clone().into(),
                    record.director.clone().into(),
                    record.plot.clone().into(),
                    document.into(),
                ],
            ))
            .await?;

            txn.commit().await?;
            Ok::<_, StoreError>(())
        })
        .await
    }

    async fn query(
        &self,
        term: &str,
        fields: &[FieldWeight],
    ) -> Result<Vec<MovieRecord>, IndexQueryError> {
        let tokens = query_tokens(term);
        if tokens.is_empty() {
            debug!(term, "Query has no searchable tokens");
            return Ok(Vec::new());
        }

        let fields = searchable(fields);
        let sql = format!(
            "SELECT document FROM movie_search WHERE movie_search MATCH ? \
             ORDER BY bm25(movie_search, {}), external_id LIMIT ?",
            bm25_weights(&fields)
        );
        let limit = i64::try_from(self.max_results).unwrap_or(i64::MAX);
        let stmt = Self::statement(
            &sql,
            vec![match_expression(&tokens, &fields).into(), limit.into()],
        );

        bounded(self.op_timeout, || IndexQueryError::Timeout, async {
            let rows = self.conn.query_all(stmt).await?;

            rows.iter()
                .map(|row| {
                    let document: String = row.try_get("", "document")?;
                    serde_json::from_str(&document)
                        .map_err(|e| IndexQueryError::Decode(e.to_string()))
                })
                .collect::<Result<Vec<MovieRecord>, IndexQueryError>>()
        })
        .await
    }
}
