use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use super::repository::{strip_identifier_fields, Collection, Document, DocumentStore, RepositoryError};
use crate::filter::{FilterOrder, FilterWhere, FindOptions, Predicate};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: Uuid,
    data: Json<Map<String, Value>>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document::new(row.id, row.data.0)
    }
}

/// Document store over Postgres: one table per collection with a JSONB body.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_write_error(collection: Collection, err: sqlx::Error) -> RepositoryError {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let field = collection.unique_fields().first().copied().unwrap_or("id");
                tracing::warn!("Unique violation on {}.{}", collection.table_name(), field);
                return RepositoryError::Conflict { collection: collection.table_name(), field };
            }
        }
        RepositoryError::Sqlx(err)
    }
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn find(
        &self,
        collection: Collection,
        predicate: &Predicate,
        options: &FindOptions,
    ) -> Result<Vec<Document>, RepositoryError> {
        let (where_clause, mut params) = FilterWhere::generate(predicate, 0);
        let order_clause = FilterOrder::generate(&options.order, &mut params);
        let limit_clause = options.limit.map(|l| format!("LIMIT {}", l)).unwrap_or_default();

        let query = [
            format!("SELECT \"id\", \"data\" FROM \"{}\"", collection.table_name()),
            format!("WHERE {}", where_clause),
            order_clause,
            limit_clause,
        ]
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

        tracing::debug!("find: {} {:?}", query, params);

        let mut sql = sqlx::query_as::<_, DocumentRow>(&query);
        for param in params {
            sql = sql.bind(param);
        }
        let rows = sql.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn find_by_id(&self, collection: Collection, id: Uuid) -> Result<Option<Document>, RepositoryError> {
        let query = format!("SELECT \"id\", \"data\" FROM \"{}\" WHERE \"id\" = $1", collection.table_name());
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Document::from))
    }

    async fn insert(&self, collection: Collection, mut body: Map<String, Value>) -> Result<Document, RepositoryError> {
        strip_identifier_fields(&mut body);
        let query = format!(
            "INSERT INTO \"{}\" (\"id\", \"data\") VALUES ($1, $2) RETURNING \"id\", \"data\"",
            collection.table_name()
        );
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(Uuid::new_v4())
            .bind(Json(body))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, e))?;
        Ok(row.into())
    }

    async fn update_by_id(
        &self,
        collection: Collection,
        id: Uuid,
        mut fields: Map<String, Value>,
    ) -> Result<Option<Document>, RepositoryError> {
        strip_identifier_fields(&mut fields);
        let query = format!(
            "UPDATE \"{}\" SET \"data\" = \"data\" || $2 WHERE \"id\" = $1 RETURNING \"id\", \"data\"",
            collection.table_name()
        );
        let row = sqlx::query_as::<_, DocumentRow>(&query)
            .bind(id)
            .bind(Json(fields))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::map_write_error(collection, e))?;
        Ok(row.map(Document::from))
    }

    async fn delete_by_id(&self, collection: Collection, id: Uuid) -> Result<bool, RepositoryError> {
        let query = format!("DELETE FROM \"{}\" WHERE \"id\" = $1", collection.table_name());
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn append_to_field(
        &self,
        collection: Collection,
        id: Uuid,
        field: &str,
        value: Value,
    ) -> Result<bool, RepositoryError> {
        // Single statement, so concurrent appends cannot lose each other.
        let query = format!(
            r#"
            UPDATE "{}"
            SET "data" = jsonb_set(
                "data",
                ARRAY[$2::text],
                COALESCE("data" -> $2::text, '[]'::jsonb) || jsonb_build_array($3::jsonb)
            )
            WHERE "id" = $1
            AND jsonb_typeof(COALESCE("data" -> $2::text, '[]'::jsonb)) = 'array'
            "#,
            collection.table_name()
        );
        let result = sqlx::query(&query)
            .bind(id)
            .bind(field)
            .bind(Json(value))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
