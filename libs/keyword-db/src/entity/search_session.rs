use serde_json::Value as JsonValue;
use sqlx::{
    types::{chrono, Json},
    Executor, Postgres,
};

/// A saved research session: a named batch of analyzed keywords.
///
/// The keyword payload is stored as a JSON array so the session schema does
/// not have to chase the analysis result shape.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct SearchSession {
    pub id: i32,
    pub session_name: String,
    pub keywords: Option<Json<JsonValue>>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
    pub is_autosave: Option<bool>,
}

impl SearchSession {
    /// Create a new session record
    pub async fn create<'c, E>(
        session_name: &str,
        is_autosave: bool,
        keywords: &JsonValue,
        connection: E,
    ) -> Result<SearchSession, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO search_sessions (session_name, keywords, is_autosave, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            RETURNING *
        "#;

        sqlx::query_as::<_, SearchSession>(query)
            .bind(session_name)
            .bind(Json(keywords))
            .bind(is_autosave)
            .fetch_one(connection)
            .await
    }

    /// Replace the keyword payload of an existing session
    pub async fn update_keywords<'c, E>(
        id: i32,
        keywords: &JsonValue,
        connection: E,
    ) -> Result<SearchSession, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            UPDATE search_sessions
            SET keywords = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING *
        "#;

        sqlx::query_as::<_, SearchSession>(query)
            .bind(id)
            .bind(Json(keywords))
            .fetch_one(connection)
            .await
    }

    /// Find session by id
    pub async fn find_by_id<'c, E>(
        id: i32,
        connection: E,
    ) -> Result<Option<SearchSession>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, SearchSession>("SELECT * FROM search_sessions WHERE id = $1")
            .bind(id)
            .fetch_optional(connection)
            .await
    }

    /// Find a named (non-autosave) session by its name
    pub async fn find_named<'c, E>(
        session_name: &str,
        connection: E,
    ) -> Result<Option<SearchSession>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, SearchSession>(
            "SELECT * FROM search_sessions WHERE session_name = $1 AND is_autosave = FALSE",
        )
        .bind(session_name)
        .fetch_optional(connection)
        .await
    }

    /// Find the single autosave session, if one exists
    pub async fn find_autosave<'c, E>(connection: E) -> Result<Option<SearchSession>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, SearchSession>(
            "SELECT * FROM search_sessions WHERE is_autosave = TRUE LIMIT 1",
        )
        .fetch_optional(connection)
        .await
    }

    /// List named sessions, most recently updated first
    pub async fn list_named<'c, E>(connection: E) -> Result<Vec<SearchSession>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, SearchSession>(
            "SELECT * FROM search_sessions WHERE is_autosave = FALSE ORDER BY updated_at DESC",
        )
        .fetch_all(connection)
        .await
    }

    /// Delete a session by id, returning how many rows were removed
    pub async fn delete<'c, E>(id: i32, connection: E) -> Result<u64, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM search_sessions WHERE id = $1")
            .bind(id)
            .execute(connection)
            .await?;

        Ok(result.rows_affected())
    }

    /// Stored keyword entries as a JSON array (empty when unset or malformed)
    pub fn keywords_list(&self) -> Vec<JsonValue> {
        match &self.keywords {
            Some(Json(JsonValue::Array(items))) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Number of keywords held by this session
    pub fn keyword_count(&self) -> usize {
        match &self.keywords {
            Some(Json(JsonValue::Array(items))) => items.len(),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session_with(keywords: Option<JsonValue>) -> SearchSession {
        SearchSession {
            id: 1,
            session_name: "test".to_string(),
            keywords: keywords.map(Json),
            created_at: None,
            updated_at: None,
            is_autosave: Some(false),
        }
    }

    #[test]
    fn keyword_count_reads_array_length() {
        let session = session_with(Some(json!([{"keyword": "a"}, {"keyword": "b"}])));
        assert_eq!(session.keyword_count(), 2);
        assert_eq!(session.keywords_list().len(), 2);
    }

    #[test]
    fn keyword_count_tolerates_missing_or_non_array_payloads() {
        assert_eq!(session_with(None).keyword_count(), 0);
        assert_eq!(session_with(Some(json!("oops"))).keyword_count(), 0);
        assert!(session_with(Some(json!({}))).keywords_list().is_empty());
    }
}
