use sqlx::{types::chrono, Executor, Postgres};

/// A keyword the user pinned for later, with the signals it had at save time
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Favorite {
    pub id: i32,
    pub keyword: String,
    pub search_volume: Option<i64>,
    pub competition_score: Option<f64>,
    pub difficulty_score: Option<f64>,
    pub marketplace_results: Option<i64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub notes: Option<String>,
}

/// Input for creating a new favorite
#[derive(Debug, Clone)]
pub struct NewFavorite {
    pub keyword: String,
    pub search_volume: i64,
    pub competition_score: f64,
    pub difficulty_score: f64,
    pub marketplace_results: i64,
    pub notes: Option<String>,
}

impl Favorite {
    /// Create a new favorite record
    pub async fn create<'c, E>(favorite: &NewFavorite, connection: E) -> Result<Favorite, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO favorites (keyword, search_volume, competition_score, difficulty_score, marketplace_results, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            RETURNING *
        "#;

        sqlx::query_as::<_, Favorite>(query)
            .bind(&favorite.keyword)
            .bind(favorite.search_volume)
            .bind(favorite.competition_score)
            .bind(favorite.difficulty_score)
            .bind(favorite.marketplace_results)
            .bind(&favorite.notes)
            .fetch_one(connection)
            .await
    }

    /// Find a favorite by keyword
    pub async fn find_by_keyword<'c, E>(
        keyword: &str,
        connection: E,
    ) -> Result<Option<Favorite>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, Favorite>("SELECT * FROM favorites WHERE keyword = $1")
            .bind(keyword)
            .fetch_optional(connection)
            .await
    }

    /// List all favorites, newest first
    pub async fn find_all<'c, E>(connection: E) -> Result<Vec<Favorite>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, Favorite>("SELECT * FROM favorites ORDER BY created_at DESC")
            .fetch_all(connection)
            .await
    }

    /// Delete a favorite by keyword, returning how many rows were removed
    pub async fn delete_by_keyword<'c, E>(keyword: &str, connection: E) -> Result<u64, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM favorites WHERE keyword = $1")
            .bind(keyword)
            .execute(connection)
            .await?;

        Ok(result.rows_affected())
    }
}
