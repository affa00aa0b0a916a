use sqlx::{types::chrono, Executor, Postgres};

/// A trending topic captured for a given day
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct TrendingTopic {
    pub id: i32,
    pub topic: String,
    pub source: Option<String>,
    pub trend_score: Option<f64>,
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    pub date_trending: Option<chrono::NaiveDate>,
}

/// Input for recording a trending topic
#[derive(Debug, Clone)]
pub struct NewTrendingTopic {
    pub topic: String,
    pub source: String,
    pub trend_score: f64,
    pub date_trending: chrono::NaiveDate,
}

impl TrendingTopic {
    /// Record a trending topic
    pub async fn create<'c, E>(
        topic: &NewTrendingTopic,
        connection: E,
    ) -> Result<TrendingTopic, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        let query = r#"
            INSERT INTO trending_topics (topic, source, trend_score, date_trending, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING *
        "#;

        sqlx::query_as::<_, TrendingTopic>(query)
            .bind(&topic.topic)
            .bind(&topic.source)
            .bind(topic.trend_score)
            .bind(topic.date_trending)
            .fetch_one(connection)
            .await
    }

    /// Topics recorded for a given day, highest score first
    pub async fn find_for_date<'c, E>(
        date: chrono::NaiveDate,
        limit: i64,
        connection: E,
    ) -> Result<Vec<TrendingTopic>, sqlx::Error>
    where
        E: Executor<'c, Database = Postgres>,
    {
        sqlx::query_as::<_, TrendingTopic>(
            "SELECT * FROM trending_topics WHERE date_trending = $1 ORDER BY trend_score DESC LIMIT $2",
        )
        .bind(date)
        .bind(limit)
        .fetch_all(connection)
        .await
    }
}
