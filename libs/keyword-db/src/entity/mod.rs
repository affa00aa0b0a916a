pub mod favorite;
pub mod search_session;
pub mod trending_topic;

// Re-exports for convenience
pub use favorite::{Favorite, NewFavorite};
pub use search_session::SearchSession;
pub use trending_topic::{NewTrendingTopic, TrendingTopic};
