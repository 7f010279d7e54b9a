//! Configuration for the PostgreSQL vote repository.

/// Connection settings for [`crate::PostgresVoteRepository`].
#[derive(Debug, Clone)]
pub struct PostgresRepositoryConfig {
    /// Postgres connection URL.
    pub database_url: String,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
}

impl PostgresRepositoryConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections: Self::DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    const DEFAULT_MAX_CONNECTIONS: u32 = 20;
}
