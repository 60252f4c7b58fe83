/// Application-level errors
///
/// The recommendation engine itself never surfaces these: collaborator failures are
/// downgraded to empty results where they happen. They reach callers only through the
/// profile store and the snapshot cache helpers.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Cache error: {0}")]
    Cache(#[from] redis::RedisError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// Collapses a collaborator result into its value, treating any failure as "no data".
///
/// `source` and `subject` are only used for the log line.
pub fn or_empty<T>(result: AppResult<Vec<T>>, source: &str, subject: &str) -> Vec<T> {
    match result {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(
                error = %e,
                source = source,
                subject = %subject,
                "Upstream lookup failed, treating as empty"
            );
            Vec::new()
        }
    }
}
