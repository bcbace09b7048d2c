/// Configuration failures. Lookup outcomes (not found, timed out) are not
/// errors and live in [`Resolution`](crate::model::Resolution).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (bad level table, impossible row layout, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
}
