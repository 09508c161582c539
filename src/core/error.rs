use thiserror::Error;

/// Faults that stop the auditor from starting.
///
/// Bad invoice data is never reported through this type; it becomes a
/// [`Finding`](super::Finding) instead. Only broken rule data, a corrupt
/// cache snapshot or invalid configuration end up here.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuditorError {
    /// VAT rule data could not be parsed or failed validation.
    #[error("rule data error: {0}")]
    RuleData(String),

    /// A persisted CVR cache snapshot is unreadable or fails its checksum.
    #[error("cache snapshot error: {0}")]
    CacheSnapshot(String),

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// Registry client could not be constructed.
    #[error("registry client error: {0}")]
    Client(String),

    /// Reading or writing a data file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
