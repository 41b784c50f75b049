//! Error taxonomy for the rhyme engine.
//!
//! The first three variants are the recoverable query-level failures the
//! service reports as a [`QueryStatus`](crate::service::QueryStatus); the
//! remaining ones wrap persistence failures (lexicon artifacts, index
//! snapshots, the redb unseen log, TOML configuration).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RhymeError {
    /// Neither the lexicon nor the letter-to-sound rules produced a pronunciation.
    #[error("no transcription available for '{0}'")]
    TranscriptionUnavailable(String),

    /// Empty or non-textual input where a token is required.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A query reached the service before any index was installed.
    #[error("rhyme index has not been built")]
    IndexNotBuilt,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("fst error: {0}")]
    Fst(#[from] fst::Error),

    #[error("storage error: {0}")]
    Storage(#[from] redb::Error),

    #[error("config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for RhymeError {
    fn from(e: toml::de::Error) -> Self {
        RhymeError::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for RhymeError {
    fn from(e: toml::ser::Error) -> Self {
        RhymeError::Config(e.to_string())
    }
}

// redb reports each transaction stage with its own error type; funnel them
// through `redb::Error` so `?` works in the unseen log.
macro_rules! redb_stage_error {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for RhymeError {
                fn from(e: $ty) -> Self {
                    RhymeError::Storage(e.into())
                }
            }
        )*
    };
}

redb_stage_error!(
    redb::DatabaseError,
    redb::TransactionError,
    redb::TableError,
    redb::StorageError,
    redb::CommitError,
);

pub type Result<T> = std::result::Result<T, RhymeError>;
