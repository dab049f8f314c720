use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Unsupported declaration shape: type {name} is {shape}")]
    UnsupportedDeclarationShape { name: String, shape: String },

    #[error("Unsupported signature shape in {declaration}: {detail}")]
    UnsupportedSignatureShape { declaration: String, detail: String },

    #[error("Persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("Migration failure: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn unsupported_signature(declaration: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::UnsupportedSignatureShape {
            declaration: declaration.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
