use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("invalid Supabase URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Supabase API error ({status}): {message}")]
    Api { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, SupabaseError>;
