use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("{0}")]
    InvalidFormat(String),

    #[error("Unsupported bank size: {0} (expected 2, 4 or 8)")]
    UnsupportedBankSize(usize),
}
