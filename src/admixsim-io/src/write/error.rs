use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to write to file: inner writer returned an io error")]
    IOError(#[from] std::io::Error),

    #[error("Refusing to overwrite existing file '{0}'. Use --overwrite to bypass this check.")]
    Exists(String),
}
