use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParserError{
    #[error("File {0} does not exist")]
    MissingFile(String),

    #[error("{0} is not a file")]
    NotAFile(String),

    #[error("{0} already exists. Use --overwrite to force.")]
    CannotOverwrite(String),

    #[error("Failed to serialize command line arguments")]
    Serialize(#[source] serde_yaml::Error),

    #[error("Failed to deserialize command line arguments from {0}")]
    Deserialize(String, #[source] serde_yaml::Error),
}
