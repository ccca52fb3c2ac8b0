use thiserror::Error;

#[derive(Error, Debug)]
pub enum BloomError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image decode error: {0}")]
    Decode(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Singular equation system: {0}")]
    SingularSystem(String),
}

pub type Result<T> = std::result::Result<T, BloomError>;
