use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ModelError {
    /// Artifact file does not exist.
    NotFound(PathBuf),
    /// Artifact file exists but could not be read.
    Io { path: PathBuf, message: String },
    /// Artifact is not valid JSON.
    Parse(String),
    /// Artifact is JSON but does not have the expected shape or capabilities.
    Type(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "model not found: {}", path.display()),
            Self::Io { path, message } => {
                write!(f, "cannot read model '{}': {message}", path.display())
            }
            Self::Parse(msg) => write!(f, "model parse error: {msg}"),
            Self::Type(msg) => write!(f, "invalid model artifact: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}
