use thiserror::Error;

#[derive(Error, Debug)]
pub enum MfeError {
    #[error("Type error in '{param}': {message}")]
    Type { param: String, message: String },

    #[error("Value error in '{param}': {message}")]
    Value { param: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an [`MfeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Type,
    Value,
    Io,
}

impl MfeError {
    pub fn type_error(param: impl Into<String>, message: impl Into<String>) -> Self {
        MfeError::Type {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn value_error(param: impl Into<String>, message: impl Into<String>) -> Self {
        MfeError::Value {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            MfeError::Type { .. } => ErrorKind::Type,
            MfeError::Value { .. } => ErrorKind::Value,
            MfeError::Io(_) => ErrorKind::Io,
        }
    }

    pub fn is_type_error(&self) -> bool {
        self.kind() == ErrorKind::Type
    }

    pub fn is_value_error(&self) -> bool {
        self.kind() == ErrorKind::Value
    }
}

pub type Result<T> = std::result::Result<T, MfeError>;
