use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn type_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Error {
        Error(
            ErrorKind::TypeMismatch {
                expected: expected.into(),
                actual: actual.into(),
            }
            .into(),
        )
    }

    pub fn decode(element: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Decode {
                element: element.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn trailing_bytes(count: usize) -> Error {
        Error(ErrorKind::TrailingBytes { count }.into())
    }

    pub fn encode(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Encode {
                message: message.into(),
            }
            .into(),
        )
    }

    /// Returns `true` for failures caused by malformed encoded input
    /// (`Decode` and `TrailingBytes`).
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::Decode { .. } | ErrorKind::TrailingBytes { .. }
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid datum type {actual}, expected {expected}")]
    TypeMismatch { expected: String, actual: String },

    #[error("failed to decode '{element}': {message}")]
    Decode { element: String, message: String },

    #[error("{count} trailing bytes in encoded value")]
    TrailingBytes { count: usize },

    #[error("failed to encode datum: {message}")]
    Encode { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(_: std::convert::Infallible) -> Self {
        Error::invalid_arg("conversion", "infallible")
    }
}
