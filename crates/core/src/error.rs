use implscope_api::ApiError;
use thiserror::Error;

/// Terminal failures of one implementation request.
///
/// None of them is retried: the first failure aborts the analysis and no
/// partial stub list is produced.
#[derive(Error, Debug)]
pub enum ImplError {
    #[error("{0}")]
    UnsupportedTarget(String),
    #[error("{0}")]
    NoAccessibleConstructor(String),
    #[error("Cannot generate non-abstract implementation: method {owner}.{method} is abstract and cannot be overridden")]
    UnimplementableHierarchy { owner: String, method: String },
    #[error("Cannot implement: subtype cannot be non-abstract ({stub} clashes with {member})")]
    SignatureConflict { stub: String, member: String },
    #[error("{0}")]
    RawTypeRequired(String),
    #[error("{0}")]
    CastRequired(String),
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Compilation failed: {0}")]
    Compilation(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Fieldless mirror of [`ImplError`] for matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImplErrorKind {
    UnsupportedTarget,
    NoAccessibleConstructor,
    UnimplementableHierarchy,
    SignatureConflict,
    RawTypeRequired,
    CastRequired,
    Io,
    Compilation,
    Api,
}

impl ImplError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ImplError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn kind(&self) -> ImplErrorKind {
        match self {
            ImplError::UnsupportedTarget(_) => ImplErrorKind::UnsupportedTarget,
            ImplError::NoAccessibleConstructor(_) => ImplErrorKind::NoAccessibleConstructor,
            ImplError::UnimplementableHierarchy { .. } => ImplErrorKind::UnimplementableHierarchy,
            ImplError::SignatureConflict { .. } => ImplErrorKind::SignatureConflict,
            ImplError::RawTypeRequired(_) => ImplErrorKind::RawTypeRequired,
            ImplError::CastRequired(_) => ImplErrorKind::CastRequired,
            ImplError::Io { .. } => ImplErrorKind::Io,
            ImplError::Compilation(_) => ImplErrorKind::Compilation,
            ImplError::Api(_) => ImplErrorKind::Api,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImplError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_keep_their_source() {
        let err = ImplError::io(
            "Cannot write to output file",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.kind(), ImplErrorKind::Io);
        assert_eq!(err.to_string(), "Cannot write to output file: denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn api_errors_convert_transparently() {
        let err: ImplError = ApiError::NotFound("demo.Missing".to_string()).into();
        assert_eq!(err.kind(), ImplErrorKind::Api);
        assert_eq!(err.to_string(), ApiError::NotFound("demo.Missing".to_string()).to_string());
    }
}
