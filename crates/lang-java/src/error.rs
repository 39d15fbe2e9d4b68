use thiserror::Error;

#[derive(Error, Debug)]
pub enum DescriptionError {
    #[error("Syntax error in `{input}` at offset {offset}: {message}")]
    Syntax {
        input: String,
        offset: usize,
        message: String,
    },
    #[error("Unknown type `{name}` referenced from {context}")]
    UnknownType { name: String, context: String },
    #[error("Type variable `{0}` cannot take type arguments")]
    ArgumentsOnTypeVariable(String),
    #[error("Duplicate class description: {0}")]
    DuplicateClass(String),
    #[error("Required class missing from the type universe: {0}")]
    MissingWellKnown(&'static str),
    #[error("Invalid class description for {name}: {message}")]
    Invalid { name: String, message: String },
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DescriptionError {
    pub fn syntax(input: &str, offset: usize, message: impl Into<String>) -> Self {
        DescriptionError::Syntax {
            input: input.to_string(),
            offset,
            message: message.into(),
        }
    }

    pub fn invalid(name: &str, message: impl Into<String>) -> Self {
        DescriptionError::Invalid {
            name: name.to_string(),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DescriptionError>;
