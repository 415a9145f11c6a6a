use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeskError {
    #[error("record '{0}' not found")]
    RecordNotFound(String),

    #[error("unknown resource '{0}'")]
    UnknownResource(String),

    #[error("record has no identity: missing field '{0}'")]
    MissingIdentity(String),

    #[error("invalid id '{0}': {1}")]
    InvalidId(String, String),

    #[error("invalid field assignment '{0}': expected field=value")]
    InvalidAssignment(String),

    #[error("'{0}' is not an editable column of {1}")]
    NotEditable(String, String),

    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    #[error("page size must be greater than zero")]
    InvalidPageSize,

    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    // Edit workflow errors
    #[error("an edit to '{0}' is already awaiting confirmation")]
    EditPending(String),

    #[error("no edit is awaiting confirmation")]
    NoPendingEdit,

    #[error("{0}")]
    ConfirmationRequired(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Backend errors
    #[error("configuration error: {0}")]
    Config(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, DeskError>;
