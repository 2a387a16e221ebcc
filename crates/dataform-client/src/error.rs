pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("resource already exists: {resource}")]
    AlreadyExists { resource: String },
    #[error("resource not found: {resource}")]
    NotFound { resource: String },
    #[error("a compilation result takes either a workspace or a git commitish, not both")]
    ConflictingCompilationSources,
    #[error("dataform api error ({status}, code {code}): {message}")]
    Api { code: u16, status: String, message: String },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("malformed base64 in response body")]
    Decode(#[from] base64::DecodeError),
    #[error("response is missing required field `{0}`")]
    MissingResponseField(&'static str),
}

impl Error {
    /// True when the failure means the target resource already exists.
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Error::AlreadyExists { .. })
    }

    /// True when the failure means the target resource is absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}
