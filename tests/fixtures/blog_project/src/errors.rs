/// Errors that map onto an HTTP status.
pub trait HttpError {}

/// The requested article does not exist.
pub struct ArticleNotFound;

impl HttpError for ArticleNotFound {}

/// Access to the resource is denied.
pub struct Forbidden;

impl HttpError for Forbidden {}

/// The payload failed validation.
pub struct ValidationFailed;
