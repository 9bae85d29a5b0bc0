use std::borrow::Cow;
use std::fmt;

/// Represents template errors.
///
/// Errors come from two places: the parser rejects malformed templates with
/// [`ErrorKind::SyntaxError`], and callables invoked while rendering may fail
/// with any error they like.  The latter are passed through to the caller
/// unchanged.
///
/// # Example
///
/// Here is an example of how you might want to render errors:
///
/// ```rust
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let env = tmplfmt::Environment::new();
/// match env.render_template("Hello {name", ()).await {
///     Ok(result) => println!("{}", result),
///     Err(err) => {
///         eprintln!("Could not render template:");
///         eprintln!("  {}", err);
///     }
/// }
/// # });
/// ```
pub struct Error {
    kind: ErrorKind,
    detail: Option<Cow<'static, str>>,
    offset: Option<usize>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut err = f.debug_struct("Error");
        err.field("kind", &self.kind);
        if let Some(ref detail) = self.detail {
            err.field("detail", detail);
        }
        if let Some(offset) = self.offset {
            err.field("offset", &offset);
        }
        if let Some(ref source) = self.source {
            err.field("source", source);
        }
        err.finish()
    }
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }
}

impl Eq for Error {}

/// An enum describing the error kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The template could not be parsed.
    SyntaxError,
    /// A callable received arguments it cannot work with.
    InvalidArguments,
    /// A callable or the engine failed to perform an operation.
    InvalidOperation,
    /// A value could not be converted into the internal format.
    BadSerialization,
}

impl ErrorKind {
    fn description(self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "syntax error",
            ErrorKind::InvalidArguments => "invalid arguments",
            ErrorKind::InvalidOperation => "invalid operation",
            ErrorKind::BadSerialization => "could not serialize to internal format",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref detail) = self.detail {
            ok!(write!(f, "{}: {}", self.kind, detail));
        } else {
            ok!(write!(f, "{}", self.kind));
        }
        if let Some(offset) = self.offset {
            ok!(write!(f, " (at {})", offset));
        }
        Ok(())
    }
}

impl Error {
    /// Creates a new error with kind and detail.
    pub fn new<D: Into<Cow<'static, str>>>(kind: ErrorKind, detail: D) -> Error {
        Error {
            kind,
            detail: Some(detail.into()),
            offset: None,
            source: None,
        }
    }

    pub(crate) fn syntax<D: Into<Cow<'static, str>>>(detail: D, offset: Option<usize>) -> Error {
        Error {
            offset,
            ..Error::new(ErrorKind::SyntaxError, detail)
        }
    }

    /// Attaches another error as source to this error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error detail.
    ///
    /// The detail is a human readable message that refines the error kind.
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Returns the character offset into the template source.
    ///
    /// This is only available for syntax errors that can be pinned to a
    /// specific character.  The offset counts characters, not bytes.
    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|err| err.as_ref() as _)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error {
            kind,
            detail: None,
            offset: None,
            source: None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: fmt::Display,
    {
        Error::new(ErrorKind::BadSerialization, msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::syntax("unexpected character 'x'", Some(3));
        assert_eq!(err.to_string(), "syntax error: unexpected character 'x' (at 3)");
        let err = Error::from(ErrorKind::InvalidOperation);
        assert_eq!(err.to_string(), "invalid operation");
    }

    #[test]
    fn test_source_chain() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = Error::new(ErrorKind::InvalidOperation, "lookup failed").with_source(io);
        assert_eq!(err.source().unwrap().to_string(), "disk on fire");
    }
}
