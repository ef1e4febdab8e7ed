use ascension_primitives::{AscensionError, Newline};

#[derive(Debug, thiserror::Error)]
pub enum FileIoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Document(#[from] AscensionError),

    #[error("no codec registered for encoding \"{0}\"")]
    UnsupportedEncoding(String),

    #[error("newline {0:?} cannot be represented in the target encoding")]
    UnencodableNewline(Newline),

    #[error("file timestamp changed on disk since it was last read")]
    TimestampMismatch,
}
