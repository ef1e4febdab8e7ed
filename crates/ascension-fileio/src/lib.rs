//! Binds a `Document` to a filesystem path: encoding-aware streaming,
//! atomic temp-and-rename writes, and advisory file locking (spec §4.6).

mod document_input;
mod error;
mod lock;
mod stream_buffer;

pub use document_input::{TextFileDocumentInput, TimeStampDirector, WriteOptions};
pub use error::FileIoError;
pub use lock::{FileLock, LockMode};
pub use stream_buffer::{ReadOutcome, decode_all, encode_all, sniff_mib_enum};
