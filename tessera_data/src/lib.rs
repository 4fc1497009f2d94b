//! Record-stream persistence medium shared by Tessera content.

pub mod reader;
pub mod record;
pub mod validate;
pub mod writer;

pub use reader::RecordReader;
pub use record::*;
pub use validate::{ValidationError, validate_records};
pub use writer::{MemoryWriter, RecordWriter};
