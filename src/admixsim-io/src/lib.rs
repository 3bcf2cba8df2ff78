pub mod write;
pub use write::{GenericWriter, WriterError, WRITER_SEPARATOR};
