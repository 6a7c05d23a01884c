pub mod writer;

pub use writer::ChangeLogWriter;
