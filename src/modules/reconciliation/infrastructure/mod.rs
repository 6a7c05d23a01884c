pub mod json_file_source;

pub use json_file_source::JsonFileSource;
