pub mod instance_reader;
pub use instance_reader::*;

pub mod dot_writer;
pub use dot_writer::DotWriter;

pub mod variables_writer;
pub use variables_writer::{write_variables_csv, write_variables_json};
