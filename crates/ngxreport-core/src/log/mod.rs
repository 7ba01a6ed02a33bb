mod parser;
mod reader;
mod selector;
mod types;

pub use parser::parse_line;
pub use reader::LineReader;
pub use selector::{LogFiles, select_log_files};
pub use types::*;
