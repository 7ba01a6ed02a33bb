mod template;
mod writer;

pub use template::Template;
pub use writer::{ReportWriter, TABLE_PLACEHOLDER};
