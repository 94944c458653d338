pub mod document;
pub mod formatter;

pub use document::SummaryDocument;
