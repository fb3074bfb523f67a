//! Site visitor counter.

pub mod counter;
pub mod document;

pub use counter::VisitorCounter;
pub use document::CounterDocument;
pub use folio_config::IncrementStrategy;
