pub mod error;
pub mod signal;
pub mod traits;

pub use error::FolioError;
pub use signal::{SignalBus, SignalSubscription, SiteSignal};
pub use traits::{DocumentStore, Fields, KeyValueStore};
