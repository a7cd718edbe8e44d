pub mod api;
pub mod dispatcher;
pub mod listing;
pub mod normalize;
pub mod selection;
pub mod session;

pub use crate::domain::ports::{Backend, ConfigProvider, Confirmer, Storage};
pub use crate::utils::error::Result;
pub use api::HttpBackend;
pub use dispatcher::{DeleteOutcome, MutationDispatcher};
pub use listing::{Listing, View};
pub use selection::SelectionStore;
