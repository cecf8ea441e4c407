pub mod entry;
pub mod errors;
pub mod history;
pub mod ident;
pub mod policy;
pub mod store;

pub use entry::*;
pub use errors::CaptureError;
pub use history::{HistoryBuffer, RequestHistory};
pub use ident::{generate, TenantKey, DEFAULT_KEY_BYTES};
pub use store::*;
