mod traits;
mod types;

pub use traits::TableStore;
pub use types::{Page, QueryRequest, ScanRequest};
