//! Content-addressed record store for ReqCorder.
//!
//! Persists every execution as three YAML documents in a plain directory
//! tree:
//!
//! ```text
//! <root>/
//!   templates/<TemplateHash>.yaml
//!   requests/<TemplateHash>/<RequestHash>.yaml
//!   responses/<RequestHash>/<ResponseId>.yaml
//! ```
//!
//! Templates and requests are content-addressed, so recording an unchanged
//! template again rewrites the same file with the same bytes. Responses get a
//! fresh [`ResponseId`](reqcorder_types::ResponseId) from the store's
//! [`IdSource`] on every write.
//!
//! # Design Rules
//!
//! 1. No database, index file, or transaction log: every query re-walks the tree.
//! 2. Each file write is atomic (temp file + rename); the three writes of one
//!    record are not. A failed record may leave its siblings behind.
//! 3. Listings sort by descending modification time.
//! 4. A top-level root that was never created lists as empty; a missing
//!    specific hash or ID is [`StoreError::NotFound`].
//! 5. All other I/O errors are propagated with their path.

pub mod clock;
pub mod error;
mod fsio;
pub mod layout;
pub mod read;
pub mod record;
pub mod scan;
pub mod store;

pub use clock::{IdSource, ManualIdSource, SystemIdSource};
pub use error::{StoreError, StoreResult};
pub use layout::Layout;
pub use read::Stored;
pub use record::{prepare, PreparedRecord, RecordReceipt};
pub use scan::{sort_newest_first, FileInfo};
pub use store::RecordStore;
