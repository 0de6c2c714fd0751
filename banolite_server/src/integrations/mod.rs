//! Clients for the external services the marketplace leans on: transactional email, object storage for uploads, and
//! the AI chat relay. All of them are best-effort from the point of view of order fulfillment; a failure here never
//! fails an order.
mod chat;
mod email;
mod storage;

pub use chat::{ChatApi, ChatApiError};
pub use email::{EmailApi, EmailApiError};
pub use storage::{ObjectStorage, StorageError, ALLOWED_BUCKETS, MAX_UPLOAD_BYTES};
