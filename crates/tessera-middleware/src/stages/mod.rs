//! Built-in middleware stages.
//!
//! | Stage | Purpose |
//! |-------|---------|
//! | [`RequestIdMiddleware`] | Assign or propagate the request ID (UUID v7) |
//! | [`ErrorNormalizationMiddleware`] | Render dispatch faults as error envelopes |
//!
//! The action handler itself lives in `tessera-action`.

pub mod error_normalization;
pub mod request_id;

pub use error_normalization::{ErrorNormalizationMiddleware, DEFAULT_INTERNAL_ERROR_MESSAGE};
pub use request_id::{RequestIdMiddleware, REQUEST_ID_HEADER};
