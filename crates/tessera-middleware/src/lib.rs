//! # Tessera Middleware
//!
//! The middleware chain the action handler runs in.
//!
//! ```text
//! Request → RequestId → ErrorNormalization → ActionHandler → (fallback)
//!                                                 ↓
//! Response ←──────────────────────────────────────┘
//! ```
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Middleware`] | A stage: answer the request or delegate to [`Next`] |
//! | [`RequestHandler`] | Terminal handler when every stage delegates |
//! | [`Pipeline`] | Ordered stages plus fallback, shared across requests |
//! | [`DispatchError`] | Fatal fault that bypasses action error recovery |
//!
//! ## Example
//!
//! ```
//! use tessera_middleware::{Pipeline, stages::{ErrorNormalizationMiddleware, RequestIdMiddleware}};
//!
//! let pipeline = Pipeline::builder()
//!     .stage(RequestIdMiddleware::new())
//!     .stage(ErrorNormalizationMiddleware::new())
//!     .build();
//!
//! assert_eq!(pipeline.stage_count(), 2);
//! ```

#![doc(html_root_url = "https://docs.rs/tessera-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod middleware;
pub mod pipeline;
pub mod stages;

// Re-export main types at crate root
pub use error::DispatchError;
pub use middleware::{BoxedMiddleware, FnMiddleware, Middleware, Next, RequestHandler};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use tessera_core::{Response, ResponseExt};
