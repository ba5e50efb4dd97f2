//! Foundation types for dagwalk.
//!
//! Every other dagwalk crate depends on `dagwalk-types`. It currently holds a
//! single primitive, the content identifier that names a stored block.
//!
//! # Key Types
//!
//! - [`Cid`] — Content identifier of an immutable block, as written inside a
//!   link (`{"/": "<cid>"}`)
//! - [`TypeError`] — Validation failures when parsing identifiers

pub mod cid;
pub mod error;

pub use cid::Cid;
pub use error::{TypeError, TypeResult};
