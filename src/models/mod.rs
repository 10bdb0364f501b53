//! Data Transfer Objects
//!
//! Batch input and resolution report types.

mod requests;
mod responses;

pub use requests::StyleBatch;
pub use responses::{ResolveReport, ResolvedStyle};
