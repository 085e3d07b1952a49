//! Session transport plumbing shared by [`SessionClient`] implementations.
//!
//! [`SessionClient`]: crate::traits::SessionClient

mod correlation;

pub use correlation::{CorrelationTable, RequestId};
