//! Traits for the external capabilities the trainer depends on.

mod scheduling_engine;
mod session_client;

pub use scheduling_engine::SchedulingEngine;
pub use session_client::SessionClient;

#[cfg(test)]
pub use scheduling_engine::MockSchedulingEngine;
#[cfg(test)]
pub use session_client::MockSessionClient;
