//! HTTP API handlers for lxp-ps

pub mod health;
pub mod identity;
pub mod pod;

pub use health::health_routes;
pub use identity::{CallerId, USER_ID_HEADER};
pub use pod::pod_routes;
