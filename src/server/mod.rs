pub mod router;
pub mod routes;

pub use router::{RelayState, relay_router};
