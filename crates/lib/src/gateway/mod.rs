//! Gateway: the HTTP webhook the messaging platform calls.
//!
//! `GET /webhook` answers the registration handshake; `POST /webhook` receives events and
//! hands them to the dispatcher. `GET /` is a health probe.

mod protocol;
mod server;

pub use protocol::{VerifyQuery, SUBSCRIBE_MODE};
pub use server::{router, run_gateway, GatewayState};
