//! Relay core library: webhook gateway, menu dispatch, coordinator directory and the
//! WhatsApp Cloud API sender used by the `relay` binary.

pub mod channels;
pub mod config;
pub mod directory;
pub mod dispatch;
pub mod gateway;
