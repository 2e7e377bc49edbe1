//! The request dispatcher and the pieces it is built from.

pub mod client;
pub mod envelope;
pub mod status;
pub mod types;
