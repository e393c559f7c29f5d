//! Usage: HTTP surface of the bootstrap helper (router, listener, OAuth handlers).

pub(crate) mod listen;
pub(crate) mod oauth;
mod routes;
pub(crate) mod server;
