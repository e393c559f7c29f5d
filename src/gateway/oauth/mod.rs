//! Usage: One-shot OAuth2 authorization code flow (login link, callback, token exchange).

pub(crate) mod authorize;
pub(crate) mod callback;
pub(crate) mod report;
pub(crate) mod token_exchange;
