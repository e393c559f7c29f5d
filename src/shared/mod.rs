pub(crate) mod error;
pub(crate) mod html;
pub(crate) mod security;
