//! Credential bundles issued by the authorization server and their redacted secrets.

pub mod record;
pub mod secret;
