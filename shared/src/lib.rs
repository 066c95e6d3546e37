//! Admin authorization core shared by the storefront gate server and any
//! other front end that needs to make the same decisions.
//!
//! Nothing in here verifies token signatures. Decoded claims are for UX
//! gating only; the remote backend re-checks every permission it enforces.

pub mod auth;
pub mod config;
pub mod types;
