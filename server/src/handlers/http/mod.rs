pub mod admin;
pub mod routes;
pub mod utils;

pub use routes::{RequestSession, Router};
