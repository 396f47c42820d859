// * Network layer: plain HTTP page fetching and its error type

pub mod client;
pub mod errors;

pub use client::{detect_soft_ban, HttpSource};
pub use errors::FetchError;
