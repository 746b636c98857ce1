//! HTTP client wrapper

mod client;

pub use client::{HttpClient, HttpClientBuilder};
