#![doc = include_str!("../README.md")]

pub mod api;
mod client;
mod error;
mod http;
pub mod postback;
pub mod rate_limit;
mod response;

pub use client::{Client, DEFAULT_API_URL, DEFAULT_TIMEOUT};
pub use error::Error;
pub use http::HttpMethod;
pub use response::{ApiError, Response};
pub use sailthru_common::signature::{signature_hash, signature_string};
pub use sailthru_common::{Params, to_params};
