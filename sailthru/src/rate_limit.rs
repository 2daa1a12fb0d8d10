//! Rate limit snapshots sent back by the api.
//!
//! Every [`Response`](crate::Response) carries the snapshot of its own call. To keep the latest
//! snapshot per (resource, method) pair across calls, hand the client a [`RateLimitObserver`],
//! e.g. a [`RateLimitRecorder`]. Nothing here throttles requests.

use crate::HttpMethod;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use time::OffsetDateTime;

pub const LIMIT_HEADER: &str = "x-rate-limit-limit";
pub const REMAINING_HEADER: &str = "x-rate-limit-remaining";
pub const RESET_HEADER: &str = "x-rate-limit-reset";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitInfo {
    pub limit: u64,
    pub remaining: u64,
    /// unix timestamp (seconds)
    pub reset: i64,
}

impl RateLimitInfo {
    /// `None` unless all three headers are present and numeric.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        Some(Self {
            limit: header_num(headers, LIMIT_HEADER)?,
            remaining: header_num(headers, REMAINING_HEADER)?,
            reset: header_num(headers, RESET_HEADER)?,
        })
    }

    pub fn reset_at(&self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp(self.reset).ok()
    }
}

fn header_num<T: FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers.get(name)?.to_str().ok()?.trim().parse().ok()
}

/// Called once after every api call, `info` is `None` when the response had no rate limit headers.
pub trait RateLimitObserver: Send + Sync {
    fn observe(&self, action: &str, method: HttpMethod, info: Option<&RateLimitInfo>);
}

/// Keeps the last snapshot seen for each (resource, method) pair.
#[derive(Debug, Default)]
pub struct RateLimitRecorder {
    last: Mutex<HashMap<(String, HttpMethod), Option<RateLimitInfo>>>,
}

impl RateLimitRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last snapshot for `action` called with `method`, `None` if there was no such call or it
    /// carried no rate limit headers.
    pub fn last(&self, action: &str, method: HttpMethod) -> Option<RateLimitInfo> {
        let last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        last.get(&(action.to_owned(), method)).copied().flatten()
    }
}

impl RateLimitObserver for RateLimitRecorder {
    fn observe(&self, action: &str, method: HttpMethod, info: Option<&RateLimitInfo>) {
        let mut last = self.last.lock().unwrap_or_else(PoisonError::into_inner);
        last.insert((action.to_owned(), method), info.copied());
    }
}
