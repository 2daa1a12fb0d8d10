//! Shared-secret request signature.
//!
//! signing string = secret + every scalar leaf rendered as a string, sorted byte-wise and joined
//! without a delimiter. The signature is the lowercase hex MD5 of that string.

use crate::flatten::{extract_params, scalar_to_string};
use md5::{Digest, Md5};
use serde_json::Value;

/// The unhashed signing string for `params`.
pub fn signature_string(params: &Value, secret: &str) -> String {
    let mut values: Vec<String> = extract_params(params)
        .into_iter()
        .map(scalar_to_string)
        .collect();
    // String's Ord compares bytes, never numerically
    values.sort_unstable();

    let mut s = String::with_capacity(secret.len() + values.iter().map(String::len).sum::<usize>());
    s.push_str(secret);
    for v in &values {
        s.push_str(v);
    }
    s
}

pub fn signature_hash(params: &Value, secret: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(signature_string(params, secret).as_bytes());
    hex::encode(hasher.finalize())
}

/// Whether `sig` is the signature of `params`. `params` must not contain `sig` itself.
pub fn verify_signature(params: &Value, secret: &str, sig: &str) -> bool {
    signature_hash(params, secret) == sig
}
