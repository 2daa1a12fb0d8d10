//! Postback verification.
//!
//! Sailthru calls back into the integrator for verified opens (`verify`), profile updates
//! (`update`), opt-outs (`optout`) and hard bounces (`hardbounce`). A postback is a form post with
//! `action`, `email` and `sig`, plus action specific fields; `sig` is the signature of all the
//! other fields with the account secret.
//!
//! The `receive_*` methods answer `Ok(false)` for any postback that should be rejected. `Err` is
//! reserved for transport failures of the confirmation round trip that `verify` and `hardbounce`
//! make.

use crate::{Client, Error};
use sailthru_common::Params;
use sailthru_common::flatten::{nest_params, scalar_to_string};
use sailthru_common::signature::verify_signature;
use serde_json::Value;
use tracing::debug;

/// Parse a urlencoded postback body, bracket keys become nested values.
pub fn parse_postback(body: &str) -> Params {
    nest_params(url::form_urlencoded::parse(body.as_bytes()).into_owned())
}

/// Whether every key in `required_keys` is present.
pub fn check_for_valid_postback_actions(required_keys: &[&str], params: &Params) -> bool {
    required_keys.iter().all(|k| params.contains_key(*k))
}

impl Client {
    /// 校验必填字段、action 和签名，三者都通过才返回 true
    fn check_postback(&self, params: &Params, required_keys: &[&str], action: &str) -> bool {
        if !check_for_valid_postback_actions(required_keys, params) {
            debug!(action, "postback rejected: missing required fields");
            return false;
        }

        if params.get("action").and_then(Value::as_str) != Some(action) {
            debug!(action, "postback rejected: unexpected action");
            return false;
        }

        let Some(sig) = params.get("sig").and_then(Value::as_str) else {
            debug!(action, "postback rejected: sig is not a string");
            return false;
        };
        let mut unsigned = params.clone();
        unsigned.remove("sig");
        if !verify_signature(&Value::Object(unsigned), &self.api_secret, sig) {
            debug!(action, "postback rejected: signature mismatch");
            return false;
        }

        true
    }

    /// A `verify` postback, confirmed by looking the send up: the send must exist and belong to
    /// the postback's email.
    pub async fn receive_verify_post(&self, params: &Params) -> Result<bool, Error> {
        if !self.check_postback(params, &["action", "email", "send_id", "sig"], "verify") {
            return Ok(false);
        }

        let send_id = params.get("send_id").map(scalar_to_string).unwrap_or_default();
        let send = self.get_send(&send_id).await?;
        let confirmed = match (send.get("email"), params.get("email")) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        };
        if !confirmed {
            debug!(%send_id, "verify postback rejected: send does not match email");
        }
        Ok(confirmed)
    }

    pub async fn receive_update_post(&self, params: &Params) -> Result<bool, Error> {
        Ok(self.check_postback(params, &["action", "email", "sig"], "update"))
    }

    pub async fn receive_optout_post(&self, params: &Params) -> Result<bool, Error> {
        Ok(self.check_postback(params, &["action", "email", "sig"], "optout"))
    }

    /// A `hardbounce` postback. A referenced `send_id` must resolve to a send with an email, a
    /// referenced `blast_id` to a non-empty blast.
    pub async fn receive_hardbounce_post(&self, params: &Params) -> Result<bool, Error> {
        if !self.check_postback(params, &["action", "email", "sig"], "hardbounce") {
            return Ok(false);
        }

        if let Some(send_id) = params.get("send_id") {
            let send = self.get_send(&scalar_to_string(send_id)).await?;
            if !send.is_ok() || send.get("email").is_none() {
                debug!("hardbounce postback rejected: send lookup failed");
                return Ok(false);
            }
        }

        if let Some(blast_id) = params.get("blast_id") {
            let blast = self.get_blast(&scalar_to_string(blast_id)).await?;
            if !blast.is_ok() || blast.json().is_none_or(|b| b.is_empty()) {
                debug!("hardbounce postback rejected: blast lookup failed");
                return Ok(false);
            }
        }

        Ok(true)
    }
}
