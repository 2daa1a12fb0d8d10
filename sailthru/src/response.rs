use crate::Error;
use crate::rate_limit::RateLimitInfo;
use reqwest::StatusCode;
use sailthru_common::Params;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// An error reported through a response body.
///
/// `code` is the api's own error code, `0` when the body was not a json object or its `error`
/// field is not a whole number. Whether the body could be parsed at all is told by
/// [`is_protocol_error`](Self::is_protocol_error), not by the code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("sailthru api error {code}: {message}")]
pub struct ApiError {
    pub code: i64,
    pub message: String,
    protocol: bool,
}

impl ApiError {
    /// The server sent something that could not be parsed, as opposed to a well formed error
    /// document.
    pub fn is_protocol_error(&self) -> bool {
        self.protocol
    }

    fn protocol(message: String) -> Self {
        Self {
            code: 0,
            message,
            protocol: true,
        }
    }

    fn from_body(body: &Params) -> Self {
        let code = match body.get("error") {
            Some(Value::Number(n)) => whole_number(n.as_i64(), n.as_f64()),
            Some(Value::String(s)) => {
                let s = s.trim();
                whole_number(s.parse().ok(), s.parse().ok())
            }
            _ => None,
        };
        let message = match body.get("errormsg") {
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        Self {
            code: code.unwrap_or_default(),
            message,
            protocol: false,
        }
    }
}

// `3` 和 `3.0` 都算错误码 3
fn whole_number(int: Option<i64>, float: Option<f64>) -> Option<i64> {
    int.or_else(|| {
        float
            .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
            .map(|f| f as i64)
    })
}

/// One http answer from the api. Immutable once built.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    body: String,
    json: Result<Params, String>,
    rate_limit: Option<RateLimitInfo>,
}

impl Response {
    pub fn new(
        status: StatusCode,
        body: impl Into<String>,
        rate_limit: Option<RateLimitInfo>,
    ) -> Self {
        let body = body.into();
        let json = parse_body(&body);
        Self {
            status,
            body,
            json,
            rate_limit,
        }
    }

    pub(crate) async fn from_reqwest(resp: reqwest::Response) -> Result<Self, Error> {
        let status = resp.status();
        let rate_limit = RateLimitInfo::from_headers(resp.headers());
        let body = resp.text().await?;
        Ok(Self::new(status, body, rate_limit))
    }

    /// The body is a json object without an `error` key.
    pub fn is_ok(&self) -> bool {
        matches!(&self.json, Ok(body) if !body.contains_key("error"))
    }

    /// `None` when [`is_ok`](Self::is_ok) holds.
    pub fn error(&self) -> Option<ApiError> {
        match &self.json {
            Err(msg) => Some(ApiError::protocol(msg.clone())),
            Ok(body) if body.contains_key("error") => Some(ApiError::from_body(body)),
            Ok(_) => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Raw body text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Parsed body, `None` if it is not a json object.
    pub fn json(&self) -> Option<&Params> {
        self.json.as_ref().ok()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.json()?.get(key)
    }

    pub fn rate_limit(&self) -> Option<&RateLimitInfo> {
        self.rate_limit.as_ref()
    }

    pub fn into_result(self) -> Result<Params, ApiError> {
        if let Some(e) = self.error() {
            return Err(e);
        }
        self.json.map_err(ApiError::protocol)
    }

    /// Decode the body into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|e| {
            Error::Common(format!(
                "parse response json error: {}, response text: {}",
                e, self.body
            ))
        })
    }
}

fn parse_body(body: &str) -> Result<Params, String> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("response body is not a json object".to_owned()),
        Err(e) => Err(format!("invalid json response body: {e}")),
    }
}
