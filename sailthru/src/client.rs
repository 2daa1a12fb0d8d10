use crate::http::{Attachment, HttpMethod, send_request};
use crate::rate_limit::RateLimitObserver;
use crate::{Error, Response};
use bon::bon;
use sailthru_common::signature::signature_hash;
use sailthru_common::{Params, to_params};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_URL: &str = "https://api.sailthru.com";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

fn default_user_agent() -> String {
    format!("Sailthru API Rust Client {}", env!("CARGO_PKG_VERSION"))
}

pub struct Client {
    pub(crate) api_key: String,
    pub(crate) api_secret: String,
    api_url: String,
    retries: u32,
    http_client: reqwest::Client,
    rate_limit_observer: Option<Arc<dyn RateLimitObserver>>,
}

#[bon]
impl Client {
    /// - `api_url`: 默认 [`DEFAULT_API_URL`]
    /// - `timeout`: 每次请求的超时时间，默认 10s
    /// - `retries`: 连接失败或 500/502/503/504 时最多额外重试的次数，默认不重试
    #[builder(on(String, into))]
    pub fn new(
        api_key: String,
        api_secret: String,
        #[builder(default = DEFAULT_API_URL.to_owned())] api_url: String,
        #[builder(default = DEFAULT_TIMEOUT)] timeout: Duration,
        #[builder(default)] retries: u32,
        #[builder(default = default_user_agent())] user_agent: String,
        rate_limit_observer: Option<Arc<dyn RateLimitObserver>>,
    ) -> Result<Self, Error> {
        Url::parse(&api_url)
            .map_err(|e| Error::Common(format!("invalid api_url `{api_url}`: {e}")))?;

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            api_key,
            api_secret,
            api_url: api_url.trim_end_matches('/').to_owned(),
            retries,
            http_client,
            rate_limit_observer,
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// GET `action`, params travel in the query string.
    pub async fn api_get(&self, action: &str, params: &impl Serialize) -> Result<Response, Error> {
        self.api_request(action, to_params(params)?, HttpMethod::Get)
            .await
    }

    /// POST `action` as a urlencoded form.
    ///
    /// A string `file` param is uploaded as a file, like [`api_post_multipart`](Self::api_post_multipart)
    /// with `["file"]`.
    pub async fn api_post(&self, action: &str, params: &impl Serialize) -> Result<Response, Error> {
        let params = to_params(params)?;
        if matches!(params.get("file"), Some(Value::String(_))) {
            return self.post_multipart(action, params, &["file"]).await;
        }
        self.api_request(action, params, HttpMethod::Post).await
    }

    pub async fn api_delete(
        &self,
        action: &str,
        params: &impl Serialize,
    ) -> Result<Response, Error> {
        self.api_request(action, to_params(params)?, HttpMethod::Delete)
            .await
    }

    /// POST `action` as multipart.
    ///
    /// Every name in `binary_params` that is present in `params` must hold a file path; the file
    /// is read before anything is sent and uploaded as a part with that name. The remaining params
    /// go into the signed json envelope as usual.
    pub async fn api_post_multipart(
        &self,
        action: &str,
        params: &impl Serialize,
        binary_params: &[&str],
    ) -> Result<Response, Error> {
        self.post_multipart(action, to_params(params)?, binary_params)
            .await
    }

    async fn post_multipart(
        &self,
        action: &str,
        mut params: Params,
        binary_params: &[&str],
    ) -> Result<Response, Error> {
        let mut attachments = Vec::with_capacity(binary_params.len());
        for name in binary_params {
            let Some(v) = params.remove(*name) else {
                continue;
            };
            let path = match v {
                Value::String(s) => PathBuf::from(s),
                other => {
                    return Err(Error::Common(format!(
                        "binary param `{name}` must be a file path, got: {other}"
                    )));
                }
            };
            attachments.push(read_attachment(name, path).await?);
        }

        let envelope = self.prepare_json_payload(&params)?;
        self.http_request(action, HttpMethod::Post, &envelope, &attachments)
            .await
    }

    async fn api_request(
        &self,
        action: &str,
        params: Params,
        method: HttpMethod,
    ) -> Result<Response, Error> {
        let envelope = self.prepare_json_payload(&params)?;
        self.http_request(action, method, &envelope, &[]).await
    }

    /// The signed envelope: `api_key`, `format`, `json` and `sig`.
    ///
    /// `json` is signed as one opaque string, the fields inside it are not signed individually.
    pub(crate) fn prepare_json_payload(&self, params: &Params) -> Result<Params, Error> {
        let mut payload = Params::new();
        payload.insert("api_key".to_owned(), Value::from(self.api_key.as_str()));
        payload.insert("format".to_owned(), Value::from("json"));
        payload.insert("json".to_owned(), Value::from(serde_json::to_string(params)?));

        let sig = signature_hash(&Value::Object(payload.clone()), &self.api_secret);
        payload.insert("sig".to_owned(), Value::from(sig));
        Ok(payload)
    }

    async fn http_request(
        &self,
        action: &str,
        method: HttpMethod,
        envelope: &Params,
        attachments: &[Attachment],
    ) -> Result<Response, Error> {
        let url = format!("{}/{}", self.api_url, action);
        let resp = send_request(
            &self.http_client,
            &url,
            method,
            envelope,
            attachments,
            self.retries,
        )
        .await?;

        if let Some(observer) = &self.rate_limit_observer {
            observer.observe(action, method, resp.rate_limit());
        }
        Ok(resp)
    }
}

async fn read_attachment(name: &str, path: PathBuf) -> Result<Attachment, Error> {
    let bytes = match tokio::fs::read(&path).await {
        Ok(b) => b,
        Err(source) => return Err(Error::File { path, source }),
    };
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_owned());

    Ok(Attachment {
        name: name.to_owned(),
        file_name,
        bytes,
    })
}
