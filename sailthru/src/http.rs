use crate::{Error, Response};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use sailthru_common::Params;
use sailthru_common::flatten::flatten_params;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

// 只对连接失败和这几个状态码重试，读超时不重试
const RETRY_STATUSES: [StatusCode; 4] = [
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive: `"get"`, `"Get"` and `"GET"` are the same method.
impl FromStr for HttpMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(Error::Common(format!("unsupported http method: {s}"))),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A file already read into memory, sent as one multipart part.
pub(crate) struct Attachment {
    pub(crate) name: String,
    pub(crate) file_name: String,
    pub(crate) bytes: Vec<u8>,
}

/// Send the signed envelope, retrying at most `retries` extra times.
///
/// After the last attempt a 5xx answer is handed back as a [`Response`] like any other status.
pub(crate) async fn send_request(
    http_client: &reqwest::Client,
    url: &str,
    method: HttpMethod,
    envelope: &Params,
    attachments: &[Attachment],
    retries: u32,
) -> Result<Response, Error> {
    let fields = flatten_params(envelope);

    let mut attempt = 0;
    loop {
        debug!(%url, %method, attempt, "sending sailthru api request");

        match build_request(http_client, url, method, &fields, attachments)
            .send()
            .await
        {
            Ok(resp) if attempt < retries && RETRY_STATUSES.contains(&resp.status()) => {
                warn!(%url, status = %resp.status(), attempt, "server error, retrying");
            }
            Ok(resp) => return Response::from_reqwest(resp).await,
            Err(e) if attempt < retries && e.is_connect() => {
                warn!(%url, error = %e, attempt, "connection failed, retrying");
            }
            Err(e) => return Err(e.into()),
        }

        attempt += 1;
    }
}

fn build_request(
    http_client: &reqwest::Client,
    url: &str,
    method: HttpMethod,
    fields: &BTreeMap<String, String>,
    attachments: &[Attachment],
) -> reqwest::RequestBuilder {
    let builder = http_client.request(method.into(), url);
    match method {
        // multipart::Form 不能 clone，每次重试都要重新构建
        HttpMethod::Post if !attachments.is_empty() => {
            let mut form = Form::new();
            for (k, v) in fields {
                form = form.text(k.clone(), v.clone());
            }
            for a in attachments {
                let part = Part::bytes(a.bytes.clone()).file_name(a.file_name.clone());
                form = form.part(a.name.clone(), part);
            }
            builder.multipart(form)
        }
        HttpMethod::Post => builder.form(fields),
        HttpMethod::Get | HttpMethod::Delete => builder.query(fields),
    }
}

#[test]
fn http_method_parse_test() {
    assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
    assert_eq!("Post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
    assert_eq!("DELETE".parse::<HttpMethod>().unwrap(), HttpMethod::Delete);
    assert!("PATCH".parse::<HttpMethod>().is_err());
    assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
}
