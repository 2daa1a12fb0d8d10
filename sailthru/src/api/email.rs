//! `email` api，已被 `user` api 取代

use super::bool_as_int;
use crate::{Client, Error, Response};
use bon::Builder;
use sailthru_common::Params;
use serde::Serialize;
use serde_json::json;

#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct SetEmail<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    email: &'a str,
    #[builder(default)]
    vars: Params,
    /// list 名称 -> 1（订阅）/ 0（退订）
    #[builder(default)]
    lists: Params,
    #[builder(default)]
    templates: Params,
    #[builder(default)]
    #[serde(serialize_with = "bool_as_int")]
    verified: bool,
    optout: Option<u8>,
    /// 更新后立即发送的模板
    send: Option<&'a str>,
    send_vars: Option<Params>,
}

impl Client {
    #[deprecated(note = "use `get_user` instead")]
    pub async fn get_email(&self, email: &str) -> Result<Response, Error> {
        self.api_get("email", &json!({ "email": email })).await
    }

    #[deprecated(note = "use `save_user` instead")]
    pub fn set_email(&self) -> SetEmailBuilder<'_> {
        SetEmail::builder(self)
    }
}

impl SetEmail<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("email", self).await
    }
}
