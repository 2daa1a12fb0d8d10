use super::join_with_comma;
use crate::{Client, Error, Response};
use bon::Builder;
use sailthru_common::Params;
use serde::Serialize;
use serde_json::json;

/// [send api](https://getstarted.sailthru.com/developers/api/send/): 把模板发给单个邮箱
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct SendTemplate<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    template: &'a str,
    email: &'a str,
    /// 模板里用 `{varname}` 引用的替换变量
    #[builder(default)]
    vars: Params,
    /// replyto、test 等
    #[builder(default)]
    options: Params,
    limit: Option<Params>,
    /// 不立即发送，到这个时间再发，要带上时区
    schedule_time: Option<&'a str>,
}

/// 把模板发给多个邮箱
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct MultiSend<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    template: &'a str,
    #[serde(rename = "email", serialize_with = "join_with_comma")]
    emails: &'a [&'a str],
    #[builder(default)]
    vars: Params,
    /// 每个邮箱单独的变量，key 为邮箱
    #[builder(default)]
    evars: Params,
    #[builder(default)]
    options: Params,
    schedule_time: Option<&'a str>,
}

impl Client {
    pub fn send_template(&self) -> SendTemplateBuilder<'_> {
        SendTemplate::builder(self)
    }

    pub fn multi_send(&self) -> MultiSendBuilder<'_> {
        MultiSend::builder(self)
    }

    /// 查询一次发送的状态
    pub async fn get_send(&self, send_id: &str) -> Result<Response, Error> {
        self.api_get("send", &json!({ "send_id": send_id })).await
    }

    /// 取消带 `schedule_time` 的定时发送，已经发出的不能取消
    pub async fn cancel_send(&self, send_id: &str) -> Result<Response, Error> {
        self.api_delete("send", &json!({ "send_id": send_id }))
            .await
    }
}

impl SendTemplate<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("send", self).await
    }
}

impl MultiSend<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        if self.emails.is_empty() {
            return Err(Error::Common("emails cannot be empty".to_owned()));
        }
        self.client.api_post("send", self).await
    }
}
