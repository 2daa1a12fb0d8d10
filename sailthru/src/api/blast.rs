//! [blast api](https://getstarted.sailthru.com/developers/api/blast/): 群发
//!
//! `options` 可以带上 replyto、report_email、is_link_tracking、is_google_analytics、is_public、
//! suppress_list、test_vars、email_hour_range、abtest、test_percent、data_feed_url 等字段，
//! 显式传入的字段优先。

use crate::{Client, Error, Response};
use bon::Builder;
use sailthru_common::Params;
use serde::Serialize;
use serde_json::json;

#[derive(Builder, Serialize)]
pub struct ScheduleBlast<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    name: &'a str,
    list: &'a str,
    /// 过去的时间会立即发送，也可以是 `now`、`+3 hours` 这样的写法
    schedule_time: &'a str,
    from_name: &'a str,
    from_email: &'a str,
    subject: &'a str,
    content_html: &'a str,
    content_text: &'a str,
}

#[derive(Builder, Serialize)]
pub struct ScheduleBlastFromTemplate<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    #[serde(rename = "copy_template")]
    template: &'a str,
    list: &'a str,
    schedule_time: &'a str,
}

#[derive(Builder, Serialize)]
pub struct ScheduleBlastFromBlast<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    #[serde(rename = "copy_blast")]
    blast_id: &'a str,
    schedule_time: &'a str,
}

#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct UpdateBlast<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    blast_id: &'a str,
    name: Option<&'a str>,
    list: Option<&'a str>,
    schedule_time: Option<&'a str>,
    from_name: Option<&'a str>,
    from_email: Option<&'a str>,
    subject: Option<&'a str>,
    content_html: Option<&'a str>,
    content_text: Option<&'a str>,
}

impl Client {
    pub fn schedule_blast(&self) -> ScheduleBlastBuilder<'_> {
        ScheduleBlast::builder(self)
    }

    pub fn schedule_blast_from_template(&self) -> ScheduleBlastFromTemplateBuilder<'_> {
        ScheduleBlastFromTemplate::builder(self)
    }

    pub fn schedule_blast_from_blast(&self) -> ScheduleBlastFromBlastBuilder<'_> {
        ScheduleBlastFromBlast::builder(self)
    }

    pub fn update_blast(&self) -> UpdateBlastBuilder<'_> {
        UpdateBlast::builder(self)
    }

    pub async fn get_blast(&self, blast_id: &str) -> Result<Response, Error> {
        self.api_get("blast", &json!({ "blast_id": blast_id }))
            .await
    }

    pub async fn delete_blast(&self, blast_id: &str) -> Result<Response, Error> {
        self.api_delete("blast", &json!({ "blast_id": blast_id }))
            .await
    }

    /// 取消定时：`schedule_time` 置空，blast 回到草稿状态
    pub async fn cancel_blast(&self, blast_id: &str) -> Result<Response, Error> {
        self.api_post("blast", &json!({ "blast_id": blast_id, "schedule_time": "" }))
            .await
    }
}

impl ScheduleBlast<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("blast", self).await
    }
}

impl ScheduleBlastFromTemplate<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("blast", self).await
    }
}

impl ScheduleBlastFromBlast<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("blast", self).await
    }
}

impl UpdateBlast<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("blast", self).await
    }
}
