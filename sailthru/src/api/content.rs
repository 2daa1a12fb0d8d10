use super::join_with_comma;
use crate::{Client, Error, Response};
use bon::Builder;
use sailthru_common::Params;
use serde::{Serialize, Serializer};

/// [content api](https://getstarted.sailthru.com/developers/api/content/): 推送一条内容
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct PushContent<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    #[builder(field)]
    #[serde(
        serialize_with = "join_with_comma",
        skip_serializing_if = "Vec::is_empty"
    )]
    tags: Vec<&'a str>,
    title: &'a str,
    url: &'a str,
    /// `full`、`thumb` 两种图片
    images: Option<Params>,
    date: Option<&'a str>,
    expire_date: Option<&'a str>,
    description: Option<&'a str>,
    /// [经度, 纬度]
    location: Option<[f64; 2]>,
    /// 单位为分
    price: Option<u64>,
    author: Option<&'a str>,
    site_name: Option<&'a str>,
    /// 强制重新抓取页面
    #[builder(default)]
    #[serde(serialize_with = "spider_flag", skip_serializing_if = "is_false")]
    spider: bool,
    #[builder(default)]
    #[serde(skip_serializing_if = "Params::is_empty")]
    vars: Params,
}

fn spider_flag<S>(_: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(1)
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl<'a, S: push_content_builder::State> PushContentBuilder<'a, S> {
    pub fn tag(mut self, tag: &'a str) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = &'a str>) -> Self {
        self.tags.extend(tags);
        self
    }
}

impl Client {
    pub fn push_content(&self) -> PushContentBuilder<'_> {
        PushContent::builder(self)
    }
}

impl PushContent<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("content", self).await
    }
}
