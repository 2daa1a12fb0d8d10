//! [stats api](https://getstarted.sailthru.com/developers/api/stats/): 都是 GET `stats`，
//! 用 `stat` 区分 list / blast / send

use crate::{Client, Error, Response};
use bon::Builder;
use sailthru_common::{Params, to_params};
use serde::Serialize;
use serde_json::Value;

/// 订阅人数统计，可以限定某个 list 和某一天
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct StatsList<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    list: Option<&'a str>,
    date: Option<&'a str>,
}

/// 单个 blast 的统计，或者一段时间内所有 blast 的汇总
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct StatsBlast<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    blast_id: Option<&'a str>,
    start_date: Option<&'a str>,
    end_date: Option<&'a str>,
}

/// 某个模板的 transactional 发送统计
#[derive(Builder, Serialize)]
pub struct StatsSend<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    template: &'a str,
    start_date: &'a str,
    end_date: &'a str,
}

impl Client {
    pub fn stats_list(&self) -> StatsListBuilder<'_> {
        StatsList::builder(self)
    }

    pub fn stats_blast(&self) -> StatsBlastBuilder<'_> {
        StatsBlast::builder(self)
    }

    pub fn stats_send(&self) -> StatsSendBuilder<'_> {
        StatsSend::builder(self)
    }

    async fn stats(&self, stat: &str, query: &impl Serialize) -> Result<Response, Error> {
        let mut params = to_params(query)?;
        params.insert("stat".to_owned(), Value::from(stat));
        self.api_get("stats", &params).await
    }
}

impl StatsList<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.stats("list", self).await
    }
}

impl StatsBlast<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.stats("blast", self).await
    }
}

impl StatsSend<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.stats("send", self).await
    }
}
