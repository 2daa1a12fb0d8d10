use crate::{Client, Error, Response};
use bon::Builder;
use sailthru_common::Params;
use serde::Serialize;
use serde_json::{Value, json};

const REQUIRED_ITEM_FIELDS: [&str; 5] = ["id", "title", "price", "qty", "url"];

/// `items` 是否为非空列表，且每个商品都带有 `id`、`title`、`price`、`qty`、`url`
pub fn verify_purchase_items(items: &Value) -> bool {
    let Value::Array(items) = items else {
        return false;
    };
    !items.is_empty()
        && items.iter().all(|item| match item {
            Value::Object(fields) => REQUIRED_ITEM_FIELDS.iter().all(|k| fields.contains_key(*k)),
            _ => false,
        })
}

/// [`Client::get_purchase`] 里 `purchase_id` 的含义
#[derive(Serialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PurchaseKey {
    /// sailthru 生成的 id
    #[default]
    Sid,
    /// 记录购买时传入的 `extid`
    Extid,
}

/// [purchase api](https://getstarted.sailthru.com/developers/api/purchase/): 记录一次购买
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct Purchase<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    email: &'a str,
    /// 商品列表，可以先用 [`verify_purchase_items`] 检查
    items: Value,
    /// 购物车未完成
    incomplete: Option<u8>,
    message_id: Option<&'a str>,
    extid: Option<&'a str>,
}

impl Client {
    pub fn purchase(&self) -> PurchaseBuilder<'_> {
        Purchase::builder(self)
    }

    pub async fn get_purchase(
        &self,
        purchase_id: &str,
        purchase_key: PurchaseKey,
    ) -> Result<Response, Error> {
        self.api_get(
            "purchase",
            &json!({ "purchase_id": purchase_id, "purchase_key": purchase_key }),
        )
        .await
    }
}

impl Purchase<'_> {
    /// `items` 原样发送，空列表加上 `incomplete(1)` 表示清空购物车
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("purchase", self).await
    }
}
