use crate::{Client, Error, Response};
use bon::Builder;
use sailthru_common::Params;
use serde::Serialize;

/// [user api](https://getstarted.sailthru.com/developers/api/user/)
#[derive(Builder, Serialize)]
pub struct GetUser<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    /// key、fields 等其它参数，`id` 会覆盖其中的同名字段
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    /// 默认是邮箱，其它 key 通过 options 里的 `key` 指定
    id: &'a str,
}

#[derive(Builder, Serialize)]
pub struct SaveUser<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    /// vars、lists、keys、optout_email 等
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    id: &'a str,
}

impl Client {
    pub fn get_user(&self) -> GetUserBuilder<'_> {
        GetUser::builder(self)
    }

    pub fn save_user(&self) -> SaveUserBuilder<'_> {
        SaveUser::builder(self)
    }
}

impl GetUser<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_get("user", self).await
    }
}

impl SaveUser<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        self.client.api_post("user", self).await
    }
}
