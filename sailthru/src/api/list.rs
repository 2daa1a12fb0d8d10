use crate::{Client, Error, Response};
use sailthru_common::Params;
use serde_json::{Value, json};

impl Client {
    /// 单个 list 的信息，`options` 原样合并进请求
    pub async fn get_list(&self, list: &str, options: Option<Params>) -> Result<Response, Error> {
        let mut data = Params::new();
        data.insert("list".to_owned(), Value::from(list));
        // 和 user/blast 不同，这里 options 里的同名字段会覆盖 list
        data.extend(options.unwrap_or_default());
        self.api_get("list", &data).await
    }

    pub async fn get_lists(&self) -> Result<Response, Error> {
        self.api_get("list", &Params::new()).await
    }

    /// 上传 list，导入任务排队执行，调用返回后稍等才会生效
    pub async fn save_list(&self, list: &str, emails: &[&str]) -> Result<Response, Error> {
        self.api_post("list", &json!({ "list": list, "emails": emails.join(",") }))
            .await
    }

    pub async fn delete_list(&self, list: &str) -> Result<Response, Error> {
        self.api_delete("list", &json!({ "list": list })).await
    }
}
