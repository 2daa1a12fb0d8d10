use crate::{Client, Error, Response};
use sailthru_common::Params;
use serde_json::{Value, json};

impl Client {
    pub async fn get_template(&self, template: &str) -> Result<Response, Error> {
        self.api_get("template", &json!({ "template": template }))
            .await
    }

    /// 所有模板的基本信息
    pub async fn get_templates(&self) -> Result<Response, Error> {
        self.api_get("template", &Params::new()).await
    }

    pub async fn delete_template(&self, template: &str) -> Result<Response, Error> {
        self.api_delete("template", &json!({ "template": template }))
            .await
    }

    /// 创建或更新模板，`fields` 里放 subject、content_html、from_email 等字段
    pub async fn save_template(&self, template: &str, fields: Params) -> Result<Response, Error> {
        let mut data = fields;
        data.insert("template".to_owned(), Value::from(template));
        self.api_post("template", &data).await
    }
}
