use crate::{Client, Error, Response};
use sailthru_common::Params;
use serde_json::Value;

impl Client {
    /// 导入网页邮箱（AOL、Gmail、Hotmail、Yahoo! Mail）的通讯录
    pub async fn import_contacts(
        &self,
        email: &str,
        password: &str,
        include_name: bool,
    ) -> Result<Response, Error> {
        let mut data = Params::new();
        data.insert("email".to_owned(), Value::from(email));
        data.insert("password".to_owned(), Value::from(password));
        if include_name {
            data.insert("names".to_owned(), Value::from(1));
        }
        self.api_post("contacts", &data).await
    }
}
