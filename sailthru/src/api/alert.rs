use crate::{Client, Error, Response};
use bon::Builder;
use sailthru_common::{Params, to_params};
use serde::Serialize;
use serde_json::json;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Realtime,
    Daily,
    Weekly,
}

impl AlertType {
    /// daily/weekly 是汇总提醒，需要 `when`
    pub fn is_summary(&self) -> bool {
        matches!(self, AlertType::Daily | AlertType::Weekly)
    }
}

/// [alert api](https://getstarted.sailthru.com/developers/api/alert/)
#[serde_with::skip_serializing_none]
#[derive(Builder, Serialize)]
pub struct SaveAlert<'a> {
    #[builder(start_fn)]
    #[serde(skip_serializing)]
    client: &'a Client,
    /// match、min、max、tags 等过滤条件
    #[builder(default)]
    #[serde(flatten)]
    options: Params,
    email: &'a str,
    #[serde(rename = "type")]
    alert_type: AlertType,
    template: &'a str,
    /// 汇总提醒的发送时间，如 `+5 hours`
    when: Option<&'a str>,
}

impl Client {
    pub async fn get_alert(&self, email: &str) -> Result<Response, Error> {
        self.api_get("alert", &json!({ "email": email })).await
    }

    pub fn save_alert(&self) -> SaveAlertBuilder<'_> {
        SaveAlert::builder(self)
    }

    pub async fn delete_alert(&self, email: &str, alert_id: &str) -> Result<Response, Error> {
        self.api_delete("alert", &json!({ "email": email, "alert_id": alert_id }))
            .await
    }
}

impl SaveAlert<'_> {
    pub async fn send(&self) -> Result<Response, Error> {
        let mut params = to_params(self)?;
        if self.alert_type.is_summary() {
            if self.when.is_none() {
                return Err(Error::Common(
                    "`when` is required for daily and weekly alerts".to_owned(),
                ));
            }
        } else {
            params.remove("when");
        }

        self.client.api_post("alert", &params).await
    }
}

#[test]
fn alert_type_serialize_test() {
    assert_eq!(serde_json::to_value(AlertType::Weekly).unwrap(), json!("weekly"));
    assert!(AlertType::Daily.is_summary());
    assert!(!AlertType::Realtime.is_summary());
}
