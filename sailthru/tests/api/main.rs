use sailthru::rate_limit::RateLimitRecorder;
use sailthru::{Client, Error, HttpMethod, signature_hash};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const API_KEY: &str = "test";
const API_SECRET: &str = "super_secret";

fn client_with(server: &MockServer, retries: u32, timeout: Duration) -> Client {
    Client::builder()
        .api_key(API_KEY)
        .api_secret(API_SECRET)
        .api_url(server.uri())
        .retries(retries)
        .timeout(timeout)
        .build()
        .unwrap()
}

fn client(server: &MockServer) -> Client {
    client_with(server, 0, Duration::from_secs(5))
}

fn query_pairs(req: &Request) -> HashMap<String, String> {
    req.url.query_pairs().into_owned().collect()
}

fn form_pairs(req: &Request) -> HashMap<String, String> {
    url::form_urlencoded::parse(&req.body).into_owned().collect()
}

/// 服务端的验签方式：去掉 sig 后重新计算
fn assert_signed(pairs: &HashMap<String, String>) {
    let mut unsigned = pairs.clone();
    let sig = unsigned.remove("sig").expect("sig is missing");
    let v = serde_json::to_value(&unsigned).unwrap();
    assert_eq!(signature_hash(&v, API_SECRET), sig);
}

fn json_param(pairs: &HashMap<String, String>) -> Value {
    serde_json::from_str(&pairs["json"]).unwrap()
}

async fn single_request(server: &MockServer) -> Request {
    let mut requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    requests.remove(0)
}

#[tokio::test]
async fn get_sends_signed_query() {
    let server = MockServer::start().await;
    let user_agent = format!("Sailthru API Rust Client {}", env!("CARGO_PKG_VERSION"));
    Mock::given(method("GET"))
        .and(path("/send"))
        .and(query_param("api_key", API_KEY))
        .and(query_param("format", "json"))
        .and(header("user-agent", user_agent.as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"send_id": "abc123", "email": "praj@sailthru.com"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = client(&server).get_send("abc123").await.unwrap();
    assert!(resp.is_ok());
    assert_eq!(resp.get("email"), Some(&json!("praj@sailthru.com")));

    let req = single_request(&server).await;
    let pairs = query_pairs(&req);
    assert_signed(&pairs);
    assert_eq!(json_param(&pairs), json!({"send_id": "abc123"}));
    assert!(req.body.is_empty());
}

#[tokio::test]
async fn post_sends_signed_form() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/user"))
        .and(body_string_contains("format=json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let options = sailthru::to_params(&json!({
        "vars": {"name": "Prajwal Tuladhar", "address": {"city": "New York", "zip": 11372}},
        "keys": {"fb": "infynyxx", "twitter": "infynyxx"}
    }))
    .unwrap();
    let resp = client(&server)
        .save_user()
        .id("praj@sailthru.com")
        .options(options)
        .build()
        .send()
        .await
        .unwrap();
    assert!(resp.is_ok());

    let req = single_request(&server).await;
    assert!(req.url.query().is_none());
    let pairs = form_pairs(&req);
    assert_signed(&pairs);
    assert_eq!(
        json_param(&pairs),
        json!({
            "id": "praj@sailthru.com",
            "vars": {"name": "Prajwal Tuladhar", "address": {"city": "New York", "zip": 11372}},
            "keys": {"fb": "infynyxx", "twitter": "infynyxx"}
        })
    );
}

#[tokio::test]
async fn delete_uses_query() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/blast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"blast_id": 42, "ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client(&server).delete_blast("42").await.unwrap();
    assert!(resp.is_ok());

    let pairs = query_pairs(&single_request(&server).await);
    assert_signed(&pairs);
    assert_eq!(json_param(&pairs), json!({"blast_id": "42"}));
}

#[tokio::test]
async fn error_document_is_not_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"error": 99, "errormsg": "User not found"})),
        )
        .mount(&server)
        .await;

    let resp = client(&server)
        .get_user()
        .id("nobody@example.com")
        .build()
        .send()
        .await
        .unwrap();
    assert!(!resp.is_ok());
    assert_eq!(resp.status().as_u16(), 400);
    let e = resp.error().unwrap();
    assert_eq!(e.code, 99);
    assert_eq!(e.message, "User not found");
    assert!(!e.is_protocol_error());
}

#[tokio::test]
async fn garbage_body_is_protocol_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let resp = client(&server).get_lists().await.unwrap();
    assert!(!resp.is_ok());
    assert_eq!(resp.body(), "<html>oops</html>");
    let e = resp.error().unwrap();
    assert_eq!(e.code, 0);
    assert!(e.is_protocol_error());
}

#[tokio::test]
async fn retries_on_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/send"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"send_id": "abc"})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_with(&server, 2, Duration::from_secs(5))
        .send_template()
        .template("welcome")
        .email("praj@sailthru.com")
        .build()
        .send()
        .await
        .unwrap();
    assert!(resp.is_ok());
}

#[tokio::test]
async fn server_error_returned_after_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(3)
        .mount(&server)
        .await;

    let resp = client_with(&server, 2, Duration::from_secs(5))
        .get_blast("1")
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 502);
    assert!(resp.error().unwrap().is_protocol_error());
}

#[tokio::test]
async fn no_retry_on_client_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({"error": 3, "errormsg": "Invalid signature"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let resp = client_with(&server, 3, Duration::from_secs(5))
        .get_template("welcome")
        .await
        .unwrap();
    assert_eq!(resp.error().unwrap().code, 3);
}

#[tokio::test]
async fn timeout_is_an_error_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"ok": true}))
                .set_delay(Duration::from_millis(500)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let res = client_with(&server, 2, Duration::from_millis(100))
        .cancel_blast("1")
        .await;
    match res {
        Err(Error::Reqwest(e)) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

/// 统计本 crate 的 WARN 事件，每次重试会打一条
struct WarnCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for WarnCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        if *meta.level() == Level::WARN && meta.target().starts_with("sailthru") {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn connection_failure_is_retried_then_returned() {
    let warns = Arc::new(AtomicUsize::new(0));
    let _guard = tracing::subscriber::set_default(
        tracing_subscriber::registry().with(WarnCounter(warns.clone())),
    );

    let client = Client::builder()
        .api_key(API_KEY)
        .api_secret(API_SECRET)
        .api_url("http://127.0.0.1:9")
        .retries(2)
        .build()
        .unwrap();

    match client.get_send("abc").await {
        Err(Error::Reqwest(e)) => assert!(e.is_connect()),
        other => panic!("expected connect error, got {other:?}"),
    }
    // 3 次尝试，前 2 次失败后各重试一次
    assert_eq!(warns.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn multipart_uploads_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/job"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"job_id": "j1"})))
        .expect(1)
        .mount(&server)
        .await;

    let file = std::env::temp_dir().join(format!("sailthru-import-{}.csv", std::process::id()));
    std::fs::write(&file, "email\npraj@sailthru.com\n").unwrap();

    let params = json!({"job": "import", "list": "weekly", "file": file.to_str().unwrap()});
    let resp = client(&server)
        .api_post_multipart("job", &params, &["file"])
        .await
        .unwrap();
    std::fs::remove_file(&file).ok();
    assert!(resp.is_ok());

    let req = single_request(&server).await;
    let content_type = req.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));

    let body = String::from_utf8_lossy(&req.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains(&format!(
        "filename=\"{}\"",
        file.file_name().unwrap().to_str().unwrap()
    )));
    assert!(body.contains("praj@sailthru.com\n"));
    assert!(body.contains("name=\"sig\""));
    // 文件参数不进 json
    assert!(body.contains(r#"{"job":"import","list":"weekly"}"#));
}

#[tokio::test]
async fn post_with_file_param_goes_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let file = std::env::temp_dir().join(format!("sailthru-file-{}.txt", std::process::id()));
    std::fs::write(&file, "hello").unwrap();
    let resp = client(&server)
        .api_post("job", &json!({"job": "import", "file": file.to_str().unwrap()}))
        .await
        .unwrap();
    std::fs::remove_file(&file).ok();
    assert!(resp.is_ok());

    let req = single_request(&server).await;
    let content_type = req.headers.get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("multipart/form-data"));
}

#[tokio::test]
async fn missing_attachment_fails_before_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let params = json!({"job": "import", "file": "/definitely/not/here.csv"});
    let res = client(&server)
        .api_post_multipart("job", &params, &["file"])
        .await;
    match res {
        Err(Error::File { path, .. }) => {
            assert_eq!(path.to_str(), Some("/definitely/not/here.csv"))
        }
        other => panic!("expected file error, got {other:?}"),
    }
}

#[tokio::test]
async fn rate_limit_headers_are_captured() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"keys": {}}))
                .insert_header("X-Rate-Limit-Limit", "100")
                .insert_header("X-Rate-Limit-Remaining", "50")
                .insert_header("X-Rate-Limit-Reset", "1459520925"),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let recorder = Arc::new(RateLimitRecorder::new());
    let client = Client::builder()
        .api_key(API_KEY)
        .api_secret(API_SECRET)
        .api_url(server.uri())
        .rate_limit_observer(recorder.clone())
        .build()
        .unwrap();

    let resp = client.get_user().id("praj@sailthru.com").build().send().await.unwrap();
    let info = resp.rate_limit().copied().unwrap();
    assert_eq!((info.limit, info.remaining, info.reset), (100, 50, 1459520925));
    assert_eq!(recorder.last("user", HttpMethod::Get), Some(info));
    assert_eq!(recorder.last("user", HttpMethod::Post), None);

    let resp = client.save_user().id("praj@sailthru.com").build().send().await.unwrap();
    assert!(resp.rate_limit().is_none());
    assert_eq!(recorder.last("user", HttpMethod::Post), None);
    assert_eq!(recorder.last("user", "get".parse().unwrap()), Some(info));
}

#[tokio::test]
async fn stats_adds_stat_field() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"count": 10})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .stats_send()
        .template("welcome")
        .start_date("2016-01-01")
        .end_date("2016-02-01")
        .build()
        .send()
        .await
        .unwrap();

    let pairs = query_pairs(&single_request(&server).await);
    assert_eq!(
        json_param(&pairs),
        json!({"stat": "send", "template": "welcome", "start_date": "2016-01-01", "end_date": "2016-02-01"})
    );
}

#[tokio::test]
async fn empty_incomplete_purchase_clears_cart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/purchase"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = client(&server)
        .purchase()
        .email("praj@sailthru.com")
        .items(json!([]))
        .incomplete(1)
        .build()
        .send()
        .await
        .unwrap();
    assert!(resp.is_ok());
    assert!(!sailthru::api::verify_purchase_items(&json!([])));

    let pairs = form_pairs(&single_request(&server).await);
    assert_signed(&pairs);
    assert_eq!(
        json_param(&pairs),
        json!({"email": "praj@sailthru.com", "items": [], "incomplete": 1})
    );
}

#[tokio::test]
async fn summary_alert_requires_when() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/alert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;
    let client = client(&server);

    let res = client
        .save_alert()
        .email("praj@sailthru.com")
        .alert_type(sailthru::api::AlertType::Weekly)
        .template("default")
        .build()
        .send()
        .await;
    assert!(matches!(res, Err(Error::Common(_))));

    // realtime 提醒不发送 when
    client
        .save_alert()
        .email("praj@sailthru.com")
        .alert_type(sailthru::api::AlertType::Realtime)
        .template("default")
        .when("+5 hours")
        .build()
        .send()
        .await
        .unwrap();

    let pairs = form_pairs(&single_request(&server).await);
    assert_eq!(
        json_param(&pairs),
        json!({"email": "praj@sailthru.com", "type": "realtime", "template": "default"})
    );
}
