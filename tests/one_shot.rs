mod common;

use common::*;
use rateprobe::config::{Credentials, MenuRequest, RequestBody, RequestTemplate};
use rateprobe::error::ProbeError;
use rateprobe::http_probe::send_once;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn menu_template(base_url: &str) -> RequestTemplate {
    let body = RequestBody::Menu(MenuRequest {
        menu_name: "Katsu BBQ".to_string(),
        shop_id: "MDE5M2E1MDAtODcyMi1jM2UzLWMwMmEtMzBhOTk5YzIyOGEw".to_string(),
        menu_price: 13000,
        menu_status: "Ada".to_string(),
    });
    RequestTemplate::new(&format!("{base_url}/api/v1/menus"), &Credentials::default(), &body)
        .expect("valid request template")
}

#[tokio::test]
async fn test_create_menu_logs_json_response() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/menus"))
        .and(body_json(json!({
            "menu_name": "Katsu BBQ",
            "shop_id": "MDE5M2E1MDAtODcyMi1jM2UzLWMwMmEtMzBhOTk5YzIyOGEw",
            "menu_price": 13000,
            "menu_status": "Ada"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "status": "success",
            "message": "successfully create menu"
        })))
        .expect(1)
        .mount(&mock)
        .await;

    let resp = send_once(&client(), "create-menu", &menu_template(&mock.uri()))
        .await
        .expect("request succeeds");

    assert_eq!(resp.status.as_u16(), 201);
    assert_eq!(resp.body["status"], "success");
}

#[tokio::test]
async fn test_non_json_response_is_kept_as_text() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/menus"))
        .respond_with(ResponseTemplate::new(400).set_body_string("failed to authenticate request"))
        .mount(&mock)
        .await;

    let resp = send_once(&client(), "create-menu", &menu_template(&mock.uri()))
        .await
        .expect("response received");

    assert_eq!(resp.status.as_u16(), 400);
    assert_eq!(resp.body, json!("failed to authenticate request"));
}

#[tokio::test]
async fn test_json_without_json_content_type_is_still_decoded() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/menus"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"status":"success"}"#))
        .mount(&mock)
        .await;

    let resp = send_once(&client(), "create-menu", &menu_template(&mock.uri()))
        .await
        .expect("response received");

    assert_eq!(resp.body, json!({"status": "success"}));
}

#[tokio::test]
async fn test_malformed_json_body_is_a_decode_error() {
    let mock = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/menus"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{\"status\":", "application/json"))
        .mount(&mock)
        .await;

    let err = send_once(&client(), "create-menu", &menu_template(&mock.uri()))
        .await
        .unwrap_err();

    let ProbeError::Transport(source) = err else {
        panic!("expected a transport error, got {err:?}");
    };
    assert!(source.is_decode(), "{source:?}");
}

#[tokio::test]
async fn test_transport_failure_is_returned() {
    let err = send_once(&client(), "create-menu", &menu_template(&unreachable_base_url()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProbeError::Transport(_)));
}
