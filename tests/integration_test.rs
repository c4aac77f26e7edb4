use chrono::{Datelike, Utc};
use futures_util::future::join_all;
use registration_gateway::{seed_records, GatewayConfig, GatewayServer};
use serde_json::{json, Value};
use std::time::{Duration, Instant};

async fn start(config: GatewayConfig) -> GatewayServer {
    GatewayServer::new(config.with_port(0).with_confirmation_delay(Duration::ZERO))
        .await
        .unwrap()
}

fn registration() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": "ada@example.com",
        "dateOfBirth": "1990-12-10",
        "password": "secret",
        "confirmPassword": "secret",
    })
}

async fn users(client: &reqwest::Client, server: &GatewayServer) -> Vec<Value> {
    client
        .get(format!("{}/users", server.url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn post_user(
    client: &reqwest::Client,
    server: &GatewayServer,
    body: &Value,
) -> reqwest::Response {
    client
        .post(format!("{}/users", server.url()))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_greeting() {
    let server = start(GatewayConfig::default()).await;

    let response = reqwest::get(server.url()).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "Hello World");
}

#[tokio::test]
async fn test_lists_seed_records() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    let users = users(&client, &server).await;

    let expected = serde_json::to_value(seed_records()).unwrap();
    assert_eq!(Value::Array(users.clone()), expected);
    assert_eq!(users[0]["firstName"], "John");
    assert_eq!(users[1]["dateOfBirth"], "1975-07-26");
}

#[tokio::test]
async fn test_register_prepends_without_passwords() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    let response = post_user(&client, &server, &registration()).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "success" }));

    let users = users(&client, &server).await;
    assert_eq!(users.len(), 3);
    assert_eq!(
        users[0],
        json!({
            "id": 3,
            "firstName": "Ada",
            "lastName": "Lovelace",
            "dateOfBirth": "1990-12-10",
            "email": "ada@example.com",
        })
    );
}

#[tokio::test]
async fn test_missing_fields_are_rejected() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    for field in ["firstName", "lastName", "email", "dateOfBirth"] {
        let mut body = registration();
        body.as_object_mut().unwrap().remove(field);

        let response = post_user(&client, &server, &body).await;
        assert_eq!(response.status(), 400, "missing {field}");

        let violations: Vec<Value> = response.json().await.unwrap();
        assert!(
            violations.contains(&json!({ "field": field, "message": "Required" })),
            "missing {field}: {violations:?}"
        );
    }

    assert_eq!(server.store().len().await, 2);
}

#[tokio::test]
async fn test_password_mismatch_is_rejected() {
    let server = start(GatewayConfig::confirm_password()).await;
    let client = reqwest::Client::new();

    let mut body = registration();
    body["confirmPassword"] = json!("different");

    let response = post_user(&client, &server, &body).await;
    assert_eq!(response.status(), 400);

    let violations: Vec<Value> = response.json().await.unwrap();
    assert_eq!(
        violations,
        vec![json!({ "field": "confirmPassword", "message": "Passwords don't match" })]
    );
    assert_eq!(server.store().len().await, 2);
}

#[tokio::test]
async fn test_minimum_age_profile() {
    let server = start(GatewayConfig::minimum_age()).await;
    let client = reqwest::Client::new();

    let mut body = registration();
    body.as_object_mut().unwrap().remove("confirmPassword");
    body["dateOfBirth"] = json!(format!("{}-01-01", Utc::now().year() - 10));

    let response = post_user(&client, &server, &body).await;
    assert_eq!(response.status(), 400);
    let violations: Vec<Value> = response.json().await.unwrap();
    assert_eq!(violations[0]["field"], "dateOfBirth");
    assert_eq!(server.store().len().await, 2);

    body["dateOfBirth"] = json!("1990-12-10");
    let response = post_user(&client, &server, &body).await;
    assert_eq!(response.status(), 200);
    assert_eq!(server.store().len().await, 3);
}

#[tokio::test]
async fn test_malformed_json_leaves_store_unchanged() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/users", server.url()))
        .header("Content-Type", "application/json")
        .body("{\"firstName\": ")
        .send()
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert_eq!(server.store().len().await, 2);
}

#[tokio::test]
async fn test_reset_restores_seed_records() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    post_user(&client, &server, &registration()).await;
    post_user(&client, &server, &registration()).await;
    assert_eq!(server.store().len().await, 4);

    let response = client
        .get(format!("{}/reset", server.url()))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "status": "success" }));

    assert_eq!(server.store().list().await, seed_records());
}

#[tokio::test]
async fn test_users_wrong_shifts_dates() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    let users: Vec<Value> = client
        .get(format!("{}/users_wrong", server.url()))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0]["firstname"], "John");
    assert_eq!(users[0]["lastname"], "Doe");
    assert_eq!(users[0]["dateOfBirth"], "2523-01-01");
    assert!(users[0].get("firstName").is_none());
    assert_eq!(users[1]["dateOfBirth"], "2518-07-26");
}

#[tokio::test]
async fn test_listing_is_idempotent() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    post_user(&client, &server, &registration()).await;

    let first = users(&client, &server).await;
    let second = users(&client, &server).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/users", server.url()))
        .header("Origin", "http://frontend.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}

#[tokio::test]
async fn test_registration_commits_before_delayed_reply() {
    let delay = Duration::from_millis(500);
    let server = GatewayServer::new(
        GatewayConfig::default()
            .with_port(0)
            .with_confirmation_delay(delay),
    )
    .await
    .unwrap();
    let store = server.store();
    let url = format!("{}/users", server.url());

    let started = Instant::now();
    let pending = tokio::spawn(async move {
        reqwest::Client::new()
            .post(url)
            .json(&registration())
            .send()
            .await
            .unwrap()
    });

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(store.len().await, 3);
    assert!(!pending.is_finished());

    let response = pending.await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(started.elapsed() >= delay);
}

#[tokio::test]
async fn test_concurrent_registrations_get_distinct_ids() {
    let server = start(GatewayConfig::default()).await;
    let client = reqwest::Client::new();

    let body = registration();
    let responses = join_all((0..8).map(|_| post_user(&client, &server, &body))).await;
    assert!(responses.iter().all(|r| r.status() == 200));

    let mut ids: Vec<u64> = users(&client, &server)
        .await
        .iter()
        .map(|u| u["id"].as_u64().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=10).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_injected_store_is_served() {
    use registration_gateway::MemoryStore;
    use std::sync::Arc;

    let store = Arc::new(MemoryStore::with_records(Vec::new()));
    let server = GatewayServer::with_store(
        GatewayConfig::default()
            .with_port(0)
            .with_confirmation_delay(Duration::ZERO),
        store.clone(),
    )
    .await
    .unwrap();
    let client = reqwest::Client::new();

    assert!(users(&client, &server).await.is_empty());

    post_user(&client, &server, &registration()).await;
    let users = users(&client, &server).await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["id"], 1);
}
