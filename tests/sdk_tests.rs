//! Integration tests for the SDK facade and portable sessions.

use pmp_sdk::{Error, HostUrl, PmpSdk, SdkConfig, UsageError};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn home_body(base: &str) -> Value {
    json!({
        "version": "1.0",
        "links": {
            "query": [
                {"href-template": format!("{base}/docs{{?guid,limit,profile}}"), "rels": ["urn:collectiondoc:hreftpl:docs"]},
                {"href-template": format!("{base}/profiles/{{guid}}"), "rels": ["urn:collectiondoc:hreftpl:profiles"]},
                {"href-template": format!("{base}/docs{{?limit,profile,tag}}"), "rels": ["urn:collectiondoc:query:docs"]}
            ],
            "auth": [
                {"href": format!("{base}/auth/access_token"), "rels": ["urn:collectiondoc:form:issuetoken"], "hints": {"allow": ["POST"]}}
            ]
        }
    })
}

fn config(server: &MockServer, serial_zip: bool) -> SdkConfig {
    SdkConfig::builder()
        .host(HostUrl::new(server.uri()).unwrap())
        .client_id("id")
        .client_secret("secret")
        .serial_zip(serial_zip)
        .build()
        .unwrap()
}

/// Mounts the home document and the token endpoint, each expected once.
async fn mount_api(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(home_body(&server.uri())))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/access_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "tok"})))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_connect_and_fetch_with_bearer_token() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .and(query_param("guid", "abc"))
        .and(header("Authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"attributes": {"guid": "abc"}})))
        .expect(1)
        .mount(&server)
        .await;

    let sdk = PmpSdk::connect(config(&server, false)).await.unwrap();
    let doc = sdk.fetch_doc("abc", &json!({})).await.unwrap().unwrap();
    assert_eq!(doc.guid(), Some("abc"));
}

#[tokio::test]
async fn test_query_not_found_is_none() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .and(query_param("profile", "story;audio"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    let sdk = PmpSdk::connect(config(&server, false)).await.unwrap();
    let result = sdk
        .query_docs(&json!({"profile": {"OR": ["story", "audio"]}}))
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_query_without_home_link_is_usage_error() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    let sdk = PmpSdk::connect(config(&server, false)).await.unwrap();
    let error = sdk.query_topics(&json!({})).await.unwrap_err();
    assert!(matches!(
        error,
        Error::Usage(UsageError::MissingLink { .. })
    ));
}

#[tokio::test]
async fn test_connect_to_missing_home_is_host_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
        .mount(&server)
        .await;

    let error = PmpSdk::connect(config(&server, false)).await.unwrap_err();
    assert!(matches!(error, Error::Host(_)));
}

#[tokio::test]
async fn test_new_doc_links_profile() {
    let server = MockServer::start().await;
    mount_api(&server).await;

    let sdk = PmpSdk::connect(config(&server, false)).await.unwrap();
    let doc = sdk.new_doc("story", None).unwrap();
    assert_eq!(
        doc.links("profile").first().unwrap().href(),
        Some(format!("{}/profiles/story", server.uri()).as_str())
    );
    assert!(doc.guid().is_none());
}

#[tokio::test]
async fn test_serialize_restore_skips_authentication() {
    let server = MockServer::start().await;
    // Home and token are each fetched exactly once, by connect.
    mount_api(&server).await;

    let sdk = PmpSdk::connect(config(&server, true)).await.unwrap();
    let raw = sdk.serialize().await.unwrap();
    assert!(raw.starts_with("gz="));

    let restored = PmpSdk::restore(&raw).unwrap();
    assert_eq!(
        restored.auth().cached_token().await.unwrap().access_token,
        "tok"
    );
    assert_eq!(
        restored.href_doc("abc").unwrap(),
        format!("{}/docs?guid=abc", server.uri())
    );
}

#[tokio::test]
async fn test_restore_rejects_garbage() {
    assert!(matches!(
        PmpSdk::restore("zz=whatever"),
        Err(Error::Session(_))
    ));
}
