//! Integration tests for link following, pagination and document writes.

use pmp_sdk::hypermedia::{ApiContext, Document, Link, LinkSet, PageIterator};
use pmp_sdk::{Error, HttpClient, TransportOptions, UsageError};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn context() -> ApiContext {
    ApiContext::new(HttpClient::new(TransportOptions::default(), None))
}

/// Builds a results page linking to the next one.
fn results_page(base: &str, num: u64, total: u64) -> Value {
    let mut navigation = vec![json!({
        "href": format!("{base}/docs?page={num}"),
        "rels": ["self"],
        "pagenum": num,
        "totalpages": total,
        "totalitems": total * 2
    })];
    if num < total {
        navigation.push(json!({
            "href": format!("{base}/docs?page={}", num + 1),
            "rels": ["next"],
            "pagenum": num + 1
        }));
    }
    json!({
        "version": "1.0",
        "links": {"navigation": navigation},
        "items": [
            {"attributes": {"guid": format!("item-{num}-a")}},
            {"attributes": {"guid": format!("item-{num}-b")}}
        ]
    })
}

#[tokio::test]
async fn test_follow_not_found_yields_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"error":"nope"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let link = Link::from_value(
        &json!({"href": format!("{}/docs/missing", server.uri())}),
        &context(),
    );
    assert!(link.follow(&Value::Null).await.unwrap().is_none());
}

#[tokio::test]
async fn test_follow_other_errors_propagate() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .mount(&server)
        .await;

    let link = Link::from_value(&json!({"href": server.uri()}), &context());
    let error = link.follow(&Value::Null).await.unwrap_err();
    assert_eq!(error.status(), Some(503));
}

#[tokio::test]
async fn test_follow_expands_template() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/docs"))
        .and(query_param("guid", "abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"attributes": {"guid": "abc", "title": "Found"}})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let link = Link::from_value(
        &json!({"href-template": format!("{}/docs{{?guid}}", server.uri())}),
        &context(),
    );
    let doc = link.submit(&json!({"guid": "abc"})).await.unwrap().unwrap();
    assert_eq!(doc.guid(), Some("abc"));
    assert_eq!(doc.attributes().unwrap()["title"], "Found");
    assert!(doc.url().unwrap().ends_with("/docs?guid=abc"));
}

#[tokio::test]
async fn test_link_set_union_then_follow() {
    let links = LinkSet::from_values(
        &[
            json!({"href": "/a", "rels": ["urn:a"]}),
            json!({"href": "/bc", "rels": ["urn:b", "urn:c"]}),
        ],
        &context(),
    );

    let matched = links.rels(&["urn:c"]);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched.first().unwrap().href(), Some("/bc"));
}

#[tokio::test]
async fn test_page_iterator_respects_limit_and_rewinds_offline() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/docs"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_page(&base, 3, 5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_page(&base, 4, 5)))
        .expect(0)
        .mount(&server)
        .await;

    let start = Document::from_body(None, results_page(&base, 2, 5), context());
    let mut pages = PageIterator::new(start, Some(2));

    assert!(pages.valid());
    assert_eq!(pages.key(), Some(2));
    let first = pages.current().unwrap();
    assert_eq!(first.total_pages(), 5);
    assert_eq!(first.first().unwrap().guid(), Some("item-2-a"));

    pages.next().await.unwrap();
    assert!(pages.valid());
    assert_eq!(pages.key(), Some(3));
    assert_eq!(
        pages.current().unwrap().first().unwrap().guid(),
        Some("item-3-a")
    );

    pages.next().await.unwrap();
    assert!(!pages.valid());
    assert!(pages.key().is_none());

    pages.rewind();
    assert!(pages.valid());
    assert_eq!(pages.key(), Some(2));
}

#[tokio::test]
async fn test_page_iterator_without_limit_walks_to_the_end() {
    let server = MockServer::start().await;
    let base = server.uri();

    for num in 2..=3 {
        Mock::given(method("GET"))
            .and(path("/docs"))
            .and(query_param("page", num.to_string().as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(results_page(&base, num, 3)))
            .expect(1)
            .mount(&server)
            .await;
    }

    let start = Document::from_body(None, results_page(&base, 1, 3), context());
    let mut pages = PageIterator::new(start, None);

    let mut visited = Vec::new();
    while pages.valid() {
        visited.push(pages.key().unwrap());
        pages.next().await.unwrap();
    }
    assert_eq!(visited, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_page_iterator_keeps_position_on_error() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
        .mount(&server)
        .await;

    let start = Document::from_body(None, results_page(&base, 1, 3), context());
    let mut pages = PageIterator::new(start, None);

    assert!(pages.next().await.is_err());
    assert_eq!(pages.key(), Some(1));
}

fn editable(base: &str) -> Document {
    Document::from_body(
        None,
        json!({
            "version": "1.0",
            "attributes": {"guid": "abc", "title": "Draft"},
            "links": {
                "profile": [{"href": format!("{base}/profiles/story")}],
                "navigation": [{"href": format!("{base}/docs/abc"), "rels": ["self"]}],
                "edit": [
                    {"href-template": format!("{base}/docs/{{guid}}"), "rels": ["urn:collectiondoc:form:documentsave"], "hints": {"allow": ["PUT"]}},
                    {"href-template": format!("{base}/docs/{{guid}}"), "rels": ["urn:collectiondoc:form:documentdelete"], "hints": {"allow": ["DELETE"]}}
                ]
            }
        }),
        context(),
    )
}

#[tokio::test]
async fn test_save_puts_body_without_server_owned_links() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("PUT"))
        .and(path("/docs/abc"))
        .and(body_json(json!({
            "version": "1.0",
            "attributes": {"guid": "abc", "title": "Draft"},
            "links": {"profile": [{"href": format!("{base}/profiles/story")}]}
        })))
        .respond_with(
            ResponseTemplate::new(202).set_body_json(json!({"url": format!("{base}/docs/abc")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut doc = editable(&base);
    doc.save().await.unwrap();
    assert_eq!(doc.url(), Some(format!("{base}/docs/abc").as_str()));
}

#[tokio::test]
async fn test_save_requires_guid() {
    let mut doc = Document::new(context());
    assert!(matches!(
        doc.save().await,
        Err(Error::Usage(UsageError::MissingGuid))
    ));
}

#[tokio::test]
async fn test_delete_reports_missing_document() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/docs/abc"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{}"))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!editable(&server.uri()).delete().await.unwrap());
}

#[tokio::test]
async fn test_delete_without_edit_link_is_usage_error() {
    let doc = Document::from_body(None, json!({"attributes": {"guid": "abc"}}), context());
    assert!(matches!(
        doc.delete().await,
        Err(Error::Usage(UsageError::MissingLink { .. }))
    ));
}
