//! Schema cache, credential swap and pagination behaviour of `NotionSession`.

mod common;

use common::*;
use notion2tasks::{AppError, HttpVerb, NotionErrorCode, NotionId, PropertyId};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

const DATABASE_FIXTURE: &str = include_str!("fixtures/api_responses/database_roadmap.json");
const SEARCH_FIXTURE: &str = include_str!("fixtures/api_responses/search_databases.json");

fn database_id() -> NotionId {
    NotionId::parse(DATABASE_ID).unwrap()
}

fn schema_api() -> Arc<ScriptedApi> {
    Arc::new(ScriptedApi::new(|request| {
        match (request.verb, request.url.path()) {
            (HttpVerb::Get, path) if path.starts_with("/v1/databases/") => ok(DATABASE_FIXTURE),
            (HttpVerb::Post, "/v1/search") => ok(SEARCH_FIXTURE),
            _ => not_found(),
        }
    }))
}

#[tokio::test]
async fn schema_is_fetched_at_most_once() {
    let api = schema_api();
    let session = session(&api);

    let first = session.database(&database_id()).await.unwrap();
    let second = session.database(&database_id()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.name, "Roadmap");
    assert_eq!(first.properties.len(), 6);
    assert_eq!(api.request_count(), 1);

    let requests = api.requests();
    let request = &requests[0];
    assert_eq!(request.request.verb, HttpVerb::Get);
    assert_eq!(
        request.path(),
        "/v1/databases/668d797c-76fa-4934-9b05-ad288df2d136"
    );
    assert_eq!(request.credential, INTEGRATION_TOKEN);
}

#[tokio::test]
async fn listing_is_memoized_and_fills_lookups() {
    let api = schema_api();
    let session = session(&api);

    let listed = session.list_databases().await.unwrap();
    let again = session.list_databases().await.unwrap();
    assert_eq!(listed, again);
    assert_eq!(listed.len(), 3);
    assert_eq!(listed[2].name, "?");

    // Served from the listing, no GET.
    let roadmap = session.database(&database_id()).await.unwrap();
    assert_eq!(roadmap.name, "Roadmap");
    assert_eq!(api.request_count(), 1);

    let requests = api.requests();
    let search = &requests[0];
    assert_eq!(search.path(), "/v1/search");
    assert_eq!(
        search.body(),
        &json!({
            "filter": {"value": "database", "property": "object"},
            "page_size": 100
        })
    );
}

#[tokio::test]
async fn lookup_miss_does_not_refresh_listing() {
    let api = schema_api();
    let session = session(&api);

    session.database(&database_id()).await.unwrap();
    session.list_databases().await.unwrap();

    let paths: Vec<String> = api.requests().iter().map(|r| r.path().to_string()).collect();
    assert_eq!(
        paths,
        vec![
            "/v1/databases/668d797c-76fa-4934-9b05-ad288df2d136".to_string(),
            "/v1/search".to_string()
        ]
    );
}

#[tokio::test]
async fn credential_change_forces_refetch() {
    let api = schema_api();
    let session = session(&api);

    session.database(&database_id()).await.unwrap();
    assert!(!session
        .invalidate_on_credential_change(&api_key(INTEGRATION_TOKEN))
        .await
        .unwrap());
    session.database(&database_id()).await.unwrap();
    assert_eq!(api.request_count(), 1);
    assert_eq!(api.connect_count(), 1);

    assert!(session
        .invalidate_on_credential_change(&api_key(OTHER_TOKEN))
        .await
        .unwrap());
    session.database(&database_id()).await.unwrap();

    let requests = api.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].credential, OTHER_TOKEN);
    assert_eq!(api.connect_count(), 2);
}

#[tokio::test]
async fn failed_rebind_keeps_previous_state() {
    let api = Arc::new(
        ScriptedApi::new(|request| match request.verb {
            HttpVerb::Get => ok(DATABASE_FIXTURE),
            HttpVerb::Post => not_found(),
        })
        .refusing(OTHER_TOKEN),
    );
    let session = session(&api);
    session.database(&database_id()).await.unwrap();

    let result = session
        .invalidate_on_credential_change(&api_key(OTHER_TOKEN))
        .await;
    assert!(matches!(result, Err(AppError::MissingConfiguration(_))));

    // Still cached, still bound to the old token.
    session.database(&database_id()).await.unwrap();
    assert_eq!(api.request_count(), 1);
}

#[tokio::test]
async fn query_walks_every_page_in_order() {
    let api = Arc::new(ScriptedApi::new(|request| {
        let body = request.body.clone().unwrap_or_default();
        let row = |n: u32| {
            json!({
                "object": "page",
                "id": format!("00000000-0000-4000-8000-{:012}", n),
                "properties": {"Hours": {"id": "hours", "type": "number", "number": n}}
            })
        };
        match body.get("start_cursor").and_then(|c| c.as_str()) {
            None => list_page(vec![row(1), row(2)], Some("c2")),
            Some("c2") => list_page(vec![row(3)], Some("c3")),
            Some("c3") => list_page(vec![row(4), row(5)], None),
            Some(_) => not_found(),
        }
    }));
    let session = session(&api);

    let records = session.query_records(&database_id(), None).await.unwrap();

    let ids: Vec<String> = records.iter().map(|r| r.id.as_str()[20..].to_string()).collect();
    assert_eq!(
        ids,
        vec![
            "000000000001",
            "000000000002",
            "000000000003",
            "000000000004",
            "000000000005"
        ]
    );

    let bodies: Vec<_> = api.requests().iter().map(|r| r.body().clone()).collect();
    assert_eq!(
        bodies,
        vec![
            json!({"page_size": 100}),
            json!({"page_size": 100, "start_cursor": "c2"}),
            json!({"page_size": 100, "start_cursor": "c3"}),
        ]
    );
    assert!(api.requests().iter().all(|r| r.path()
        == "/v1/databases/668d797c-76fa-4934-9b05-ad288df2d136/query"));
}

#[tokio::test]
async fn query_carries_ascending_sort() {
    let api = Arc::new(ScriptedApi::new(|_| list_page(vec![], None)));
    let session = session(&api);

    let sort_by = PropertyId::new("%3DwXr").unwrap();
    let records = session
        .query_records(&database_id(), Some(&sort_by))
        .await
        .unwrap();

    assert!(records.is_empty());
    assert_eq!(
        api.requests()[0].body(),
        &json!({
            "page_size": 100,
            "sorts": [{"property": "%3DwXr", "direction": "ascending"}]
        })
    );
}

#[tokio::test]
async fn failing_page_aborts_with_trace_id() {
    let api = Arc::new(ScriptedApi::new(|request| {
        let cursor = request
            .body
            .as_ref()
            .and_then(|b| b.get("start_cursor"))
            .cloned();
        match cursor {
            None => list_page(vec![], Some("c2")),
            Some(_) => (
                503,
                r#"{"object":"error","status":503,"code":"service_unavailable","message":"busy"}"#
                    .to_string(),
            ),
        }
    }));
    let session = session(&api);

    let err = session
        .query_records(&database_id(), None)
        .await
        .unwrap_err();
    let err = match err {
        AppError::RemoteRequest(err) => err,
        other => panic!("expected a remote request error, got {:?}", other),
    };

    let requests = api.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(err.status_code, 503);
    assert_eq!(err.expected_status, 200);
    assert_eq!(err.verb, HttpVerb::Post);
    assert_eq!(err.trace_id, requests[1].request.trace_id);
    assert_eq!(err.code, Some(NotionErrorCode::ServiceUnavailable));
    assert!(err.payload_snippet.as_deref().unwrap().contains("c2"));
    assert!(err.to_string().contains(requests[1].request.trace_id.as_str()));
}

#[tokio::test]
async fn every_request_gets_a_fresh_trace_id() {
    let api = Arc::new(ScriptedApi::new(|request| {
        match request.body.as_ref().and_then(|b| b.get("start_cursor")) {
            None => list_page(vec![], Some("next")),
            Some(_) => list_page(vec![], None),
        }
    }));
    let session = session(&api);

    session.query_records(&database_id(), None).await.unwrap();
    session.query_records(&database_id(), None).await.unwrap();

    let trace_ids: HashSet<String> = api
        .requests()
        .iter()
        .map(|r| r.request.trace_id.as_str().to_string())
        .collect();
    assert_eq!(trace_ids.len(), 4);
}

#[tokio::test]
async fn more_results_without_cursor_is_malformed() {
    let api = Arc::new(ScriptedApi::new(|_| {
        ok(r#"{"object":"list","results":[],"next_cursor":null,"has_more":true}"#)
    }));
    let session = session(&api);

    let result = session.query_records(&database_id(), None).await;
    assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    assert_eq!(api.request_count(), 1);
}

#[tokio::test]
async fn unknown_database_is_a_remote_error() {
    let api = Arc::new(ScriptedApi::new(|_| not_found()));
    let session = session(&api);

    let err = session.database(&database_id()).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::RemoteRequest(ref e) if e.code == Some(NotionErrorCode::ObjectNotFound)
    ));
}
