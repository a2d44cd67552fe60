//! HTTP sources against a mock record store.

use backoffice_core::{
    DataSourceError, FieldMap, FilterCriteria, PageQuery, RemoteDataSource,
};
use backoffice_tui::api_client::RestClient;
use backoffice_tui::sources::{load_lookups, ContentReviewSource, StepsSource};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> RestClient {
    RestClient::with_token(&server.uri(), "t", Duration::from_secs(5)).expect("client")
}

fn query(page: u32, limit: u32, criteria: FilterCriteria) -> PageQuery {
    PageQuery {
        criteria,
        page,
        limit,
    }
}

fn step_json(id: i64, agent: i64) -> Value {
    json!({
        "ID": id,
        "Name": format!("Step {}", id),
        "Prompt": "",
        "OrderIndex": id,
        "WorkflowID": 1,
        "AgentID": agent,
        "CreatedAt": "2024-05-17T09:30:00Z"
    })
}

#[tokio::test]
async fn test_steps_are_paged_locally_with_bearer_auth() {
    let server = MockServer::start().await;
    let steps: Vec<Value> = (1..=12).map(|id| step_json(id, 1)).collect();
    Mock::given(method("GET"))
        .and(path("/steps"))
        .and(header("authorization", "Bearer t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(steps)))
        .mount(&server)
        .await;

    let source = StepsSource::new(client(&server));
    let page = source
        .fetch_page(&query(2, 10, FilterCriteria::new()))
        .await
        .expect("page");
    assert_eq!(page.total_pages, 2);
    let ids: Vec<i64> = page.records.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![11, 12]);
}

#[tokio::test]
async fn test_step_filters_use_workflow_route_and_agent_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/steps/by-workflow/7"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([step_json(1, 1), step_json(2, 2), step_json(3, 2)])),
        )
        .mount(&server)
        .await;

    let source = StepsSource::new(client(&server));
    let criteria = FilterCriteria::new().with("workflow_id", "7").with("agent_id", "2");
    let page = source.fetch_page(&query(1, 10, criteria)).await.expect("page");
    let ids: Vec<i64> = page.records.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![2, 3]);
}

#[tokio::test]
async fn test_null_step_collection_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/steps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;

    let source = StepsSource::new(client(&server));
    let page = source
        .fetch_page(&query(1, 10, FilterCriteria::new()))
        .await
        .expect("page");
    assert!(page.records.is_empty());
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn test_step_update_empty_reply_reads_back_server_record() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/steps/4"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let mut stored = step_json(4, 1);
    stored["Name"] = json!("Outline (server)");
    stored["AgentID"] = Value::Null;
    Mock::given(method("GET"))
        .and(path("/steps"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([step_json(3, 1), stored])),
        )
        .mount(&server)
        .await;

    let source = StepsSource::new(client(&server));
    let mut patch = FieldMap::new();
    patch.insert("name".to_string(), json!("Outline"));
    patch.insert("order_index".to_string(), json!(2));
    patch.insert("agent_id".to_string(), Value::Null);
    let step = source.update_record(4, &patch).await.expect("update");
    assert_eq!(step.id, 4);
    assert_eq!(step.name, "Outline (server)");
    assert_eq!(step.agent_id, None);
    assert!(step.created_at.is_some(), "server-held fields survive the save");

    let requests = server.received_requests().await.expect("recorded requests");
    let body: Value = requests[0].body_json().expect("json body");
    assert_eq!(
        body,
        json!({"ID": 4, "Name": "Outline", "OrderIndex": 2, "AgentID": null})
    );
}

#[tokio::test]
async fn test_step_update_empty_reply_without_record_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/steps/4"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/steps"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([step_json(3, 1)])))
        .mount(&server)
        .await;

    let source = StepsSource::new(client(&server));
    let err = source
        .update_record(4, &FieldMap::new())
        .await
        .expect_err("nothing to read back");
    assert!(matches!(err, DataSourceError::Parse { .. }));
}

#[tokio::test]
async fn test_review_fetch_sends_page_limit_and_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/content-reviews"))
        .and(query_param("page", "3"))
        .and(query_param("limit", "50"))
        .and(query_param("status", "ERROR"))
        .and(query_param("category", "news"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{
                "id": 9,
                "execution_id": 90,
                "title": "Launch",
                "short_description": "short",
                "message": "long",
                "status": "ERROR",
                "type": "copy",
                "category": "news",
                "created": "2024-05-17T09:30:00Z"
            }],
            "pagination": {"totalPages": 4}
        })))
        .mount(&server)
        .await;

    let source = ContentReviewSource::new(client(&server));
    let criteria = FilterCriteria::new()
        .with("status", "ERROR")
        .with("category", "news");
    let page = source.fetch_page(&query(3, 50, criteria)).await.expect("page");
    assert_eq!(page.total_pages, 4);
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].review_type, "copy");
}

#[tokio::test]
async fn test_review_update_renames_type_and_uses_echo() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/content-reviews/9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 9,
            "title": "Launch",
            "status": "DONE",
            "type": "copy"
        })))
        .mount(&server)
        .await;

    let source = ContentReviewSource::new(client(&server));
    let mut patch = FieldMap::new();
    patch.insert("status".to_string(), json!("DONE"));
    patch.insert("review_type".to_string(), json!("copy"));
    let review = source.update_record(9, &patch).await.expect("update");
    assert_eq!(review.status, "DONE");

    let requests = server.received_requests().await.expect("recorded requests");
    let body: Value = requests[0].body_json().expect("json body");
    assert_eq!(body, json!({"status": "DONE", "type": "copy"}));
}

#[tokio::test]
async fn test_validation_errors_carry_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/content-reviews/9"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "title is required"})),
        )
        .mount(&server)
        .await;

    let source = ContentReviewSource::new(client(&server));
    let err = source
        .update_record(9, &FieldMap::new())
        .await
        .expect_err("rejected");
    assert_eq!(err, DataSourceError::validation("title is required"));
    assert_eq!(err.user_message("Failed to save content review"), "title is required");
}

#[tokio::test]
async fn test_server_errors_without_message_fall_back() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/steps/3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let source = StepsSource::new(client(&server));
    let err = source.delete_record(3).await.expect_err("rejected");
    assert_eq!(err, DataSourceError::server(500, ""));
    assert_eq!(err.user_message("Failed to delete step"), "Failed to delete step");
}

#[tokio::test]
async fn test_reviews_cannot_be_created() {
    let server = MockServer::start().await;
    let source = ContentReviewSource::new(client(&server));
    let err = source.create_record(&FieldMap::new()).await.expect_err("unsupported");
    assert!(matches!(err, DataSourceError::Validation { .. }));
    let requests = server.received_requests().await.expect("recorded requests");
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_step_create_posts_and_decodes_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/steps"))
        .respond_with(ResponseTemplate::new(201).set_body_json(step_json(21, 2)))
        .mount(&server)
        .await;

    let source = StepsSource::new(client(&server));
    let mut payload = FieldMap::new();
    payload.insert("name".to_string(), json!("Step 21"));
    payload.insert("order_index".to_string(), json!(21));
    let step = source.create_record(&payload).await.expect("created");
    assert_eq!(step.id, 21);
    assert_eq!(step.agent_id, Some(2));

    let requests = server.received_requests().await.expect("recorded requests");
    let body: Value = requests[0].body_json().expect("json body");
    assert_eq!(body, json!({"Name": "Step 21", "OrderIndex": 21}));
}

#[tokio::test]
async fn test_lookups_load_agents_and_workflows() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/agents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"ID": 1, "Name": "Writer"},
            {"id": 2, "name": "Editor"}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/workflows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
        .mount(&server)
        .await;

    let lookups = load_lookups(&client(&server)).await.expect("lookups");
    assert_eq!(lookups.agents.len(), 2);
    assert_eq!(lookups.agents[1].name, "Editor");
    assert!(lookups.workflows.is_empty());
}
