use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vault_organizer::anthropic::{AnthropicConfig, Client};
use vault_organizer::error::OrganizerError;
use vault_organizer::index::FileRecord;
use vault_organizer::planner::{self, suggest_plan};

fn records() -> Vec<FileRecord> {
    vec![FileRecord {
        filename: "a.md".into(),
        current_folder: "notes".into(),
        full_relative_path: "notes/a.md".into(),
        size: 42,
    }]
}

fn client_for(server: &MockServer) -> Client {
    Client::with_config(
        AnthropicConfig::new()
            .with_api_key("test-key")
            .with_api_base(server.uri()),
    )
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "id": "msg_123",
        "type": "message",
        "role": "assistant",
        "content": [{ "type": "text", "text": text }],
        "model": "claude-opus-4-20250514",
        "stop_reason": "end_turn",
        "usage": { "input_tokens": 100, "output_tokens": 50 }
    })
}

#[tokio::test]
async fn plan_is_extracted_from_prose_wrapped_reply() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", "2023-06-01"))
        .and(body_partial_json(json!({
            "max_tokens": planner::PLAN_MAX_TOKENS,
            "temperature": 0.0
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(
            "Here is my suggested organization:\n\
             {\"organization_plan\": {\"notes/a.md\": \"Projects\"},\n\
              \"folder_descriptions\": {\"Projects\": \"Active work\"}}\n\
             Let me know if you'd like changes!",
        )))
        .mount(&server)
        .await;

    let plan = suggest_plan(&client_for(&server), &records(), planner::DEFAULT_MODEL)
        .await
        .unwrap();

    assert_eq!(
        plan.organization_plan.get("notes/a.md").map(String::as_str),
        Some("Projects")
    );
    assert_eq!(
        plan.folder_descriptions.get("Projects").map(String::as_str),
        Some("Active work")
    );
}

#[tokio::test]
async fn reply_without_json_is_a_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("I am unable to suggest a reorganization.")),
        )
        .mount(&server)
        .await;

    let err = suggest_plan(&client_for(&server), &records(), planner::DEFAULT_MODEL)
        .await
        .unwrap_err();
    assert!(matches!(err, OrganizerError::NoPlanPayload));
}

#[tokio::test]
async fn api_error_envelope_is_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "type": "error",
            "error": { "type": "rate_limit_error", "message": "Too many requests" }
        })))
        .mount(&server)
        .await;

    let err = suggest_plan(&client_for(&server), &records(), planner::DEFAULT_MODEL)
        .await
        .unwrap_err();
    match err {
        OrganizerError::Api(api) => {
            assert_eq!(api.status, 429);
            assert_eq!(api.r#type.as_deref(), Some("rate_limit_error"));
            assert_eq!(api.message, "Too many requests");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    // No mock mounted: a request reaching the server would 404 into an Api
    // error, not a Config error.
    let client = Client::with_config(AnthropicConfig::new().with_api_base(server.uri()));

    if std::env::var("ANTHROPIC_API_KEY").is_ok() {
        // Environment provides a key; the auth check cannot be exercised.
        return;
    }

    let err = suggest_plan(&client, &records(), planner::DEFAULT_MODEL)
        .await
        .unwrap_err();
    assert!(matches!(err, OrganizerError::Config(_)));
}
