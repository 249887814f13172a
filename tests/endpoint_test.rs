//! Conversation flow integration tests against a mock endpoint
//!
//! Drives the orchestrator with the real HTTP provider pointed at a
//! `wiremock` server and checks both the transcript and the wire requests.

use std::sync::Arc;

use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use parley::commands::ask::ask;
use parley::config::EndpointConfig;
use parley::extract::{Attachment, PdfExtractor};
use parley::orchestrator::{AttachOutcome, Orchestrator, SendOutcome, FALLBACK_REPLY};
use parley::providers::GeminiProvider;
use parley::session::Role;

mod common;
use common::{reply_body, single_page_pdf, GENERATE_PATH};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn endpoint_for(server: &MockServer, api_key: Option<&str>) -> EndpointConfig {
    EndpointConfig {
        url: format!("{}{}", server.uri(), GENERATE_PATH),
        api_key: api_key.map(str::to_string),
        timeout_seconds: 5,
    }
}

fn orchestrator_for(endpoint: EndpointConfig) -> Orchestrator {
    let provider = GeminiProvider::new(endpoint).expect("provider");
    Orchestrator::new(Arc::new(provider), Arc::new(PdfExtractor::new()))
}

fn transcript(chat: &Orchestrator) -> Vec<(Role, String)> {
    chat.read()
        .store
        .active()
        .expect("active session")
        .messages()
        .iter()
        .map(|m| (m.role(), m.content().to_string()))
        .collect()
}

/// JSON bodies of every request the server received
async fn request_bodies(server: &MockServer) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .iter()
        .map(|r| serde_json::from_slice(&r.body).expect("json body"))
        .collect()
}

// ---------------------------------------------------------------------------
// Successful replies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_reply_is_formatted_and_appended() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(reply_body("**Hi** there\n\nUse `cargo`")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    let outcome = chat.send("Hello model").await;

    assert!(matches!(outcome, SendOutcome::Replied(_)));
    assert_eq!(
        transcript(&chat),
        vec![
            (Role::User, "Hello model".to_string()),
            (
                Role::Assistant,
                "<strong>Hi</strong> there<br/><br/>Use <code>cargo</code>".to_string()
            ),
        ]
    );
    assert_eq!(chat.read().store.active().unwrap().title(), "Hello model");
}

#[tokio::test]
async fn test_request_shape_and_generation_config() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("first answer")))
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    chat.send("first question").await;
    chat.send("second question").await;

    let bodies = request_bodies(&server).await;
    assert_eq!(bodies.len(), 2);

    let second = &bodies[1];
    assert_eq!(
        second["contents"],
        serde_json::json!([
            { "role": "user", "parts": [ { "text": "first question" } ] },
            { "role": "model", "parts": [ { "text": "first answer" } ] },
            { "role": "user", "parts": [ { "text": "second question" } ] }
        ])
    );
    assert_eq!(
        second["generationConfig"],
        serde_json::json!({
            "temperature": 0.9,
            "topK": 1,
            "topP": 1.0,
            "maxOutputTokens": 2048
        })
    );
}

#[tokio::test]
async fn test_api_key_sent_as_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("x-goog-api-key", "secret-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("ok")))
        .expect(1)
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, Some("secret-key")));
    assert!(matches!(chat.send("hi").await, SendOutcome::Replied(_)));
}

#[tokio::test]
async fn test_empty_candidates_use_fallback_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": []
        })))
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    chat.send("anything").await;

    assert_eq!(transcript(&chat)[1].1, FALLBACK_REPLY);
    assert!(chat.read().last_error.is_none());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_error_body_message_is_shown() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
            "error": { "code": 500, "message": "quota exceeded" }
        })))
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    let outcome = chat.send("hello").await;

    assert_eq!(outcome, SendOutcome::Failed("quota exceeded".to_string()));
    assert_eq!(
        transcript(&chat)[1],
        (Role::Assistant, "Error: quota exceeded".to_string())
    );

    let state = chat.read();
    assert_eq!(state.last_error.as_deref(), Some("quota exceeded"));
    assert!(!state.waiting);
}

#[tokio::test]
async fn test_non_json_error_uses_status_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    chat.send("hello").await;

    assert_eq!(transcript(&chat)[1].1, "Error: HTTP error! status: 502");
}

#[tokio::test]
async fn test_unreachable_endpoint_fails_cleanly() {
    // Nothing listens on the discard port
    let chat = orchestrator_for(EndpointConfig {
        url: "http://127.0.0.1:9/gen".to_string(),
        api_key: None,
        timeout_seconds: 2,
    });

    match chat.send("hello").await {
        SendOutcome::Failed(message) => assert!(message.starts_with("Request failed")),
        other => panic!("expected failure, got {:?}", other),
    }
    assert_eq!(transcript(&chat).len(), 2);
    assert!(!chat.read().waiting);
}

// ---------------------------------------------------------------------------
// Attachments
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_pdf_text_is_sent_once() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("summary")))
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    let attachment = Attachment::new(
        "paper.pdf",
        "application/pdf",
        single_page_pdf("Quarterly results"),
    );

    let outcome = chat.attach(attachment).await;
    assert_eq!(outcome, AttachOutcome::Attached { pages: 1 });

    chat.send("Summarize").await;
    chat.send("Thanks").await;

    let bodies = request_bodies(&server).await;
    let first_turn = bodies[0]["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(first_turn.starts_with("Summarize\n\nPDF Content:\n"));
    assert!(first_turn.contains("Quarterly results"));

    // The file marker never goes on the wire and the text is not resent
    let second_contents = bodies[1]["contents"].as_array().unwrap();
    assert_eq!(second_contents.len(), 3);
    assert_eq!(second_contents[0]["parts"][0]["text"], "Summarize");
    assert_eq!(second_contents[2]["parts"][0]["text"], "Thanks");

    let messages = transcript(&chat);
    assert_eq!(
        messages[0],
        (Role::FileMarker, "📄 File uploaded: paper.pdf".to_string())
    );
}

#[tokio::test]
async fn test_corrupt_pdf_reports_failure_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    let outcome = chat
        .attach(Attachment::new(
            "broken.pdf",
            "application/pdf",
            b"this is not a pdf document".to_vec(),
        ))
        .await;

    assert_eq!(
        outcome,
        AttachOutcome::Failed("Failed to process PDF file.".to_string())
    );
    assert_eq!(transcript(&chat)[0].0, Role::FileMarker);
    assert!(chat.read().pending_attachment.is_none());
}

// ---------------------------------------------------------------------------
// One-shot ask
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ask_returns_reply_markup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply_body("Use `ls`")))
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    let reply = ask(&chat, "How do I list files?", None).await.unwrap();
    assert_eq!(reply, "Use <code>ls</code>");
}

#[tokio::test]
async fn test_ask_surfaces_endpoint_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
            "error": { "message": "rate limited" }
        })))
        .mount(&server)
        .await;

    let chat = orchestrator_for(endpoint_for(&server, None));
    let err = ask(&chat, "hello", None).await.unwrap_err();
    assert_eq!(err.to_string(), "rate limited");
}

#[tokio::test]
async fn test_ask_rejects_non_pdf_attachment() {
    let dir = tempfile::TempDir::new().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "plain text").unwrap();

    let chat = orchestrator_for(EndpointConfig::default());
    let err = ask(&chat, "hello", Some(file.as_path())).await.unwrap_err();
    assert!(err.to_string().contains("is not a PDF file"));
}
