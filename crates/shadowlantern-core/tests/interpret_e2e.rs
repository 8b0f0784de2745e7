//! Interpreter against a mocked Generative Language endpoint.
//!
//! | Upstream reply         | Expected source | Expected result           |
//! |------------------------|-----------------|---------------------------|
//! | JSON in candidate text | Model           | parsed fields             |
//! | prose, no JSON         | Fallback        | static fallback           |
//! | HTTP 500               | Fallback        | static fallback           |
//! | no API key             | Fallback        | static fallback           |

use mockito::{Matcher, Server};
use serde_json::json;
use shadowlantern_core::interpret::{CciAnalysis, ShadowAnalysis};
use shadowlantern_core::storage::InterpretConfig;
use shadowlantern_core::{AnalysisSource, GeminiClient, Interpreter, PhaseResponses};

const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn config(endpoint: &str) -> InterpretConfig {
    InterpretConfig {
        endpoint: endpoint.to_string(),
        timeout_secs: 5,
        ..InterpretConfig::default()
    }
}

fn reply(text: &str) -> String {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] }).to_string()
}

fn responses() -> Vec<PhaseResponses> {
    vec![
        PhaseResponses {
            phase: "envy".into(),
            label: "Envy".into(),
            responses: vec!["people who quit to travel".into()],
        },
        PhaseResponses {
            phase: "rage".into(),
            label: "Rage".into(),
            responses: vec!["being controlled".into()],
        },
    ]
}

#[tokio::test]
async fn shadow_analysis_from_model() {
    let mut server = Server::new_async().await;
    let model_text = r#"Here you go: {
        "values":[
            {"id":"V023","name":"Freedom","source":"envy","confidence":88,"evidence":"travel"}
        ],
        "analysis":{"hiddenDesire":"to roam"},
        "summary":"You value freedom."}"#;
    let mock = server
        .mock("POST", GENERATE_PATH)
        .match_query(Matcher::UrlEncoded("key".into(), "test-key".into()))
        .match_body(Matcher::Regex("people who quit to travel".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(reply(model_text))
        .create_async()
        .await;

    let client = GeminiClient::new("test-key", &config(&server.url()));
    let interpreter = Interpreter::with_config(client, &config(&server.url()));
    let analysis = interpreter.analyze_shadow(&responses()).await;

    mock.assert_async().await;
    assert_eq!(analysis.source, AnalysisSource::Model);
    assert_eq!(analysis.result.primary_value(), Some("Freedom"));
    assert_eq!(analysis.result.analysis.hidden_desire, "to roam");
    // missing fields default
    assert_eq!(analysis.result.analysis.core_rule, "");
}

#[tokio::test]
async fn prose_reply_falls_back() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", Matcher::Any)
        .with_status(200)
        .with_body(reply("I am not able to help with that."))
        .create_async()
        .await;

    let interpreter = Interpreter::new(GeminiClient::new("k", &config(&server.url())));
    let analysis = interpreter.analyze_cci(&responses()).await;
    assert!(analysis.is_fallback());
    assert_eq!(analysis.result, CciAnalysis::fallback());
}

#[tokio::test]
async fn server_error_falls_back_with_reason() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", Matcher::Any)
        .with_status(500)
        .with_body(r#"{"error":{"message":"overloaded"}}"#)
        .create_async()
        .await;

    let interpreter = Interpreter::new(GeminiClient::new("k", &config(&server.url())));
    let analysis = interpreter.analyze_shadow(&responses()).await;
    assert_eq!(analysis.result, ShadowAnalysis::fallback());
    match analysis.source {
        AnalysisSource::Fallback { reason } => assert!(reason.contains("overloaded")),
        AnalysisSource::Model => panic!("expected fallback"),
    }
}

#[tokio::test]
async fn missing_key_falls_back_without_network() {
    let interpreter = Interpreter::new(None::<GeminiClient>);
    let analysis = interpreter.analyze_sentences(&responses()).await;
    assert!(analysis.is_fallback());
    assert!(analysis.result.primary_value().is_some());
    assert_eq!(interpreter.next_question("envy", &[]).await, None);
}
