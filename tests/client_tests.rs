use mockito::{Matcher, ServerGuard};
use serde_json::{Value, json};
use slugmap::{Provider, ProviderConfig, SlugClient, SlugError, SlugResult};
use spectral::assert_that;

fn urls(list: &[&str]) -> Vec<String> {
    list.iter().map(|url| url.to_string()).collect()
}

fn client(server: &ServerGuard, provider: Provider, model: Option<&str>) -> SlugClient {
    let config = ProviderConfig::new(provider, "test-key", model.map(str::to_string))
        .expect("Expected a valid provider config.");
    SlugClient::new(config).with_base_url(server.url())
}

fn chat_completion(content: &str) -> String {
    json!({
        "id": "chatcmpl-1",
        "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }]
    })
    .to_string()
}

fn proposed(results: &[SlugResult]) -> Vec<&str> {
    results.iter().map(SlugResult::proposed_slug).collect()
}

#[tokio::test]
async fn chat_completion_wrapped_array_with_missing_url() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o",
            "response_format": { "type": "json_object" }
        })))
        .with_status(200)
        .with_body(chat_completion(
            r#"{"data": [{"originalUrl":"https://x.com/p","proposedSlug":"great-page"}]}"#,
        ))
        .create_async()
        .await;

    let results = client(&server, Provider::OpenAi, None)
        .optimize(&urls(&["https://x.com/p", "https://x.com/blog/old-post/"]), "Berlin")
        .await
        .expect("Expected slugs from chat completion.");

    mock.assert_async().await;
    assert_that(&results.len()).is_equal_to(2);
    assert_that(&proposed(&results)).is_equal_to(vec!["great-page", "blog/old-post"]);
    assert_that(&results[1].current_slug()).is_equal_to("blog/old-post");
    assert_that(&(results[1].id() - results[0].id())).is_equal_to(1);
}

#[tokio::test]
async fn unauthorized_status_names_the_provider() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Incorrect API key provided","code":"invalid_api_key"}}"#)
        .create_async()
        .await;

    let err = client(&server, Provider::OpenAi, None)
        .optimize(&urls(&["https://x.com/p"]), "Berlin")
        .await
        .expect_err("Expected authentication failure.");

    assert!(matches!(err, SlugError::InvalidCredential(Provider::OpenAi)));
    assert_that(&err.to_string())
        .is_equal_to("Authentication failed. Please check your OpenAI API key.".to_string());
}

#[tokio::test]
async fn provider_message_is_surfaced() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"Rate limit reached for gpt-4o","type":"requests"}}"#)
        .create_async()
        .await;

    let err = client(&server, Provider::OpenAi, None)
        .optimize(&urls(&["https://x.com/p"]), "Berlin")
        .await
        .expect_err("Expected provider failure.");

    assert!(matches!(
        err,
        SlugError::Provider { provider: Provider::OpenAi, status: 429, ref message }
            if message == "Rate limit reached for gpt-4o"
    ));
}

#[tokio::test]
async fn error_without_message_reports_the_status() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(502)
        .with_body("<html>Bad Gateway</html>")
        .create_async()
        .await;

    let err = client(&server, Provider::OpenAi, None)
        .optimize(&urls(&["https://x.com/p"]), "Berlin")
        .await
        .expect_err("Expected provider failure.");

    assert!(matches!(
        err,
        SlugError::Provider { status: 502, ref message, .. } if message == "HTTP error! status: 502"
    ));
}

#[tokio::test]
async fn gateway_sends_identifying_headers_and_free_model() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/chat/completions")
        .match_header("x-title", "Slugmap")
        .match_header("http-referer", Matcher::Regex("crates.io".to_string()))
        .match_body(Matcher::PartialJson(
            json!({ "model": "mistralai/mistral-7b-instruct" }),
        ))
        .with_status(200)
        .with_body(chat_completion(
            r#"[{"originalUrl":"https://x.com/about-us","proposedSlug":"about"}]"#,
        ))
        .create_async()
        .await;

    let results = client(
        &server,
        Provider::OpenRouter,
        Some("mistralai/mistral-7b-instruct"),
    )
    .optimize(&urls(&["https://x.com/about-us"]), "Paris")
    .await
    .expect("Expected slugs from the gateway.");

    mock.assert_async().await;
    assert_that(&proposed(&results)).is_equal_to(vec!["about"]);
}

#[tokio::test]
async fn chat_object_without_array_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body(chat_completion(r#"{"note": "nothing to improve"}"#))
        .create_async()
        .await;

    let result = client(&server, Provider::OpenAi, None)
        .optimize(&urls(&["https://x.com/p"]), "Berlin")
        .await;

    assert!(matches!(result, Err(SlugError::MalformedResponse(_))));
}

#[tokio::test]
async fn non_json_success_body_is_malformed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1/chat/completions")
        .with_status(200)
        .with_body("upstream said hello")
        .create_async()
        .await;

    let result = client(&server, Provider::OpenAi, None)
        .optimize(&urls(&["https://x.com/p"]), "Berlin")
        .await;

    assert!(matches!(result, Err(SlugError::MalformedResponse(_))));
}

#[tokio::test]
async fn schema_provider_keeps_input_order() {
    let mut server = mockito::Server::new_async().await;
    let answer = json!([
        { "originalUrl": "https://x.com/services/plumbing/", "proposedSlug": "plumbing-services-austin" },
        { "originalUrl": "https://x.com/contact", "proposedSlug": "" },
        { "proposedSlug": "orphan" },
        { "originalUrl": "https://x.com/", "proposedSlug": "home-austin" }
    ]);
    let mock = server
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .match_header("x-goog-api-key", "test-key")
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .with_status(200)
        .with_body(
            json!({
                "candidates": [{ "content": { "parts": [{ "text": answer.to_string() }], "role": "model" } }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let results = client(&server, Provider::Gemini, None)
        .optimize(
            &urls(&[
                "https://x.com/",
                "https://x.com/contact",
                "https://x.com/services/plumbing/",
            ]),
            "Austin",
        )
        .await
        .expect("Expected slugs from schema provider.");

    mock.assert_async().await;
    assert_that(&proposed(&results)).is_equal_to(vec![
        "home-austin",
        "contact",
        "plumbing-services-austin",
    ]);
}

#[tokio::test]
async fn schema_provider_reported_invalid_key() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1beta/models/gemini-2.5-flash:generateContent")
        .with_status(400)
        .with_body(
            json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT",
                    "details": [{ "reason": "API_KEY_INVALID", "domain": "googleapis.com" }]
                }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let result = client(&server, Provider::Gemini, None)
        .optimize(&urls(&["https://x.com/"]), "Austin")
        .await;

    assert!(matches!(
        result,
        Err(SlugError::InvalidCredential(Provider::Gemini))
    ));
}

#[tokio::test]
async fn messages_provider_goes_through_the_relay() {
    let mut server = mockito::Server::new_async().await;
    let answer: Value = json!([
        { "originalUrl": "https://x.com/our-team", "proposedSlug": "team-london" }
    ]);
    let mock = server
        .mock("POST", "/relay")
        .match_query(Matcher::Regex("api\\.anthropic\\.com".to_string()))
        .match_header("x-api-key", "test-key")
        .match_header("anthropic-version", "2023-06-01")
        .match_body(Matcher::PartialJson(json!({
            "model": "claude-3-haiku-20240307",
            "max_tokens": 4096
        })))
        .with_status(200)
        .with_body(
            json!({
                "id": "msg_1",
                "type": "message",
                "content": [{ "type": "text", "text": format!("```json\n{answer}\n```") }]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let config = ProviderConfig::new(
        Provider::Claude,
        "test-key",
        Some("claude-3-haiku-20240307".to_string()),
    )
    .expect("Expected a valid provider config.");
    let results = SlugClient::new(config)
        .with_relay(format!("{}/relay?", server.url()))
        .optimize(&urls(&["https://x.com/our-team"]), "London")
        .await
        .expect("Expected slugs from messages provider.");

    mock.assert_async().await;
    assert_that(&proposed(&results)).is_equal_to(vec!["team-london"]);
}
