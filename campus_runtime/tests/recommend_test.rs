//! Chat-completions collaborator against a stub server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campus_ledger::domain::UserRole;
use campus_ledger::seed::seeded_state;

use campus_runtime::recommend::{ChatCompletionsRecommender, RecommendationRequest, Recommender};

fn recommender(server: &MockServer, key: Option<&str>) -> ChatCompletionsRecommender {
    ChatCompletionsRecommender::new(
        format!("{}/v4/chat/completions", server.uri()),
        "glm-4-flash",
        key.map(str::to_string),
        Duration::from_secs(5),
    )
}

fn reply(content: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    }))
}

#[tokio::test]
async fn recommend_returns_model_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v4/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "glm-4-flash",
            "temperature": 0.7,
            "max_tokens": 1024,
            "stream": false
        })))
        .respond_with(reply("Try the AI Frontiers lecture."))
        .expect(1)
        .mount(&server)
        .await;

    let request = RecommendationRequest::for_user(&seeded_state(), None);
    let text = recommender(&server, Some("test-key")).recommend(&request).await;
    assert_eq!(text, "Try the AI Frontiers lecture.");
}

#[tokio::test]
async fn server_error_falls_back_in_role_language() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let mut request = RecommendationRequest::for_user(&seeded_state(), None);
    let r = recommender(&server, Some("k"));
    assert_eq!(r.recommend(&request).await, "AI 服务响应异常，请稍后再试。");

    request.role = UserRole::International;
    assert!(r.recommend(&request).await.starts_with("The AI service responded abnormally"));
}

#[tokio::test]
async fn missing_key_never_calls_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(reply("unused"))
        .expect(0)
        .mount(&server)
        .await;

    let r = recommender(&server, None);
    let request = RecommendationRequest::for_user(&seeded_state(), None);
    assert!(r.recommend(&request).await.starts_with("配置错误"));
    assert_eq!(r.summarize("Title", "Full description.").await, "Full description.");
}

#[tokio::test]
async fn empty_choices_give_no_recommendation_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "choices": [] })))
        .mount(&server)
        .await;

    let request = RecommendationRequest::for_user(&seeded_state(), None);
    assert_eq!(
        recommender(&server, Some("k")).recommend(&request).await,
        "暂无推荐结果。"
    );
}

#[tokio::test]
async fn summarize_uses_lower_temperature_and_falls_back() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "temperature": 0.5 })))
        .respond_with(reply("AI讲座，本周五开讲"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let r = recommender(&server, Some("k"));
    assert_eq!(r.summarize("AI", "long text").await, "AI讲座，本周五开讲");
    assert_eq!(r.summarize("AI", "long text").await, "long text");
}

#[tokio::test]
async fn unreachable_server_is_a_network_failure() {
    // Bind and release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = format!("http://127.0.0.1:{}/v4/chat/completions", port);

    let r = ChatCompletionsRecommender::new(url, "glm-4-flash", Some("k".into()), Duration::from_secs(2));
    let request = RecommendationRequest::for_user(&seeded_state(), None);
    assert_eq!(r.recommend(&request).await, "网络连接失败，请检查网络设置。");
}
