use axum::http::StatusCode;
use axum::routing::post;
use axum::{ Json, Router };
use serde_json::{ json, Value };
use std::net::SocketAddr;
use webgpt_chat::conversation::client::{ ChatApi, HttpChatApi };
use webgpt_chat::error::ChatErrorKind;
use webgpt_chat::models::chat::Turn;

async fn reply_handler(Json(body): Json<Value>) -> Json<Value> {
    let count = body["messages"].as_array().map(|m| m.len()).unwrap_or(0);
    Json(json!({ "role": "model", "parts": [{ "text": format!("saw {} turn(s)", count) }] }))
}

async fn failing_handler() -> (StatusCode, Json<Value>) {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Internal Server Error" })))
}

async fn spawn_gateway() -> SocketAddr {
    let app = Router::new()
        .route("/api/chat", post(reply_handler))
        .route("/api/failing", post(failing_handler));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

#[tokio::test]
async fn success_response_is_decoded_into_model_turn() {
    let addr = spawn_gateway().await;
    let api = HttpChatApi::new(format!("http://{}/api/chat", addr));

    let reply = api.post_chat(&[Turn::model("hi"), Turn::user("hello")]).await.unwrap();

    assert_eq!(reply, Turn::model("saw 2 turn(s)"));
}

#[tokio::test]
async fn server_error_maps_to_network_error() {
    let addr = spawn_gateway().await;
    let api = HttpChatApi::new(format!("http://{}/api/failing", addr));

    let err = api.post_chat(&[Turn::user("hello")]).await.unwrap_err();

    assert_eq!(err.kind(), ChatErrorKind::Network);
}

#[tokio::test]
async fn unreachable_gateway_maps_to_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let api = HttpChatApi::new(format!("http://{}/api/chat", addr));

    let err = api.post_chat(&[Turn::user("hello")]).await.unwrap_err();

    assert_eq!(err.kind(), ChatErrorKind::Network);
}
