//! 텔레그램 전송기 통합 테스트 (목 서버).

use mockito::Matcher;
use secrecy::SecretString;
use serde_json::json;
use trader_notification::{
    Notification, NotificationDispatcher, NotificationError, NotificationSender, NotificationSink,
    TelegramSender,
};

fn sender(server: &mockito::Server) -> TelegramSender {
    TelegramSender::new(SecretString::from("test-token".to_string()), "12345")
        .with_base_url(server.url())
}

// =============================================================================
// sendMessage
// =============================================================================

#[tokio::test]
async fn send_posts_markdown_message() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/bottest-token/sendMessage")
        .match_body(Matcher::PartialJson(json!({
            "chat_id": "12345",
            "text": "🟢 *BUY SIGNAL* 🟢",
            "parse_mode": "Markdown",
        })))
        .with_status(200)
        .with_body(r#"{"ok":true,"result":{"message_id":1}}"#)
        .create_async()
        .await;

    sender(&server)
        .send(&Notification::new("🟢 *BUY SIGNAL* 🟢"))
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn rate_limit_maps_to_retry_after() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/bottest-token/sendMessage")
        .with_status(429)
        .with_body(r#"{"ok":false,"error_code":429,"description":"Too Many Requests","parameters":{"retry_after":17}}"#)
        .create_async()
        .await;

    let err = sender(&server).send_message("hi").await.unwrap_err();
    assert!(matches!(err, NotificationError::RateLimited(17)));
}

#[tokio::test]
async fn api_error_is_send_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/bottest-token/sendMessage")
        .with_status(400)
        .with_body(r#"{"ok":false,"error_code":400,"description":"Bad Request: chat not found"}"#)
        .create_async()
        .await;

    match sender(&server).send_message("hi").await {
        Err(NotificationError::SendFailed(msg)) => assert!(msg.contains("chat not found")),
        other => panic!("SendFailed여야 한다: {other:?}"),
    }
}

// =============================================================================
// 디스패처
// =============================================================================

#[tokio::test]
async fn dispatcher_forwards_channel_messages_to_telegram() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/bottest-token/sendMessage")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(2)
        .create_async()
        .await;

    let mut dispatcher = NotificationDispatcher::new();
    dispatcher.add_sender(sender(&server));
    let (sink, handle) = dispatcher.spawn();

    sink.notify("first").unwrap();
    sink.notify("second").unwrap();
    drop(sink);
    handle.await.unwrap();

    mock.assert_async().await;
}
