//! Bot delivery and linking against a local fake of the Bot API.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use glamour_server::{
    ChannelId, LinkPoller, MemoryPlayerStore, Notifier, PlayerId, PlayerStore, PromoCode,
    TelegramApi, TelegramNotifier, Update, messages,
};

type Outbox = Arc<Mutex<Vec<Value>>>;

async fn send_message(State(outbox): State<Outbox>, Json(body): Json<Value>) -> Json<Value> {
    outbox.lock().unwrap().push(body);
    json!({"ok": true, "result": {"message_id": 1}}).into()
}

/// Serves `sendMessage` for token `TEST` and returns the API base plus the
/// captured request bodies.
async fn fake_bot_api() -> (String, Outbox) {
    let outbox = Outbox::default();
    let app = Router::new()
        .route("/botTEST/sendMessage", post(send_message))
        .with_state(outbox.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), outbox)
}

fn start_update(chat_id: i64, text: &str) -> Update {
    serde_json::from_value(json!({
        "update_id": 1,
        "message": {"message_id": 5, "chat": {"id": chat_id, "type": "private"}, "text": text}
    }))
    .unwrap()
}

#[tokio::test]
async fn test_notifier_sends_markdown_to_linked_chat() {
    let (api_base, outbox) = fake_bot_api().await;
    let store = Arc::new(MemoryPlayerStore::new());
    let player = PlayerId::parse("p1").unwrap();
    store.link(&player, &ChannelId::new("321")).await.unwrap();

    let notifier = TelegramNotifier::new(TelegramApi::with_api_base("TEST", api_base), store);
    notifier.notify(&player, "hello").await.unwrap();

    let sent = outbox.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![json!({"chat_id": "321", "text": "hello", "parse_mode": "Markdown"})]
    );
}

#[tokio::test]
async fn test_notifier_skips_unlinked_player() {
    let (api_base, outbox) = fake_bot_api().await;
    let store = Arc::new(MemoryPlayerStore::new());
    let player = PlayerId::parse("p1").unwrap();
    store.upsert(&player).await.unwrap();

    let notifier = TelegramNotifier::new(TelegramApi::with_api_base("TEST", api_base), store);
    notifier.notify(&player, "hello").await.unwrap();
    assert!(outbox.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_notifier_reports_unreachable_api() {
    let store = Arc::new(MemoryPlayerStore::new());
    let player = PlayerId::parse("p1").unwrap();
    store.link(&player, &ChannelId::new("1")).await.unwrap();

    // Nothing listens on port 9 locally.
    let notifier =
        TelegramNotifier::new(TelegramApi::with_api_base("TEST", "http://127.0.0.1:9"), store);
    assert!(notifier.notify(&player, "hello").await.is_err());
}

#[tokio::test]
async fn test_start_command_links_and_confirms_with_code() {
    let (api_base, outbox) = fake_bot_api().await;
    let store = Arc::new(MemoryPlayerStore::new());
    let player = PlayerId::parse("0199-abc").unwrap();
    let code = PromoCode::parse("54321").unwrap();
    store.claim_promo_code(&player, &code).await.unwrap();

    let poller = LinkPoller::new(
        TelegramApi::with_api_base("TEST", api_base),
        store.clone(),
        Duration::from_secs(1),
    );
    let linked = poller
        .handle_update(&start_update(777, "/start connect_0199-abc"))
        .await
        .unwrap();
    assert_eq!(linked, Some(player.clone()));

    let record = store.get(&player).await.unwrap().unwrap();
    assert!(*record.is_linked());
    assert_eq!(record.channel_id(), &Some(ChannelId::new("777")));
    assert_eq!(record.last_promo_code(), &Some(code.clone()));

    let sent = outbox.lock().unwrap().clone();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["chat_id"], "777");
    assert_eq!(sent[0]["text"], messages::linked(Some(&code)));
}

#[tokio::test]
async fn test_other_messages_are_ignored() {
    let (api_base, outbox) = fake_bot_api().await;
    let store = Arc::new(MemoryPlayerStore::new());
    let poller = LinkPoller::new(
        TelegramApi::with_api_base("TEST", api_base),
        store.clone(),
        Duration::from_secs(1),
    );

    let linked = poller
        .handle_update(&start_update(1, "hi there"))
        .await
        .unwrap();
    assert_eq!(linked, None);
    assert!(store.is_empty());
    assert!(outbox.lock().unwrap().is_empty());
}
