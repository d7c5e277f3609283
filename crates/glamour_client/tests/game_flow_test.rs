//! Client flows against a live promo server on a local port.

use glamour_client::{
    PromoApi, Report, RoundEnd, play_round, report_outcome, run_session, wait_until_linked,
};
use glamour_server::{
    AppState, ChannelId, LogNotifier, MemoryPlayerStore, PlayerId, PlayerStore, PromoCoordinator,
    router,
};
use glamour_tictactoe::{GameSession, OpponentTurnScheduler, Outcome};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn spawn_server() -> (PromoApi, Arc<MemoryPlayerStore>) {
    let store = Arc::new(MemoryPlayerStore::new());
    let app = router(AppState::new(PromoCoordinator::new(
        store.clone(),
        Arc::new(LogNotifier),
    )));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (PromoApi::new(format!("http://{}", addr)), store)
}

fn scheduler() -> OpponentTurnScheduler {
    OpponentTurnScheduler::with_rng(
        Arc::new(Mutex::new(GameSession::new())),
        Duration::ZERO,
        SmallRng::seed_from_u64(3),
    )
}

// X plays 0 and 1, O blocks at 2, X plays 3 and O completes 2-4-6.
const LOSING_SCRIPT: &[u8] = b"0\n1\n2\n3\nn\n";

#[tokio::test]
async fn test_status_of_unknown_player() {
    let (api, store) = spawn_server().await;
    let status = api.player_status("nobody").await.unwrap();
    assert!(!status.is_connected);
    assert_eq!(status.last_promo_code, None);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_repeat_win_shows_first_code() {
    let (api, _store) = spawn_server().await;
    let mut rng = SmallRng::seed_from_u64(11);

    let first = report_outcome(&api, "winner", Outcome::PlayerWin, &mut rng)
        .await
        .unwrap();
    let second = report_outcome(&api, "winner", Outcome::PlayerWin, &mut rng)
        .await
        .unwrap();
    let Report::Won { code } = first else {
        panic!("expected a win report, got {:?}", first);
    };
    assert_eq!(code.len(), 5);
    assert_eq!(second, Report::Won { code: code.clone() });

    let status = api.player_status("winner").await.unwrap();
    assert_eq!(status.last_promo_code, Some(code));
}

#[tokio::test]
async fn test_draw_is_not_reported() {
    let (api, store) = spawn_server().await;
    let report = report_outcome(&api, "even", Outcome::Draw, &mut SmallRng::seed_from_u64(0))
        .await
        .unwrap();
    assert_eq!(report, Report::Unreported);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_invalid_input_then_loss() {
    let mut scheduler = scheduler();
    let mut lines = tokio::io::AsyncBufReadExt::lines(&b"nine\n42\n0\n0\n1\n3\n"[..]);
    let mut out = Vec::new();

    let end = play_round(&mut lines, &mut out, &mut scheduler).await.unwrap();
    let RoundEnd::Finished(event) = end else {
        panic!("expected a finished round, got {:?}", end);
    };
    assert_eq!(*event.outcome(), Outcome::OpponentWin);

    let shown = String::from_utf8(out).unwrap();
    assert!(shown.contains("Enter a cell number"));
    assert!(shown.contains("Cell 42 is not available"));
    assert!(shown.contains("Cell 0 is not available"));
}

#[tokio::test]
async fn test_quit_mid_game() {
    let mut scheduler = scheduler();
    let mut lines = tokio::io::AsyncBufReadExt::lines(&b"0\nq\n"[..]);
    let mut out = Vec::new();
    let end = play_round(&mut lines, &mut out, &mut scheduler).await.unwrap();
    assert_eq!(end, RoundEnd::Quit);
}

#[tokio::test]
async fn test_session_reports_loss_to_server() {
    let (api, store) = spawn_server().await;
    let mut scheduler = scheduler();
    let mut out = Vec::new();

    let summary = run_session(
        LOSING_SCRIPT,
        &mut out,
        &api,
        "loser",
        &mut scheduler,
        &mut SmallRng::seed_from_u64(5),
    )
    .await
    .unwrap();

    assert_eq!(summary.rounds, 1);
    assert_eq!(summary.losses, 1);
    assert_eq!(summary.promo_code, None);

    let record = store
        .get(&PlayerId::parse("loser").unwrap())
        .await
        .unwrap()
        .expect("loss creates the record");
    assert_eq!(record.last_promo_code(), &None);
}

#[tokio::test]
async fn test_session_survives_unreachable_server() {
    let api = PromoApi::new("http://127.0.0.1:9");
    let mut scheduler = scheduler();
    let mut out = Vec::new();

    let summary = run_session(
        LOSING_SCRIPT,
        &mut out,
        &api,
        "offline",
        &mut scheduler,
        &mut SmallRng::seed_from_u64(5),
    )
    .await
    .unwrap();

    assert_eq!(summary.losses, 1);
    assert!(String::from_utf8(out).unwrap().contains("Could not reach the promo server"));
}

#[tokio::test]
async fn test_wait_until_linked_stops_after_link() {
    let (api, store) = spawn_server().await;
    let player = PlayerId::parse("linker").unwrap();

    let waiter = {
        let api = api.clone();
        tokio::spawn(async move { wait_until_linked(&api, "linker", Duration::from_millis(10)).await })
    };
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    store.link(&player, &ChannelId::new("5")).await.unwrap();
    let status = tokio::time::timeout(Duration::from_secs(2), waiter)
        .await
        .expect("linked in time")
        .unwrap();
    assert!(status.is_connected);
}
