//! WebSocket integration tests.
//!
//! End-to-end scenarios over the shopper and representative channels:
//! queue join/position, FIFO order, the claim handshake, double-claim
//! denial, the release cycle, the collaboration handshake, and
//! shopper-initiated call end.

mod fixtures;

use std::time::Duration;

use fixtures::TestServer;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn connect(url: &str) -> Ws {
    let (ws, _) = connect_async(url).await.expect("Failed to connect");
    ws
}

async fn send_json(ws: &mut Ws, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Receive frames until one with the given type arrives.
async fn recv_type(ws: &mut Ws, frame_type: &str) -> Value {
    for _ in 0..25 {
        let msg = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .unwrap_or_else(|_| panic!("Timed out waiting for '{frame_type}'"))
            .expect("Connection closed")
            .expect("WebSocket error");
        if let Message::Text(text) = msg {
            let value: Value = serde_json::from_str(&text).expect("Frame is not JSON");
            if value["type"] == frame_type {
                return value;
            }
        }
    }
    panic!("No '{frame_type}' frame received");
}

/// Open a shopper channel and join the queue. Returns the socket and the
/// queue_joined frame.
async fn join_shopper(server: &TestServer, shopper_id: &str) -> (Ws, Value) {
    let mut ws = connect(&server.ws_url("/api/ws/call")).await;
    recv_type(&mut ws, "connected").await;
    send_json(
        &mut ws,
        json!({
            "type": "join_queue",
            "shopperId": shopper_id,
            "mediaCapabilities": {"hasAudioInput": true, "hasVideoInput": false}
        }),
    )
    .await;
    let joined = recv_type(&mut ws, "queue_joined").await;
    (ws, joined)
}

/// Open a representative channel and register. Returns the socket after the
/// connected acknowledgment.
async fn connect_rep(server: &TestServer, rep_id: &str) -> Ws {
    let mut ws = connect(&server.ws_url("/api/ws/calls/monitor")).await;
    send_json(&mut ws, json!({"type": "connect", "salesRepId": rep_id})).await;
    recv_type(&mut ws, "connected").await;
    ws
}

#[tokio::test]
async fn test_join_queue_reports_position_and_microphone() {
    // テスト項目: 参加直後に connected → queue_joined が届き、順位とマイク
    //             有無が載っている
    // given (前提条件):
    let server = TestServer::start(19090);
    server.ready().await;

    // when (操作):
    let (_ws, joined) = join_shopper(&server, "S1").await;

    // then (期待する結果):
    assert_eq!(joined["shopperId"], "S1");
    assert_eq!(joined["position"], 1);
    assert_eq!(joined["hasMicrophone"], true);
}

#[tokio::test]
async fn test_join_broadcasts_snapshot_to_representatives() {
    // テスト項目: 参加のたびに接続中の全 rep へ queue_update が届く
    // given (前提条件): rep が監視を開始している（初期スナップショットは空）
    let server = TestServer::start(19091);
    server.ready().await;
    let mut rep = connect(&server.ws_url("/api/ws/calls/monitor")).await;
    send_json(&mut rep, json!({"type": "connect", "salesRepId": "R1"})).await;
    let initial = recv_type(&mut rep, "queue_update").await;
    assert_eq!(initial["queue"].as_array().unwrap().len(), 0);
    recv_type(&mut rep, "connected").await;

    // when (操作): S1 が参加する
    let (_shopper, _) = join_shopper(&server, "S1").await;

    // then (期待する結果): スナップショットに S1 だけが載っている
    let update = recv_type(&mut rep, "queue_update").await;
    let queue = update["queue"].as_array().unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0]["shopperId"], "S1");
    assert_eq!(queue[0]["isConnected"], true);
    assert!(queue[0]["assignedRepId"].is_null());
}

#[tokio::test]
async fn test_sequential_joins_keep_fifo_order() {
    // テスト項目: 到着順で順位が振られ、スナップショットも到着順
    // given (前提条件):
    let server = TestServer::start(19092);
    server.ready().await;
    let (_s1, joined1) = join_shopper(&server, "S1").await;

    // when (操作): S2 が後から参加する
    let (_s2, joined2) = join_shopper(&server, "S2").await;

    // then (期待する結果):
    assert_eq!(joined1["position"], 1);
    assert_eq!(joined2["position"], 2);

    // 後から接続した rep の初期スナップショットも到着順
    let mut rep = connect(&server.ws_url("/api/ws/calls/monitor")).await;
    send_json(&mut rep, json!({"type": "connect", "salesRepId": "R1"})).await;
    let update = recv_type(&mut rep, "queue_update").await;
    let queue = update["queue"].as_array().unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(queue[0]["shopperId"], "S1");
    assert_eq!(queue[1]["shopperId"], "S2");
}

#[tokio::test]
async fn test_claim_handshake_delivers_offer() {
    // テスト項目: claim で rep に call_claimed、shopper に同じ sdpOffer を
    //             載せた call_answered、全 rep に割り当て済みスナップショット
    // given (前提条件):
    let server = TestServer::start(19093);
    server.ready().await;
    let (mut shopper, _) = join_shopper(&server, "S1").await;
    let mut rep = connect_rep(&server, "R1").await;

    // when (操作):
    let offer = json!({"sdp": "v=0 o=- 46117 2", "type": "offer"});
    send_json(
        &mut rep,
        json!({"type": "claim_call", "salesRepId": "R1", "shopperId": "S1", "sdpOffer": offer}),
    )
    .await;

    // then (期待する結果):
    let claimed = recv_type(&mut rep, "call_claimed").await;
    assert_eq!(claimed["shopperId"], "S1");

    let answered = recv_type(&mut shopper, "call_answered").await;
    assert_eq!(answered["salesRepId"], "R1");
    assert_eq!(answered["sdpOffer"], offer);

    let update = recv_type(&mut rep, "queue_update").await;
    assert_eq!(update["queue"][0]["assignedRepId"], "R1");
}

#[tokio::test]
async fn test_double_claim_is_denied() {
    // テスト項目: 割り当て済み shopper への二重 claim は error になる
    // given (前提条件): S1 は R1 が claim 済み
    let server = TestServer::start(19094);
    server.ready().await;
    let (_shopper, _) = join_shopper(&server, "S1").await;
    let mut rep1 = connect_rep(&server, "R1").await;
    send_json(
        &mut rep1,
        json!({"type": "claim_call", "salesRepId": "R1", "shopperId": "S1", "sdpOffer": {}}),
    )
    .await;
    recv_type(&mut rep1, "call_claimed").await;

    // when (操作): R2 が同じ shopper を claim する
    let mut rep2 = connect_rep(&server, "R2").await;
    send_json(
        &mut rep2,
        json!({"type": "claim_call", "salesRepId": "R2", "shopperId": "S1", "sdpOffer": {}}),
    )
    .await;

    // then (期待する結果):
    let error = recv_type(&mut rep2, "error").await;
    let message = error["message"].as_str().unwrap();
    assert!(message.contains("already claimed"), "got: {message}");
}

#[tokio::test]
async fn test_release_puts_shopper_back_in_line() {
    // テスト項目: release で shopper が到着順の位置に戻り、スナップショット
    //             の割り当てが外れる
    // given (前提条件): S1, S2 が参加し、S1 を R1 が claim 済み
    let server = TestServer::start(19095);
    server.ready().await;
    let (mut s1, _) = join_shopper(&server, "S1").await;
    let (_s2, _) = join_shopper(&server, "S2").await;
    let mut rep = connect_rep(&server, "R1").await;
    send_json(
        &mut rep,
        json!({"type": "claim_call", "salesRepId": "R1", "shopperId": "S1", "sdpOffer": {}}),
    )
    .await;
    recv_type(&mut rep, "call_claimed").await;
    recv_type(&mut s1, "call_answered").await;

    // when (操作):
    send_json(
        &mut rep,
        json!({"type": "release_call", "salesRepId": "R1", "shopperId": "S1"}),
    )
    .await;

    // then (期待する結果): S1 は connected_at が最古なので先頭に戻る
    recv_type(&mut rep, "call_released").await;
    let released = recv_type(&mut s1, "call_released").await;
    assert_eq!(released["previousSalesRepId"], "R1");
    assert_eq!(released["position"], 1);

    let update = recv_type(&mut rep, "queue_update").await;
    assert!(update["queue"][0]["assignedRepId"].is_null());
}

#[tokio::test]
async fn test_collaboration_request_accept_flow() {
    // テスト項目: collaboration 要求 → 承諾の往復で両者に status が届く
    // given (前提条件): S1 を R1 が claim 済み
    let server = TestServer::start(19096);
    server.ready().await;
    let (mut shopper, _) = join_shopper(&server, "S1").await;
    let mut rep = connect_rep(&server, "R1").await;
    send_json(
        &mut rep,
        json!({"type": "claim_call", "salesRepId": "R1", "shopperId": "S1", "sdpOffer": {}}),
    )
    .await;
    recv_type(&mut rep, "call_claimed").await;
    recv_type(&mut shopper, "call_answered").await;

    // when (操作): R1 が collaboration を要求する
    send_json(
        &mut rep,
        json!({"type": "request_collaboration", "salesRepId": "R1", "shopperId": "S1"}),
    )
    .await;

    // then (期待する結果): shopper に表示名付きの要求、rep に pending
    let request = recv_type(&mut shopper, "collaboration_request").await;
    assert_eq!(request["salesRepId"], "R1");
    assert_eq!(request["salesRepName"], "Sales Rep R1");

    let pending = recv_type(&mut rep, "collaboration_status").await;
    assert_eq!(pending["status"], "pending");

    // when (操作): shopper が承諾する
    send_json(
        &mut shopper,
        json!({
            "type": "collaboration_response",
            "shopperId": "S1",
            "salesRepId": "R1",
            "accepted": true
        }),
    )
    .await;

    // then (期待する結果): 両者に accepted が届く
    let shopper_status = recv_type(&mut shopper, "collaboration_status").await;
    assert_eq!(shopper_status["status"], "accepted");
    let rep_status = recv_type(&mut rep, "collaboration_status").await;
    assert_eq!(rep_status["status"], "accepted");
}

#[tokio::test]
async fn test_shopper_ends_call() {
    // テスト項目: end_call で shopper に call_ended、rep に
    //             call_ended_by_shopper、スナップショットの割り当てが外れる
    // given (前提条件): S1 を R1 が claim 済み
    let server = TestServer::start(19097);
    server.ready().await;
    let (mut shopper, _) = join_shopper(&server, "S1").await;
    let mut rep = connect_rep(&server, "R1").await;
    send_json(
        &mut rep,
        json!({"type": "claim_call", "salesRepId": "R1", "shopperId": "S1", "sdpOffer": {}}),
    )
    .await;
    recv_type(&mut rep, "call_claimed").await;
    recv_type(&mut shopper, "call_answered").await;

    // when (操作):
    send_json(&mut shopper, json!({"type": "end_call", "shopperId": "S1"})).await;

    // then (期待する結果):
    let ended = recv_type(&mut shopper, "call_ended").await;
    assert_eq!(ended["shopperId"], "S1");

    let by_shopper = recv_type(&mut rep, "call_ended_by_shopper").await;
    assert_eq!(by_shopper["shopperId"], "S1");

    let update = recv_type(&mut rep, "queue_update").await;
    assert!(update["queue"][0]["assignedRepId"].is_null());
}

#[tokio::test]
async fn test_signaling_without_call_is_rejected() {
    // テスト項目: 通話中でない shopper からのシグナリングは error になる
    // given (前提条件): S1 は参加済みだが claim されていない
    let server = TestServer::start(19098);
    server.ready().await;
    let (mut shopper, _) = join_shopper(&server, "S1").await;

    // when (操作):
    send_json(
        &mut shopper,
        json!({"type": "sdp_answer", "shopperId": "S1", "sdpAnswer": {"sdp": "v=0"}}),
    )
    .await;

    // then (期待する結果):
    let error = recv_type(&mut shopper, "error").await;
    assert_eq!(error["message"], "No active call for this shopper");
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection_open() {
    // テスト項目: 壊れたフレームは error 応答になり、接続は切れない
    // given (前提条件):
    let server = TestServer::start(19099);
    server.ready().await;
    let mut shopper = connect(&server.ws_url("/api/ws/call")).await;
    recv_type(&mut shopper, "connected").await;

    // when (操作): JSON でないフレームを送る
    shopper
        .send(Message::Text("this is not json".to_string().into()))
        .await
        .expect("Failed to send frame");

    // then (期待する結果):
    let error = recv_type(&mut shopper, "error").await;
    assert_eq!(error["message"], "Invalid message format");

    // 接続はまだ生きている
    send_json(
        &mut shopper,
        json!({"type": "join_queue", "shopperId": "S1", "mediaCapabilities": null}),
    )
    .await;
    let joined = recv_type(&mut shopper, "queue_joined").await;
    assert_eq!(joined["position"], 1);
}
