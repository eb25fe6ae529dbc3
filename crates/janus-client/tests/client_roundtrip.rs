#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use janus_client::config::AdminSection;
use janus_client::{AdminApi, ClientOptions, GatewayApi, GatewayClient, MemoryPeer, MemoryTransport};
use janus_core::error::JanusError;
use janus_core::plugins::{videoroom::VideoroomRequestFactory, PluginKind, PluginMessage, PluginRequestFactory, RoomId, VIDEOROOM};
use janus_core::protocol::{Message, PluginPayload};
use janus_core::{Decoder, RegistryBuilder};

fn start(options: ClientOptions, decoder: Decoder) -> (GatewayClient, MemoryPeer) {
    janus_client::logging::init();
    let (transport, peer) = MemoryTransport::pair(16);
    let client = GatewayClient::connect(Arc::new(transport), decoder, options);
    (client, peer)
}

fn default_client() -> (GatewayClient, MemoryPeer) {
    start(ClientOptions::default(), Decoder::standard())
}

/// Read one request and answer it with `reply(transaction)`.
async fn answer(peer: &mut MemoryPeer, reply: impl FnOnce(&str) -> Value) -> (String, Value) {
    let (path, body) = peer.next_request().await.expect("request");
    let tx = body["transaction"].as_str().expect("transaction").to_string();
    peer.push_json(&reply(&tx)).await.unwrap();
    (path, body)
}

fn admin(client: GatewayClient) -> AdminApi {
    let cfg = AdminSection {
        secret: Some("janusoverlord".into()),
        endpoint: Some("/admin".into()),
    };
    AdminApi::new(client, &cfg)
}

#[tokio::test]
async fn create_session_and_attach() {
    let (client, mut peer) = default_client();
    let api = GatewayApi::new(client.clone(), None);

    let (id, (path, body)) = tokio::join!(
        api.create_session(),
        answer(&mut peer, |tx| json!({"janus": "success", "transaction": tx, "data": {"id": 4242}}))
    );
    assert_eq!(id.unwrap(), 4242);
    assert_eq!(path, "");
    assert_eq!(body["janus"], "create");

    let (handle, (path, body)) = tokio::join!(
        api.attach(4242, VIDEOROOM),
        answer(&mut peer, |tx| json!({
            "janus": "success", "transaction": tx, "session_id": 4242, "data": {"id": 7}
        }))
    );
    assert_eq!(handle.unwrap(), 7);
    assert_eq!(path, "/4242");
    assert_eq!(body["plugin"], VIDEOROOM);

    assert_eq!(client.metrics().round_trip.count(&[("kind", "success")]), 2);
    assert_eq!(client.pending(), 0);
}

#[tokio::test]
async fn gateway_error_becomes_remote_error() {
    let (client, mut peer) = default_client();
    let api = GatewayApi::new(client.clone(), None);

    let (res, _) = tokio::join!(
        api.info(),
        answer(&mut peer, |tx| json!({
            "janus": "error",
            "transaction": tx,
            "error": {"code": 456, "reason": "Missing mandatory element (transaction)"}
        }))
    );
    match res.unwrap_err() {
        JanusError::Remote { code, reason } => {
            assert_eq!(code, 456);
            assert!(reason.contains("transaction"));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(
        client.metrics().remote_errors.get(&[("kind", "REMOTE"), ("code", "456")]),
        1
    );
}

#[tokio::test]
async fn timeout_then_late_answer_is_discarded() {
    let options = ClientOptions {
        request_timeout: Duration::from_millis(100),
        ..ClientOptions::default()
    };
    let (client, mut peer) = start(options, Decoder::standard());
    let api = GatewayApi::new(client.clone(), None);

    let err = api.keepalive(1).await.unwrap_err();
    assert_eq!(err.code().as_str(), "TIMEOUT");
    assert_eq!(client.metrics().request_timeouts.get(&[("action", "keepalive")]), 1);

    let (_, stale) = peer.next_request().await.unwrap();
    peer.push_json(&json!({"janus": "ack", "transaction": stale["transaction"]}))
        .await
        .unwrap();

    // a round trip after the stale ack proves the reader already saw it
    let (res, _) = tokio::join!(
        api.keepalive(1),
        answer(&mut peer, |tx| json!({"janus": "ack", "transaction": tx}))
    );
    res.unwrap();

    let m = client.metrics();
    assert_eq!(m.late_responses.total(), 0);
    assert_eq!(m.decode_errors.total(), 0);
    assert_eq!(m.pending_requests.get(&[]), 0);
}

#[tokio::test]
async fn second_answer_counts_as_late() {
    let (client, mut peer) = default_client();
    let api = GatewayApi::new(client.clone(), None);

    let (res, (_, body)) = tokio::join!(
        api.detach(3, 4),
        answer(&mut peer, |tx| json!({"janus": "success", "transaction": tx, "session_id": 3}))
    );
    res.unwrap();
    peer.push_json(&json!({"janus": "success", "transaction": body["transaction"], "session_id": 3}))
        .await
        .unwrap();

    let (res, _) = tokio::join!(
        api.keepalive(3),
        answer(&mut peer, |tx| json!({"janus": "ack", "transaction": tx}))
    );
    res.unwrap();
    assert_eq!(client.metrics().late_responses.total(), 1);
    assert_eq!(
        client.metrics().decode_errors.get(&[("code", "UNEXPECTED_LATE_RESPONSE")]),
        1
    );
}

#[tokio::test]
async fn async_plugin_result_follows_the_ack() {
    let (client, mut peer) = default_client();
    let api = GatewayApi::new(client.clone(), None);
    let mut events = api.events(1, Some(2)).unwrap();
    let join = PluginRequestFactory::new(VIDEOROOM, None).make("join");

    let (res, (_, body)) = tokio::join!(
        api.message(1, 2, join, None),
        answer(&mut peer, |tx| json!({"janus": "ack", "transaction": tx, "session_id": 1}))
    );
    assert!(matches!(res.unwrap(), Message::Ack(_)));

    peer.push_json(&json!({
        "janus": "event",
        "transaction": body["transaction"],
        "session_id": 1,
        "sender": 2,
        "plugindata": {"plugin": VIDEOROOM, "data": {"videoroom": "joined", "room": 1234}}
    }))
    .await
    .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();
    match msg {
        Message::Event(e) => {
            let data = e.plugin_data.unwrap().data;
            assert_eq!(data.generic().unwrap()["videoroom"], "joined");
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(client.metrics().late_responses.total(), 0);
    assert_eq!(client.metrics().decode_errors.total(), 0);
}

#[tokio::test]
async fn dropped_peer_closes_pending_requests() {
    let (client, mut peer) = default_client();
    let api = GatewayApi::new(client.clone(), None);

    let pending = tokio::spawn(async move { api.info().await });
    peer.next_request().await.unwrap();
    drop(peer);

    let err = pending.await.unwrap().unwrap_err();
    assert_eq!(err.code().as_str(), "CONNECTION_CLOSED");
    assert!(client.is_closed());

    let err = GatewayApi::new(client.clone(), None).info().await.unwrap_err();
    assert_eq!(err.code().as_str(), "CONNECTION_CLOSED");
}

#[tokio::test]
async fn events_reach_subscribers_and_bad_frames_do_not_stop_the_reader() {
    let (client, peer) = default_client();
    let api = GatewayApi::new(client.clone(), None);
    let mut events = api.events(1, Some(2)).unwrap();

    peer.push(&b"not json at all"[..]).await.unwrap();
    peer.push_json(&json!({"janus": "bogus", "session_id": 1, "sender": 2}))
        .await
        .unwrap();
    peer.push_json(&json!({"janus": "hangup", "session_id": 9, "sender": 9, "reason": "bye"}))
        .await
        .unwrap();
    peer.push_json(&json!({
        "janus": "event",
        "session_id": 1,
        "sender": 2,
        "plugindata": {"plugin": VIDEOROOM, "data": {"videoroom": "talking"}}
    }))
    .await
    .unwrap();

    let msg = tokio::time::timeout(Duration::from_secs(1), events.recv())
        .await
        .unwrap()
        .unwrap();
    match msg {
        Message::Event(e) => {
            let data = e.plugin_data.unwrap().data;
            assert_eq!(data.generic().unwrap()["videoroom"], "talking");
        }
        other => panic!("unexpected {other:?}"),
    }

    let m = client.metrics();
    assert_eq!(m.decode_errors.get(&[("code", "MALFORMED_ENVELOPE")]), 1);
    assert_eq!(m.decode_errors.get(&[("code", "UNKNOWN_MESSAGE_TYPE")]), 1);
    assert_eq!(m.orphan_messages.total(), 1);
    assert_eq!(m.frames_received.total(), 4);
    assert!(m.render().contains("janus_decode_errors_total"));
}

#[tokio::test]
async fn unmodelled_plugin_action_stays_generic() {
    let (client, mut peer) = default_client();
    let api = GatewayApi::new(client.clone(), None);
    let kick = PluginRequestFactory::new(VIDEOROOM, None).make("kick");

    let (res, (path, body)) = tokio::join!(
        api.message(1, 2, kick, None),
        answer(&mut peer, |tx| json!({
            "janus": "success",
            "transaction": tx,
            "session_id": 1,
            "sender": 2,
            "plugindata": {"plugin": VIDEOROOM, "data": {"videoroom": "success"}}
        }))
    );
    assert_eq!(path, "/1/2");
    assert_eq!(body["body"]["request"], "kick");

    let msg = res.unwrap();
    let payload = msg.plugin_payload().unwrap();
    assert!(payload.generic().is_some());
    assert_eq!(
        client
            .metrics()
            .nested_unresolved
            .get(&[("plugin", VIDEOROOM), ("action", "kick")]),
        1
    );
}

#[tokio::test]
async fn admin_message_plugin_is_typed_by_action() {
    let (client, mut peer) = default_client();
    let admin = admin(client.clone());
    let factory = VideoroomRequestFactory::new(None);

    let (res, (path, body)) = tokio::join!(
        admin.message_plugin(factory.list()),
        answer(&mut peer, |tx| json!({
            "janus": "success",
            "transaction": tx,
            "response": {
                "videoroom": "success",
                "list": [{"room": 1234, "description": "Demo Room", "num_participants": 2}]
            }
        }))
    );
    assert_eq!(path, "/admin");
    assert_eq!(body["janus"], "message_plugin");
    assert_eq!(body["admin_secret"], "janusoverlord");
    assert_eq!(body["plugin"], VIDEOROOM);
    assert_eq!(body["request"]["request"], "list");

    match res.unwrap() {
        PluginPayload::Typed(PluginMessage::VideoroomList(list)) => {
            assert_eq!(list.list.len(), 1);
            assert_eq!(list.list[0].room.room, RoomId::Number(1234));
            assert_eq!(list.list[0].num_participants, 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn admin_plugin_error_marker_wins_over_action() {
    let (client, mut peer) = default_client();
    let admin = admin(client.clone());
    let factory = VideoroomRequestFactory::new(None);

    let (res, _) = tokio::join!(
        admin.message_plugin(factory.list()),
        answer(&mut peer, |tx| json!({
            "janus": "success",
            "transaction": tx,
            "response": {"videoroom": "event", "error_code": 427, "error": "Room 1234 already exists"}
        }))
    );
    match res.unwrap_err() {
        JanusError::PluginRemote { plugin, code, .. } => {
            assert_eq!(plugin, VIDEOROOM);
            assert_eq!(code, 427);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn custom_registry_types_a_third_party_plugin() {
    let registry = RegistryBuilder::standard()
        .register_nested("roomkeeper", "create", PluginKind::VideoroomCreate)
        .build();
    let (client, mut peer) = start(ClientOptions::default(), Decoder::new(Arc::new(registry)));
    let admin = admin(client);
    let create = PluginRequestFactory::new("roomkeeper", None).make("create");

    let (res, _) = tokio::join!(
        admin.message_plugin(create),
        answer(&mut peer, |tx| json!({
            "janus": "success",
            "transaction": tx,
            "response": {"roomkeeper": "created", "room": "hi", "permanent": false}
        }))
    );
    match res.unwrap() {
        PluginPayload::Typed(PluginMessage::VideoroomCreate(c)) => {
            assert_eq!(c.room, RoomId::from("hi"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn admin_token_lifecycle() {
    let (client, mut peer) = default_client();
    let admin = admin(client);

    let (res, (_, body)) = tokio::join!(
        admin.add_token("abc", &[VIDEOROOM]),
        answer(&mut peer, |tx| json!({
            "janus": "success", "transaction": tx, "data": {"plugins": [VIDEOROOM]}
        }))
    );
    assert!(res.unwrap().is_some());
    assert_eq!(body["janus"], "add_token");
    assert_eq!(body["token"], "abc");
    assert_eq!(body["plugins"], json!([VIDEOROOM]));

    let (res, _) = tokio::join!(
        admin.list_tokens(),
        answer(&mut peer, |tx| json!({
            "janus": "success",
            "transaction": tx,
            "data": {"tokens": [{"token": "abc", "allowed_plugins": [VIDEOROOM]}]}
        }))
    );
    let tokens = res.unwrap();
    assert_eq!(tokens.find("abc").unwrap().plugins, vec![VIDEOROOM.to_string()]);

    let (res, (_, body)) = tokio::join!(
        admin.remove_token("abc"),
        answer(&mut peer, |tx| json!({"janus": "success", "transaction": tx}))
    );
    res.unwrap();
    assert_eq!(body["janus"], "remove_token");
}

#[tokio::test]
async fn admin_session_and_handle_listing() {
    let (client, mut peer) = default_client();
    let admin = admin(client);

    let (res, _) = tokio::join!(
        admin.list_sessions(),
        answer(&mut peer, |tx| json!({"janus": "success", "transaction": tx, "sessions": [1, 2]}))
    );
    assert_eq!(res.unwrap(), vec![1, 2]);

    let (res, (path, _)) = tokio::join!(
        admin.list_handles(1),
        answer(&mut peer, |tx| json!({
            "janus": "success", "transaction": tx, "session_id": 1, "handles": [10]
        }))
    );
    assert_eq!(res.unwrap(), vec![10]);
    assert_eq!(path, "/admin/1");

    let (res, (path, _)) = tokio::join!(
        admin.handle_info(1, 10),
        answer(&mut peer, |tx| json!({
            "janus": "success",
            "transaction": tx,
            "session_id": 1,
            "handle_id": 10,
            "info": {"plugin": VIDEOROOM}
        }))
    );
    let info = res.unwrap();
    assert_eq!(path, "/admin/1/10");
    assert_eq!(info.info["plugin"], VIDEOROOM);
}

#[tokio::test]
async fn close_fails_waiters_and_ends_streams() {
    let (client, mut peer) = default_client();
    let api = GatewayApi::new(client.clone(), None);
    let mut events = api.events(5, None).unwrap();

    let waiting = tokio::spawn({
        let api = api.clone();
        async move { api.keepalive(5).await }
    });
    peer.next_request().await.unwrap();

    client.close().await.unwrap();
    assert_eq!(waiting.await.unwrap().unwrap_err().code().as_str(), "CONNECTION_CLOSED");
    assert!(events.recv().await.is_none());
    assert!(api.events(5, None).is_err());
}
