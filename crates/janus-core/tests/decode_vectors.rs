//! Decoder vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]


use std::sync::Arc;

use janus_core::plugins::{PluginKind, PluginMessage, RoomId};
use janus_core::protocol::{Message, PluginPayload, RequestContext};
use janus_core::{Decoder, JanusError, MessageKind, NestedOutcome, RegistryBuilder};
use vector_loader::{load, TestVector};

fn nested_name(outcome: &NestedOutcome) -> Option<String> {
    match outcome {
        NestedOutcome::NotApplicable => None,
        NestedOutcome::Resolved(kind) => Some(kind.as_str().to_string()),
        NestedOutcome::Unmodelled { .. } => Some("unmodelled".to_string()),
    }
}

fn check(decoder: &Decoder, v: &TestVector) {
    let result = decoder.decode(&v.raw(), &v.request_context());
    match (&v.expect, &v.expect_error) {
        (Some(expect), None) => {
            let decoded = result.unwrap_or_else(|e| panic!("{}: {e}", v.description));
            assert_eq!(
                MessageKind::of(&decoded.message).as_str(),
                expect.kind,
                "{}",
                v.description
            );
            assert_eq!(nested_name(&decoded.nested), expect.nested, "{}", v.description);
        }
        (None, Some(expect_error)) => {
            let err = result.expect_err(&v.description);
            assert_eq!(err.code().as_str(), expect_error.code, "{}", v.description);
        }
        _ => panic!("{}: vector needs exactly one of expect/expect_error", v.description),
    }
}

fn run(file: &str) {
    let decoder = Decoder::standard();
    let vectors = load(file);
    assert!(!vectors.is_empty());
    for v in &vectors {
        check(&decoder, v);
    }
}

#[test]
fn every_flat_discriminator_decodes_to_its_type() {
    run("flat_kinds.json");
}

#[test]
fn success_takes_its_type_from_the_request() {
    run("success_by_action.json");
}

#[test]
fn nested_payloads() {
    run("nested.json");
}

#[test]
fn frame_failures() {
    run("failures.json");
}

#[test]
fn error_marker_resolves_to_plugin_error_for_any_action() {
    let decoder = Decoder::standard();
    for action in ["list", "create", "edit", "destroy", "kick"] {
        let ctx = RequestContext::new("message_plugin").with_plugin(
            janus_core::protocol::PluginTarget::new("janus.plugin.videoroom", action),
        );
        let raw = br#"{"janus":"success","transaction":"e1","response":{"videoroom":"event","error_code":427,"error":"Room exists"}}"#;
        let decoded = decoder.decode(raw, &ctx).unwrap();
        assert_eq!(decoded.nested, NestedOutcome::Resolved(PluginKind::VideoroomError));

        let err = decoded.message.into_result().unwrap_err();
        match err {
            JanusError::PluginRemote { plugin, code, reason } => {
                assert_eq!(plugin, "janus.plugin.videoroom");
                assert_eq!(code, 427);
                assert_eq!(reason, "Room exists");
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}

#[test]
fn remote_error_carries_code_and_transaction() {
    let decoder = Decoder::standard();
    let v = &load("remote_error_456.json")[0];
    let decoded = decoder.decode(&v.raw(), &v.request_context()).unwrap();
    assert_eq!(decoded.meta.correlation_id.as_ref().unwrap().as_str(), "tx1");
    assert_eq!(decoded.nested, NestedOutcome::NotApplicable);

    match decoded.message.into_result().unwrap_err() {
        JanusError::Remote { code, reason } => {
            assert_eq!(code, 456);
            assert_eq!(reason, "no such room");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn roomkeeper_create_resolves_to_create_type() {
    let registry = RegistryBuilder::standard()
        .register_nested("roomkeeper", "create", PluginKind::VideoroomCreate)
        .build();
    let decoder = Decoder::new(Arc::new(registry));
    let v = &load("roomkeeper_create.json")[0];
    check(&decoder, v);

    let decoded = decoder.decode(&v.raw(), &v.request_context()).unwrap();
    let payload = decoded.message.plugin_payload().unwrap();
    match payload {
        PluginPayload::Typed(PluginMessage::VideoroomCreate(created)) => {
            assert_eq!(created.room, RoomId::from("hi"));
            assert!(!created.permanent);
        }
        other => panic!("expected create type, got {other:?}"),
    }

    // without the registration the same frame stays generic
    let plain = Decoder::standard().decode(&v.raw(), &v.request_context()).unwrap();
    assert!(plain.nested.is_unmodelled());
    assert!(plain.message.plugin_payload().unwrap().generic().is_some());
}

#[test]
fn unsolicited_event_keeps_routing_identity() {
    let decoder = Decoder::standard();
    let raw = br#"{"janus":"hangup","session_id":10,"sender":20,"reason":"Close PC"}"#;
    let decoded = decoder.decode(raw, &RequestContext::unsolicited()).unwrap();
    assert!(decoded.meta.correlation_id.is_none());
    assert_eq!(decoded.meta.identity(), Some((10, Some(20))));
    assert!(matches!(decoded.message, Message::Hangup(ref h) if h.reason == "Close PC"));
}

#[test]
fn admin_list_tokens_via_success() {
    let decoder = Decoder::standard();
    let raw = br#"{"janus":"success","transaction":"f1","data":{"tokens":[{"token":"abc","allowed_plugins":["janus.plugin.textroom"]}]}}"#;
    let decoded = decoder.decode(raw, &RequestContext::new("list_tokens")).unwrap();
    match decoded.message {
        Message::ListTokens(list) => {
            let t = list.find("abc").unwrap();
            assert_eq!(t.plugins, vec!["janus.plugin.textroom".to_string()]);
            assert!(list.find("zzz").is_none());
        }
        other => panic!("unexpected {other:?}"),
    }
}
