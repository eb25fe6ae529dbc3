#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use janus_client::config;
use janus_client::{ClientOptions, OverflowPolicy};

#[test]
fn deny_unknown_fields_nested() {
    let bad = r#"
version: 1
client:
  request_timeout_ms: 5000
  event_bufer: 8 # typo should fail
"#;

    let err = config::load_from_str(bad).expect_err("must fail");
    assert_eq!(err.code().as_str(), "BAD_CONFIG");
}

#[test]
fn ok_minimal_config() {
    let cfg = config::load_from_str("version: 1\n").expect("must parse");
    assert_eq!(cfg.version, 1);
    assert_eq!(cfg.client.request_timeout_ms, 10_000);
    assert_eq!(cfg.client.event_overflow, OverflowPolicy::DropOldest);
    assert!(cfg.admin.secret.is_none());
}

#[test]
fn full_config_maps_to_options() {
    let ok = r#"
version: 1
client:
  request_timeout_ms: 2500
  event_buffer: 4
  event_overflow: drop_newest
  retired_capacity: 64
admin:
  secret: "janusoverlord"
  endpoint: "/admin"
"#;
    let cfg = config::load_from_str(ok).expect("must parse");
    let opts = ClientOptions::from(&cfg.client);
    assert_eq!(opts.request_timeout.as_millis(), 2500);
    assert_eq!(opts.event_buffer, 4);
    assert_eq!(opts.event_overflow, OverflowPolicy::DropNewest);
    assert_eq!(opts.retired_capacity, 64);
    assert_eq!(cfg.admin.endpoint.as_deref(), Some("/admin"));
}

#[test]
fn unsupported_version() {
    let err = config::load_from_str("version: 2\n").expect_err("must fail");
    assert_eq!(err.code().as_str(), "UNSUPPORTED_VERSION");
}

#[test]
fn out_of_range_values_rejected() {
    for bad in [
        "version: 1\nclient:\n  request_timeout_ms: 10\n",
        "version: 1\nclient:\n  event_buffer: 0\n",
        "version: 1\nclient:\n  retired_capacity: 1\n",
        "version: 1\nadmin:\n  endpoint: \"admin\"\n",
    ] {
        let err = config::load_from_str(bad).expect_err(bad);
        assert_eq!(err.code().as_str(), "BAD_CONFIG", "{bad}");
    }
}
