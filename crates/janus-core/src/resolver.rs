//! Second-level dispatch of plugin payloads.

use crate::error::Result;
use crate::plugins::PluginKind;
use crate::protocol::plugin::{PluginPayload, ERROR_MARKER};
use crate::protocol::PluginTarget;
use crate::registry::Registry;

/// What happened to a message's plugin payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NestedOutcome {
    /// No plugin target, or no plugin payload on the message.
    #[default]
    NotApplicable,
    Resolved(PluginKind),
    /// Pair not in the nested registry; payload left generic.
    Unmodelled { plugin: String, action: String },
}

impl NestedOutcome {
    pub fn is_unmodelled(&self) -> bool {
        matches!(self, NestedOutcome::Unmodelled { .. })
    }
}

/// Replace a generic plugin payload with its typed form when the
/// (plugin, action) pair is known.
///
/// A payload carrying the error marker resolves through the plugin's
/// `error` entry whatever action was requested.
pub fn resolve_nested(
    registry: &Registry,
    target: &PluginTarget,
    payload: PluginPayload,
) -> Result<(PluginPayload, NestedOutcome)> {
    let map = match payload {
        PluginPayload::Generic(map) => map,
        typed @ PluginPayload::Typed(_) => return Ok((typed, NestedOutcome::NotApplicable)),
    };

    let action = if map.contains_key(ERROR_MARKER) {
        ERROR_MARKER
    } else {
        target.action.as_str()
    };

    match registry.resolve_nested(&target.plugin, action) {
        Some(kind) => {
            let typed = kind.decode(map)?;
            Ok((PluginPayload::Typed(typed), NestedOutcome::Resolved(kind)))
        }
        None => {
            tracing::debug!(plugin = %target.plugin, action, "no nested type registered; payload left generic");
            Ok((
                PluginPayload::Generic(map),
                NestedOutcome::Unmodelled {
                    plugin: target.plugin.clone(),
                    action: action.to_string(),
                },
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;
    use crate::plugins::{PluginMessage, VIDEOROOM};
    use serde_json::json;

    fn generic(v: serde_json::Value) -> PluginPayload {
        PluginPayload::Generic(v.as_object().cloned().unwrap())
    }

    #[test]
    fn error_marker_wins_over_action() {
        let r = Registry::standard();
        for action in ["list", "create", "edit", "destroy", "unknown"] {
            let target = PluginTarget::new(VIDEOROOM, action);
            let (p, outcome) = resolve_nested(
                &r,
                &target,
                generic(json!({"videoroom":"event","error_code":426,"error":"No such room"})),
            )
            .unwrap();
            assert_eq!(outcome, NestedOutcome::Resolved(PluginKind::VideoroomError));
            let err = p.typed().and_then(PluginMessage::as_error).unwrap();
            assert_eq!(err.code, 426);
        }
    }

    #[test]
    fn miss_leaves_payload_generic() {
        let r = Registry::standard();
        let target = PluginTarget::new("janus.plugin.echotest", "ping");
        let (p, outcome) = resolve_nested(&r, &target, generic(json!({"result":"ok"}))).unwrap();
        assert!(outcome.is_unmodelled());
        assert_eq!(p.generic().unwrap()["result"], json!("ok"));
    }

    #[test]
    fn hit_with_bad_shape_is_malformed() {
        let r = Registry::standard();
        let target = PluginTarget::new(VIDEOROOM, "create");
        let err = resolve_nested(&r, &target, generic(json!({"permanent":true}))).unwrap_err();
        assert_eq!(err.code().as_str(), "MALFORMED_PAYLOAD");
    }
}
