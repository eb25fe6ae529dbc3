//! Outbound request builders.
//!
//! Requests are built in layers: `BaseRequest` (action, transaction, secret)
//! → `SessionRequest` (+ `session_id`, endpoint `/{session}`) →
//! `HandleRequest` (+ `handle_id`, endpoint `/{session}/{handle}`). Each layer
//! extends the payload of the one below it.

use serde_json::{Map, Value};

use crate::error::{JanusError, Result};
use crate::plugins::PluginRequest;
use crate::protocol::{CorrelationId, PluginTarget, RequestContext};

/// Credential attached to a request, keyed by the field the gateway expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Secret {
    /// Admin/monitor API (`admin_secret`).
    Admin(String),
    /// Client API shared secret (`apisecret`).
    Api(String),
    /// Client API stored token (`token`).
    Token(String),
}

impl Secret {
    pub fn field(&self) -> &'static str {
        match self {
            Secret::Admin(_) => "admin_secret",
            Secret::Api(_) => "apisecret",
            Secret::Token(_) => "token",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Secret::Admin(v) | Secret::Api(v) | Secret::Token(v) => v,
        }
    }
}

/// Anything that can be sent to the gateway.
pub trait ApiRequest: Send + Sync {
    /// Value of the `janus` field.
    fn action(&self) -> &str;
    fn transaction(&self) -> &CorrelationId;
    /// Path relative to the API root.
    fn endpoint(&self) -> String;
    fn payload(&self) -> Result<Map<String, Value>>;

    /// What the decoder needs to know about this request.
    fn context(&self) -> RequestContext {
        RequestContext::new(self.action())
    }

    fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&Value::Object(self.payload()?)).map_err(|e| JanusError::Encode(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseRequest {
    pub action: String,
    pub transaction: CorrelationId,
    pub secret: Option<Secret>,
}

impl BaseRequest {
    /// New request with a freshly generated transaction.
    pub fn new(action: impl Into<String>, secret: Option<Secret>) -> Self {
        Self {
            action: action.into(),
            transaction: CorrelationId::generate(),
            secret,
        }
    }

    pub fn with_transaction(mut self, transaction: impl Into<CorrelationId>) -> Self {
        self.transaction = transaction.into();
        self
    }
}

impl ApiRequest for BaseRequest {
    fn action(&self) -> &str {
        &self.action
    }

    fn transaction(&self) -> &CorrelationId {
        &self.transaction
    }

    fn endpoint(&self) -> String {
        String::new()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = Map::new();
        m.insert("janus".into(), Value::String(self.action.clone()));
        m.insert(
            "transaction".into(),
            Value::String(self.transaction.as_str().to_string()),
        );
        if let Some(secret) = &self.secret {
            m.insert(secret.field().into(), Value::String(secret.value().to_string()));
        }
        Ok(m)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRequest {
    pub base: BaseRequest,
    pub session_id: u64,
}

impl SessionRequest {
    pub fn new(base: BaseRequest, session_id: u64) -> Self {
        Self { base, session_id }
    }
}

impl ApiRequest for SessionRequest {
    fn action(&self) -> &str {
        self.base.action()
    }

    fn transaction(&self) -> &CorrelationId {
        self.base.transaction()
    }

    fn endpoint(&self) -> String {
        format!("/{}", self.session_id)
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = self.base.payload()?;
        m.insert("session_id".into(), Value::from(self.session_id));
        Ok(m)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleRequest {
    pub session: SessionRequest,
    pub handle_id: u64,
}

impl HandleRequest {
    pub fn new(base: BaseRequest, session_id: u64, handle_id: u64) -> Self {
        Self {
            session: SessionRequest::new(base, session_id),
            handle_id,
        }
    }
}

impl ApiRequest for HandleRequest {
    fn action(&self) -> &str {
        self.session.action()
    }

    fn transaction(&self) -> &CorrelationId {
        self.session.transaction()
    }

    fn endpoint(&self) -> String {
        format!("{}/{}", self.session.endpoint(), self.handle_id)
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = self.session.payload()?;
        m.insert("handle_id".into(), Value::from(self.handle_id));
        Ok(m)
    }
}

/// Admin token management (`add_token`, `allow_token`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRequest {
    pub base: BaseRequest,
    pub token: String,
    pub plugins: Vec<String>,
}

impl ApiRequest for TokenRequest {
    fn action(&self) -> &str {
        self.base.action()
    }

    fn transaction(&self) -> &CorrelationId {
        self.base.transaction()
    }

    fn endpoint(&self) -> String {
        self.base.endpoint()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = self.base.payload()?;
        m.insert("token".into(), Value::String(self.token.clone()));
        m.insert(
            "plugins".into(),
            Value::Array(self.plugins.iter().cloned().map(Value::String).collect()),
        );
        Ok(m)
    }
}

fn plugin_context(action: &str, request: &dyn PluginRequest) -> RequestContext {
    RequestContext::new(action).with_plugin(PluginTarget::new(request.plugin(), request.action()))
}

/// Admin `message_plugin`: `{"plugin": .., "request": {...}}`.
#[derive(Debug, Clone)]
pub struct MessagePluginRequest<P> {
    pub base: BaseRequest,
    pub request: P,
}

impl<P: PluginRequest> ApiRequest for MessagePluginRequest<P> {
    fn action(&self) -> &str {
        self.base.action()
    }

    fn transaction(&self) -> &CorrelationId {
        self.base.transaction()
    }

    fn endpoint(&self) -> String {
        self.base.endpoint()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = self.base.payload()?;
        m.insert("plugin".into(), Value::String(self.request.plugin().to_string()));
        m.insert("request".into(), Value::Object(self.request.payload()?));
        Ok(m)
    }

    fn context(&self) -> RequestContext {
        plugin_context(self.action(), &self.request)
    }
}

/// Client API `attach`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachRequest {
    pub session: SessionRequest,
    pub plugin: String,
    pub opaque_id: Option<String>,
}

impl ApiRequest for AttachRequest {
    fn action(&self) -> &str {
        self.session.action()
    }

    fn transaction(&self) -> &CorrelationId {
        self.session.transaction()
    }

    fn endpoint(&self) -> String {
        self.session.endpoint()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = self.session.payload()?;
        m.insert("plugin".into(), Value::String(self.plugin.clone()));
        if let Some(opaque) = &self.opaque_id {
            m.insert("opaque_id".into(), Value::String(opaque.clone()));
        }
        Ok(m)
    }
}

/// Client API `message` to an attached handle: `{"body": {...}, "jsep"?}`.
#[derive(Debug, Clone)]
pub struct HandleMessageRequest<P> {
    pub handle: HandleRequest,
    pub body: P,
    pub jsep: Option<Map<String, Value>>,
}

impl<P: PluginRequest> ApiRequest for HandleMessageRequest<P> {
    fn action(&self) -> &str {
        self.handle.action()
    }

    fn transaction(&self) -> &CorrelationId {
        self.handle.transaction()
    }

    fn endpoint(&self) -> String {
        self.handle.endpoint()
    }

    fn payload(&self) -> Result<Map<String, Value>> {
        let mut m = self.handle.payload()?;
        m.insert("body".into(), Value::Object(self.body.payload()?));
        if let Some(jsep) = &self.jsep {
            m.insert("jsep".into(), Value::Object(jsep.clone()));
        }
        Ok(m)
    }

    fn context(&self) -> RequestContext {
        plugin_context(self.action(), &self.body)
    }
}
