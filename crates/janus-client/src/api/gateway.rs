//! Client API: sessions, handles and plugin messages.

use serde_json::{Map, Value};

use janus_core::error::{JanusError, Result};
use janus_core::plugins::PluginRequest;
use janus_core::protocol::message::InfoMsg;
use janus_core::protocol::Message;
use janus_core::request::{
    AttachRequest, BaseRequest, HandleMessageRequest, HandleRequest, Secret, SessionRequest,
};

use super::unexpected;
use crate::router::EventStream;
use crate::GatewayClient;

#[derive(Clone)]
pub struct GatewayApi {
    client: GatewayClient,
    secret: Option<Secret>,
}

impl GatewayApi {
    pub fn new(client: GatewayClient, secret: Option<Secret>) -> Self {
        Self { client, secret }
    }

    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    fn base(&self, action: &str) -> BaseRequest {
        BaseRequest::new(action, self.secret.clone())
    }

    pub async fn info(&self) -> Result<InfoMsg> {
        match self.client.request(&self.base("info")).await? {
            Message::ServerInfo(info) => Ok(info),
            other => Err(unexpected("server_info", &other)),
        }
    }

    /// Create a session; returns its id.
    pub async fn create_session(&self) -> Result<u64> {
        let msg = self.client.request(&self.base("create")).await?;
        new_id(msg, "create")
    }

    /// Attach to a plugin; returns the handle id.
    pub async fn attach(&self, session_id: u64, plugin: &str) -> Result<u64> {
        let req = AttachRequest {
            session: SessionRequest::new(self.base("attach"), session_id),
            plugin: plugin.to_string(),
            opaque_id: None,
        };
        let msg = self.client.request(&req).await?;
        new_id(msg, "attach")
    }

    /// Send a plugin request to an attached handle.
    ///
    /// Synchronous plugins answer with `success` and the typed payload;
    /// asynchronous ones answer with `ack` and report through the handle's
    /// event stream.
    pub async fn message<P: PluginRequest>(
        &self,
        session_id: u64,
        handle_id: u64,
        body: P,
        jsep: Option<Map<String, Value>>,
    ) -> Result<Message> {
        let req = HandleMessageRequest {
            handle: HandleRequest::new(self.base("message"), session_id, handle_id),
            body,
            jsep,
        };
        self.client.request(&req).await
    }

    pub async fn keepalive(&self, session_id: u64) -> Result<()> {
        let req = SessionRequest::new(self.base("keepalive"), session_id);
        match self.client.request(&req).await? {
            Message::Ack(_) => Ok(()),
            other => Err(unexpected("ack", &other)),
        }
    }

    pub async fn detach(&self, session_id: u64, handle_id: u64) -> Result<()> {
        let req = HandleRequest::new(self.base("detach"), session_id, handle_id);
        expect_success(self.client.request(&req).await?, "detach")
    }

    pub async fn destroy_session(&self, session_id: u64) -> Result<()> {
        let req = SessionRequest::new(self.base("destroy"), session_id);
        expect_success(self.client.request(&req).await?, "destroy")
    }

    /// Events of one handle (or of the session itself with `None`).
    pub fn events(&self, session_id: u64, handle_id: Option<u64>) -> Result<EventStream> {
        self.client.subscribe(session_id, handle_id)
    }
}

fn new_id(msg: Message, action: &str) -> Result<u64> {
    match msg {
        Message::Success(s) => s.id().ok_or_else(|| JanusError::MalformedPayload {
            kind: action.to_string(),
            reason: "missing data.id".into(),
        }),
        other => Err(unexpected("success", &other)),
    }
}

fn expect_success(msg: Message, action: &str) -> Result<()> {
    match msg {
        Message::Success(_) => Ok(()),
        other => Err(unexpected(action, &other)),
    }
}
