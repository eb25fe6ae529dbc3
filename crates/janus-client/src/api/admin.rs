//! Admin/monitor API.

use serde_json::{Map, Value};

use janus_core::error::Result;
use janus_core::plugins::PluginRequest;
use janus_core::protocol::admin::{HandleInfoResponse, ListTokensResponse};
use janus_core::protocol::{Message, PluginPayload};
use janus_core::request::{
    ApiRequest, BaseRequest, HandleRequest, MessagePluginRequest, Secret, SessionRequest,
    TokenRequest,
};

use super::unexpected;
use crate::config::AdminSection;
use crate::GatewayClient;

#[derive(Clone)]
pub struct AdminApi {
    client: GatewayClient,
    secret: Option<String>,
    endpoint: String,
}

impl AdminApi {
    pub fn new(client: GatewayClient, cfg: &AdminSection) -> Self {
        Self {
            client,
            secret: cfg.secret.clone(),
            endpoint: cfg.endpoint.clone().unwrap_or_default(),
        }
    }

    pub fn client(&self) -> &GatewayClient {
        &self.client
    }

    fn base(&self, action: &str) -> BaseRequest {
        BaseRequest::new(action, self.secret.clone().map(Secret::Admin))
    }

    fn token(&self, action: &str, token: &str, plugins: &[&str]) -> TokenRequest {
        TokenRequest {
            base: self.base(action),
            token: token.to_string(),
            plugins: plugins.iter().map(|p| p.to_string()).collect(),
        }
    }

    async fn call(&self, req: &dyn ApiRequest) -> Result<Message> {
        let timeout = self.client.options().request_timeout;
        let decoded = self.client.request_at(req, &self.endpoint, timeout).await?;
        let message = decoded.message.into_result();
        self.client.check_remote(message)
    }

    /// Generic admin success: the `data` map, if any.
    async fn call_data(&self, req: &dyn ApiRequest) -> Result<Option<Map<String, Value>>> {
        match self.call(req).await? {
            Message::Success(s) => Ok(s.data),
            other => Err(unexpected("success", &other)),
        }
    }

    pub async fn add_token(
        &self,
        token: &str,
        plugins: &[&str],
    ) -> Result<Option<Map<String, Value>>> {
        self.call_data(&self.token("add_token", token, plugins)).await
    }

    pub async fn allow_token(
        &self,
        token: &str,
        plugins: &[&str],
    ) -> Result<Option<Map<String, Value>>> {
        self.call_data(&self.token("allow_token", token, plugins)).await
    }

    pub async fn disallow_token(
        &self,
        token: &str,
        plugins: &[&str],
    ) -> Result<Option<Map<String, Value>>> {
        self.call_data(&self.token("disallow_token", token, plugins)).await
    }

    pub async fn remove_token(&self, token: &str) -> Result<()> {
        self.call_data(&self.token("remove_token", token, &[])).await?;
        Ok(())
    }

    pub async fn list_tokens(&self) -> Result<ListTokensResponse> {
        match self.call(&self.base("list_tokens")).await? {
            Message::ListTokens(l) => Ok(l),
            other => Err(unexpected("list_tokens", &other)),
        }
    }

    pub async fn list_sessions(&self) -> Result<Vec<u64>> {
        match self.call(&self.base("list_sessions")).await? {
            Message::ListSessions(l) => Ok(l.sessions),
            other => Err(unexpected("list_sessions", &other)),
        }
    }

    /// Send a plugin request; the answer is typed when the (plugin, action)
    /// pair is registered and generic otherwise. Plugin error payloads come
    /// back as `JanusError::PluginRemote`.
    pub async fn message_plugin<P: PluginRequest>(&self, request: P) -> Result<PluginPayload> {
        let req = MessagePluginRequest {
            base: self.base("message_plugin"),
            request,
        };
        match self.call(&req).await? {
            Message::MessagePlugin(m) => Ok(m.response),
            other => Err(unexpected("message_plugin", &other)),
        }
    }

    pub async fn list_handles(&self, session_id: u64) -> Result<Vec<u64>> {
        let req = SessionRequest::new(self.base("list_handles"), session_id);
        match self.call(&req).await? {
            Message::ListHandles(l) => Ok(l.handles),
            other => Err(unexpected("list_handles", &other)),
        }
    }

    pub async fn handle_info(&self, session_id: u64, handle_id: u64) -> Result<HandleInfoResponse> {
        let req = HandleRequest::new(self.base("handle_info"), session_id, handle_id);
        match self.call(&req).await? {
            Message::HandleInfo(h) => Ok(h),
            other => Err(unexpected("handle_info", &other)),
        }
    }
}
