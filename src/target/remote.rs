use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use std::time::Duration;

use crate::error::ReconcileError;
use crate::models::{InterfaceVrrpSpec, Projection, Role, VrrpScript};

use super::ConfigTarget;

/// RemoteStateStore drives the slave through its HTTP endpoints
pub struct RemoteStateStore {
    base_url: String,
    client: Client,
}

impl RemoteStateStore {
    /// `peer_addr` is `host:port`. With `https` the peer certificate is not verified.
    pub fn new(peer_addr: &str, https: bool, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .danger_accept_invalid_certs(https)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        let scheme = if https { "https" } else { "http" };
        Ok(Self {
            base_url: format!("{}://{}", scheme, peer_addr.trim_end_matches('/')),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> RequestBuilder {
        self.client.post(self.url(path)).json(body)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| ReconcileError::Transport(e.to_string()).into())
    }

    /// 200 is true, 404 is false, anything else is a slave failure
    async fn query(request: RequestBuilder) -> Result<bool> {
        let resp = Self::send(request).await?;
        match resp.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(peer_error(resp).await),
        }
    }

    async fn command(request: RequestBuilder) -> Result<()> {
        let resp = Self::send(request).await?;
        if resp.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(peer_error(resp).await)
        }
    }

    fn iface_path(endpoint: &str, spec: &InterfaceVrrpSpec) -> String {
        format!("/{}/{}/", endpoint, spec.iface)
    }

    fn script_path(endpoint: &str, name: &str) -> String {
        format!("/{}/{}/", endpoint, name)
    }
}

/// Turn a failed slave response into a typed error, keeping the slave's message
async fn peer_error(resp: Response) -> anyhow::Error {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string());

    tracing::warn!(status = status.as_u16(), message = %message, "Slave reported an error");
    match status {
        StatusCode::CONFLICT => ReconcileError::DependencyConflict(message).into(),
        _ => ReconcileError::Peer {
            status: status.as_u16(),
            message,
        }
        .into(),
    }
}

#[async_trait]
impl ConfigTarget for RemoteStateStore {
    fn role(&self) -> Role {
        Role::Slave
    }

    async fn iface_exists(&self, spec: &InterfaceVrrpSpec) -> Result<bool> {
        Self::query(self.post(&Self::iface_path("check_iface_exists", spec), spec)).await
    }

    async fn iface_matches(&self, spec: &InterfaceVrrpSpec, projection: Projection) -> Result<bool> {
        let endpoint = match projection {
            Projection::WithoutPostUp => "check_iface_without_postup",
            _ => "check_iface_ok",
        };
        Self::query(self.post(&Self::iface_path(endpoint, spec), spec)).await
    }

    async fn apply_iface(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::command(self.post(&Self::iface_path("add_iface", spec), spec)).await
    }

    async fn apply_iface_file(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::command(self.post(&Self::iface_path("add_iface_file", spec), spec)).await
    }

    async fn remove_iface(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::command(self.post(&Self::iface_path("remove_iface", spec), spec)).await
    }

    async fn remove_iface_file(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::command(self.post(&Self::iface_path("remove_iface_file", spec), spec)).await
    }

    async fn reconcile_post_up(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::command(self.post(&Self::iface_path("change_iface_postup", spec), spec)).await
    }

    async fn vrrp_exists(&self, spec: &InterfaceVrrpSpec) -> Result<bool> {
        Self::query(self.post(&Self::iface_path("check_vrrp_exists", spec), spec)).await
    }

    async fn vrrp_group_elsewhere(&self, spec: &InterfaceVrrpSpec) -> Result<Option<String>> {
        let request = self.post(&Self::iface_path("check_vrrp_exists_otherVG", spec), spec);
        let resp = Self::send(request).await?;
        match resp.status() {
            StatusCode::OK => {
                let group = resp
                    .text()
                    .await
                    .map_err(|e| ReconcileError::Transport(e.to_string()))?;
                Ok(Some(group.trim().to_string()))
            }
            StatusCode::NOT_FOUND => Ok(None),
            _ => Err(peer_error(resp).await),
        }
    }

    async fn vrrp_matches(&self, spec: &InterfaceVrrpSpec, projection: Projection) -> Result<bool> {
        let endpoint = match projection {
            Projection::WithoutInterfaceLine => "check_vrrp_without_sync",
            _ => "check_vrrp_ok",
        };
        Self::query(self.post(&Self::iface_path(endpoint, spec), spec)).await
    }

    async fn add_vrrp(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::command(self.post(&Self::iface_path("add_vrrp", spec), spec)).await
    }

    async fn remove_vrrp(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::command(self.post(&Self::iface_path("remove_vrrp", spec), spec)).await
    }

    async fn reconcile_sync_groups(&self) -> Result<()> {
        Self::command(self.get("/sync_group_reload_vrrp/")).await
    }

    async fn reload_vrrp(&self) -> Result<()> {
        Self::command(self.get("/reload_vrrp/")).await
    }

    async fn script_exists(&self, name: &str) -> Result<bool> {
        let path = Self::script_path("check_vrrp_script_exists", name);
        Self::query(self.post(&path, &VrrpScript::named(name))).await
    }

    async fn script_matches(&self, script: &VrrpScript) -> Result<bool> {
        let path = Self::script_path("check_vrrp_script_ok", &script.name);
        Self::query(self.post(&path, script)).await
    }

    async fn read_script(&self, name: &str) -> Result<VrrpScript> {
        let resp = Self::send(self.get(&Self::script_path("read_vrrp_script", name))).await?;
        match resp.status() {
            StatusCode::OK => Ok(resp
                .json()
                .await
                .map_err(|e| ReconcileError::Transport(e.to_string()))?),
            StatusCode::NOT_FOUND => {
                Err(ReconcileError::NotFound(format!("vrrp script {} on slave", name)).into())
            }
            _ => Err(peer_error(resp).await),
        }
    }

    async fn add_script(&self, script: &VrrpScript) -> Result<()> {
        let path = Self::script_path("add_vrrp_script", &script.name);
        Self::command(self.post(&path, script)).await
    }

    async fn remove_script(&self, name: &str) -> Result<()> {
        let path = Self::script_path("remove_vrrp_script", name);
        Self::command(self.post(&path, &VrrpScript::named(name))).await
    }
}
