//! One node of the pair as seen by the orchestrator.
//!
//! [`LocalStateStore`] works on this host's files and processes,
//! [`RemoteStateStore`] asks the peer to do the same over HTTP. The
//! orchestrator only ever talks to `dyn ConfigTarget`.

pub mod local;
pub mod remote;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{InterfaceVrrpSpec, Projection, Role, VrrpScript};

pub use local::{LocalStateStore, StatePaths};
pub use remote::RemoteStateStore;

#[async_trait]
pub trait ConfigTarget: Send + Sync {
    /// Role the files are rendered for on this node
    fn role(&self) -> Role;

    // Interface file

    async fn iface_exists(&self, spec: &InterfaceVrrpSpec) -> Result<bool>;
    /// Byte-exact comparison; `Projection::Full` also requires the interface to be up
    async fn iface_matches(&self, spec: &InterfaceVrrpSpec, projection: Projection) -> Result<bool>;
    /// Write the file, `ifup`, verify with `ifquery --state`
    async fn apply_iface(&self, spec: &InterfaceVrrpSpec) -> Result<()>;
    /// Write the file only
    async fn apply_iface_file(&self, spec: &InterfaceVrrpSpec) -> Result<()>;
    /// Dependency scan, reverse post-up, `ifdown --force`, delete the file
    async fn remove_iface(&self, spec: &InterfaceVrrpSpec) -> Result<()>;
    async fn remove_iface_file(&self, spec: &InterfaceVrrpSpec) -> Result<()>;
    /// Run added post-up commands, reverse removed ones, rewrite the file
    async fn reconcile_post_up(&self, spec: &InterfaceVrrpSpec) -> Result<()>;

    // VRRP instance

    async fn vrrp_exists(&self, spec: &InterfaceVrrpSpec) -> Result<bool>;
    /// A group other than the requested one that holds `<iface>_<id>.conf`
    async fn vrrp_group_elsewhere(&self, spec: &InterfaceVrrpSpec) -> Result<Option<String>>;
    async fn vrrp_matches(&self, spec: &InterfaceVrrpSpec, projection: Projection) -> Result<bool>;
    async fn add_vrrp(&self, spec: &InterfaceVrrpSpec) -> Result<()>;
    async fn remove_vrrp(&self, spec: &InterfaceVrrpSpec) -> Result<()>;
    /// Regenerate every sync group file from the instance files, then reload
    async fn reconcile_sync_groups(&self) -> Result<()>;
    async fn reload_vrrp(&self) -> Result<()>;

    // VRRP script

    async fn script_exists(&self, name: &str) -> Result<bool>;
    async fn script_matches(&self, script: &VrrpScript) -> Result<bool>;
    async fn read_script(&self, name: &str) -> Result<VrrpScript>;
    async fn add_script(&self, script: &VrrpScript) -> Result<()>;
    async fn remove_script(&self, name: &str) -> Result<()>;
}
