//! Ordered master/slave sequences behind one lock.
//!
//! Every mutating operation holds `lock` from its first check to its last
//! wait, so two sequences never interleave. Read-only checks skip the lock.

mod iface_vrrp;
mod scripts;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::Mutex;

use crate::converge::{self, Pacing};
use crate::error::ReconcileError;
use crate::exec::CommandRunner;
use crate::models::{InterfaceVrrpSpec, Projection, Role};
use crate::target::ConfigTarget;

pub use iface_vrrp::CheckOutcome;

pub struct Orchestrator {
    master: Arc<dyn ConfigTarget>,
    slave: Arc<dyn ConfigTarget>,
    /// Runs the L2 connectivity check from the master
    runner: Arc<dyn CommandRunner>,
    pacing: Pacing,
    lock: Mutex<()>,
}

impl Orchestrator {
    pub fn new(
        master: Arc<dyn ConfigTarget>,
        slave: Arc<dyn ConfigTarget>,
        runner: Arc<dyn CommandRunner>,
        pacing: Pacing,
    ) -> Self {
        Self {
            master,
            slave,
            runner,
            pacing,
            lock: Mutex::new(()),
        }
    }

    fn sides(&self) -> [&dyn ConfigTarget; 2] {
        [self.master.as_ref(), self.slave.as_ref()]
    }

    /// Every `Track_script` entry must be a script registered on the master
    async fn check_track_scripts(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        for name in &spec.track_script {
            if !self.master.script_exists(name).await? {
                return Err(ReconcileError::validation(format!("unknown Track_script {}", name)).into());
            }
        }
        Ok(())
    }

    /// Master pings the slave address on the new interface
    async fn check_l2(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        let ip = spec.ip_slave.as_str();
        let program = if ip.contains(':') { "ping6" } else { "ping" };
        let runner = self.runner.clone();

        converge::poll_until(self.pacing.ping_attempts, self.pacing.ping_interval, || {
            let runner = runner.clone();
            async move {
                let output = runner.run(program, &["-c1", "-t1", ip]).await?;
                if output.success {
                    Ok(())
                } else {
                    Err(ReconcileError::command(
                        format!("{} -c1 -t1 {}", program, ip),
                        format!("master don't ping slave {}", ip),
                    )
                    .into())
                }
            }
        })
        .await
    }

    /// Write the instance, regenerate sync groups (which reloads), then reload
    /// once more so the new instance comes up. The master always takes the
    /// second reload. The slave only needs it once a vmac device exists.
    async fn install_vrrp(&self, target: &dyn ConfigTarget, spec: &InterfaceVrrpSpec) -> Result<()> {
        tracing::info!(role = %target.role(), instance = %spec.instance_name(), "Installing VRRP instance");
        target.add_vrrp(spec).await?;
        target.reconcile_sync_groups().await?;
        if spec.use_vmac || target.role() == Role::Master {
            tokio::time::sleep(self.pacing.vmac_reload_delay).await;
            target.reload_vrrp().await?;
        }
        Ok(())
    }

    /// Install when absent, accept when identical, refuse when different
    async fn ensure_vrrp(&self, target: &dyn ConfigTarget, spec: &InterfaceVrrpSpec) -> Result<()> {
        if target.vrrp_exists(spec).await? {
            if !target.vrrp_matches(spec, Projection::Full).await? {
                return Err(ReconcileError::drift(format!(
                    "vrrp already exist on {} with different config",
                    target.role()
                ))
                .into());
            }
            return target.reconcile_sync_groups().await;
        }
        self.install_vrrp(target, spec).await
    }

    /// Remove the instance if present, then always regenerate sync groups
    async fn drop_vrrp(&self, target: &dyn ConfigTarget, spec: &InterfaceVrrpSpec) -> Result<()> {
        if target.vrrp_exists(spec).await? {
            tracing::info!(role = %target.role(), instance = %spec.instance_name(), "Removing VRRP instance");
            target.remove_vrrp(spec).await?;
        }
        target.reconcile_sync_groups().await
    }
}
