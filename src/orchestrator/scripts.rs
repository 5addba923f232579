use anyhow::Result;

use crate::error::ReconcileError;
use crate::models::VrrpScript;
use crate::validate::{validate_name, validate_script};

use super::Orchestrator;

impl Orchestrator {
    /// Register a VRRP script on master, then slave. Identical existing files are kept.
    pub async fn add_script(&self, script: &VrrpScript) -> Result<()> {
        validate_script(script)?;
        let _guard = self.lock.lock().await;

        for side in self.sides() {
            if side.script_exists(&script.name).await? {
                if !side.script_matches(script).await? {
                    return Err(ReconcileError::drift(format!(
                        "vrrp_script already exist on {} with different config",
                        side.role()
                    ))
                    .into());
                }
                continue;
            }
            side.add_script(script).await?;
            side.reload_vrrp().await?;
            self.pacing.settle().await;
        }
        tracing::info!(script = %script.name, "add_vrrp_script done");
        Ok(())
    }

    pub async fn remove_script(&self, name: &str) -> Result<()> {
        validate_name("script name", name)?;
        let _guard = self.lock.lock().await;

        for side in self.sides() {
            if side.script_exists(name).await? {
                side.remove_script(name).await?;
            }
            side.reload_vrrp().await?;
            self.pacing.settle().await;
        }
        tracing::info!(script = %name, "remove_vrrp_script done");
        Ok(())
    }

    /// Overwrite the script on both nodes
    pub async fn change_script(&self, script: &VrrpScript) -> Result<()> {
        validate_script(script)?;
        let _guard = self.lock.lock().await;

        for side in self.sides() {
            side.add_script(script).await?;
            side.reload_vrrp().await?;
            self.pacing.settle().await;
        }
        tracing::info!(script = %script.name, "change_vrrp_script done");
        Ok(())
    }

    /// Read the master's script and require the slave to hold the same file.
    pub async fn check_script(&self, name: &str) -> Result<VrrpScript> {
        validate_name("script name", name)?;
        if !self.master.script_exists(name).await? {
            return Err(ReconcileError::NotFound(format!("vrrp script {}", name)).into());
        }
        let script = self.master.read_script(name).await?;

        if !self.slave.script_exists(name).await? {
            return Err(ReconcileError::drift("script exists on master but not find on slave").into());
        }
        if !self.slave.script_matches(&script).await? {
            return Err(ReconcileError::drift("script master/slave not same").into());
        }
        Ok(script)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::pair;
    use super::*;
    use crate::target::ConfigTarget;

    fn script() -> VrrpScript {
        VrrpScript {
            name: "chk_lvs".to_string(),
            script: "/usr/local/bin/check_lvs".to_string(),
            interval: 2,
            timeout: 1,
            fall: 2,
            rise: 2,
            weight: -10,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_add_and_check_script() {
        let p = pair();
        let s = script();
        p.orchestrator.add_script(&s).await.unwrap();
        assert_eq!(p.orchestrator.check_script("chk_lvs").await.unwrap(), s);
        assert!(p.master.runner.called("reload-keepalived"));
        assert!(p.slave.runner.called("reload-keepalived"));

        // same definition again is accepted without another write
        p.orchestrator.add_script(&s).await.unwrap();

        let mut other = s.clone();
        other.weight = 20;
        let err = p.orchestrator.add_script(&other).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "vrrp_script already exist on master with different config"
        );
    }

    #[tokio::test]
    async fn test_change_script_overwrites_both() {
        let p = pair();
        let s = script();
        p.orchestrator.add_script(&s).await.unwrap();

        let mut changed = s.clone();
        changed.weight_reverse = true;
        p.orchestrator.change_script(&changed).await.unwrap();
        assert_eq!(p.orchestrator.check_script("chk_lvs").await.unwrap(), changed);
    }

    #[tokio::test]
    async fn test_check_script_detects_slave_drift() {
        let p = pair();
        let s = script();
        p.orchestrator.add_script(&s).await.unwrap();

        let mut drifted = s.clone();
        drifted.rise = 5;
        p.slave.store.add_script(&drifted).await.unwrap();
        let err = p.orchestrator.check_script("chk_lvs").await.unwrap_err();
        assert_eq!(err.to_string(), "script master/slave not same");

        p.slave.store.remove_script("chk_lvs").await.unwrap();
        let err = p.orchestrator.check_script("chk_lvs").await.unwrap_err();
        assert_eq!(err.to_string(), "script exists on master but not find on slave");
    }

    #[tokio::test]
    async fn test_remove_script() {
        let p = pair();
        p.orchestrator.add_script(&script()).await.unwrap();
        p.orchestrator.remove_script("chk_lvs").await.unwrap();

        let err = p.orchestrator.check_script("chk_lvs").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::NotFound(_))
        ));
        assert!(!p.slave.store.script_exists("chk_lvs").await.unwrap());
    }

    #[tokio::test]
    async fn test_script_name_cannot_leave_keepalived_dir() {
        let p = pair();
        let keepalived = p.master.store.paths().keepalived_dir.clone();
        std::fs::create_dir_all(keepalived.join("script_x")).unwrap();
        let outside = keepalived.parent().unwrap().join("victim.conf");
        std::fs::write(&outside, "keep me").unwrap();

        for result in [
            p.orchestrator.remove_script("x/../../victim").await,
            p.orchestrator.check_script("x/../../victim").await.map(|_| ()),
        ] {
            let err = result.unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ReconcileError>(),
                Some(ReconcileError::Validation(_))
            ));
        }
        assert!(outside.exists());
        assert!(!p.master.runner.called("reload-keepalived"));
    }

    #[tokio::test]
    async fn test_invalid_script_is_rejected_before_any_write() {
        let p = pair();
        let mut s = script();
        s.timeout = 5;
        assert!(p.orchestrator.add_script(&s).await.is_err());
        assert!(!p.master.store.script_exists("chk_lvs").await.unwrap());
    }
}
