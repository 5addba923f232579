use anyhow::Result;

use crate::error::ReconcileError;
use crate::models::{InterfaceVrrpSpec, Projection, Role};
use crate::target::ConfigTarget;
use crate::validate::validate_spec;

use super::Orchestrator;

/// Result of comparing a spec against both nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Both nodes hold exactly this spec
    Converged(InterfaceVrrpSpec),
    /// The request with every disagreeing field masked (`"?"` or emptied)
    Partial(InterfaceVrrpSpec),
    /// The interface exists on neither node
    Absent,
}

/// Where a VRRP instance stands on one node before a change
enum VrrpState {
    Converged,
    /// Present with other content, in the named group
    Stale(String),
    Absent,
}

const UNKNOWN: &str = "?";

fn unknown_list() -> Vec<String> {
    vec![UNKNOWN.to_string()]
}

fn prepare(spec: &InterfaceVrrpSpec) -> Result<InterfaceVrrpSpec> {
    let mut spec = spec.clone();
    spec.normalize();
    validate_spec(&spec)?;
    Ok(spec)
}

impl Orchestrator {
    /// Add interface and VRRP configuration on both nodes.
    pub async fn add(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        let spec = prepare(spec)?;
        let _guard = self.lock.lock().await;
        self.check_track_scripts(&spec).await?;

        if !spec.ip_vip_only {
            self.add_interfaces(&spec).await?;
        } else {
            for side in self.sides() {
                if !side.iface_exists(&spec).await? {
                    return Err(ReconcileError::validation(format!(
                        "Iface {} does not exist on {}",
                        spec.iface,
                        side.role()
                    ))
                    .into());
                }
            }
        }

        if spec.has_vips() {
            // slave must already track the instance before the master claims priority
            self.ensure_vrrp(self.slave.as_ref(), &spec).await?;
            self.pacing.settle().await;
            self.ensure_vrrp(self.master.as_ref(), &spec).await?;
            self.pacing.settle().await;
        }
        tracing::info!(iface = %spec.iface, "add_iface_vrrp done");
        Ok(())
    }

    async fn add_interfaces(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        let mut present = [false; 2];
        for (i, side) in self.sides().into_iter().enumerate() {
            present[i] = side.iface_exists(spec).await?;
            if present[i] && !side.iface_matches(spec, Projection::Full).await? {
                return Err(ReconcileError::drift(format!(
                    "iface already exist on {} with different config or not up",
                    side.role()
                ))
                .into());
            }
        }

        let mut applied = Vec::new();
        for (i, side) in self.sides().into_iter().enumerate() {
            if !present[i] {
                tracing::info!(role = %side.role(), iface = %spec.iface, "Applying interface");
                side.apply_iface(spec).await?;
                applied.push(side);
            }
        }

        if spec.ip_master.is_empty() {
            return Ok(());
        }
        let Err(ping_err) = self.check_l2(spec).await else {
            return Ok(());
        };

        // undo only what this call created, slave first
        tracing::warn!(iface = %spec.iface, error = %ping_err, "L2 check failed, rolling back");
        let mut rollback_errors = Vec::new();
        for side in applied.into_iter().rev() {
            if let Err(e) = side.remove_iface(spec).await {
                rollback_errors.push(format!("{}: {}", side.role(), e));
            }
        }
        if rollback_errors.is_empty() {
            Err(ping_err)
        } else {
            Err(anyhow::anyhow!(
                "{}; rollback failed: {}",
                ping_err,
                rollback_errors.join("; ")
            ))
        }
    }

    /// Remove VRRP (slave, then master) and then the interfaces (slave, then master).
    pub async fn remove(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        let spec = prepare(spec)?;
        let _guard = self.lock.lock().await;

        if spec.has_vips() {
            self.drop_vrrp(self.slave.as_ref(), &spec).await?;
            self.pacing.settle().await;
            self.drop_vrrp(self.master.as_ref(), &spec).await?;
            self.pacing.settle().await;
        }

        if !spec.ip_vip_only {
            for side in [self.slave.as_ref(), self.master.as_ref()] {
                if side.iface_exists(&spec).await? {
                    tracing::info!(role = %side.role(), iface = %spec.iface, "Removing interface");
                    side.remove_iface(&spec).await?;
                }
            }
        }
        tracing::info!(iface = %spec.iface, "remove_iface_vrrp done");
        Ok(())
    }

    /// Compare the requested configuration with both nodes without changing anything.
    pub async fn check(&self, spec: &InterfaceVrrpSpec) -> Result<CheckOutcome> {
        let spec = prepare(spec)?;
        let mut view = spec.clone();
        let mut partial = false;

        if !spec.ip_vip_only {
            let mut any_present = false;
            for side in self.sides() {
                let role = side.role();
                if !side.iface_exists(&spec).await? {
                    partial = true;
                    mask_missing_iface(&mut view, role);
                    continue;
                }
                any_present = true;
                if side.iface_matches(&spec, Projection::Full).await? {
                    continue;
                }
                partial = true;
                if side.iface_matches(&spec, Projection::WithoutPostUp).await? {
                    view.post_up = unknown_list();
                } else {
                    mask_drifted_iface(&mut view, role);
                }
            }
            if !any_present {
                return Ok(CheckOutcome::Absent);
            }
        }

        if spec.has_vips() {
            for side in self.sides() {
                let exists = side.vrrp_exists(&spec).await?;
                if exists && side.vrrp_matches(&spec, Projection::Full).await? {
                    continue;
                }
                partial = true;
                mask_vrrp(&mut view, side.role(), exists);
            }
        }

        Ok(if partial {
            CheckOutcome::Partial(view)
        } else {
            CheckOutcome::Converged(view)
        })
    }

    /// Bring both nodes to the requested configuration: post-up only for interfaces, replace for VRRP.
    pub async fn change(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        let spec = prepare(spec)?;
        let _guard = self.lock.lock().await;
        self.check_track_scripts(&spec).await?;

        if !spec.ip_vip_only {
            for side in self.sides() {
                if !side.iface_exists(&spec).await? {
                    return Err(ReconcileError::validation(format!(
                        "Iface {} does not exist on {}",
                        spec.iface,
                        side.role()
                    ))
                    .into());
                }
            }
            for side in self.sides() {
                if side.iface_matches(&spec, Projection::Full).await? {
                    continue;
                }
                if !side.iface_matches(&spec, Projection::WithoutPostUp).await? {
                    return Err(ReconcileError::Unsupported(format!(
                        "[{}] Change IP_master, IP_slave, Mask, Default_GW, LACP_slaves_master, \
                         LACP_slaves_slave or Vlan_device isn't possible",
                        side.role().as_str().to_uppercase()
                    ))
                    .into());
                }
                tracing::info!(role = %side.role(), iface = %spec.iface, "Reconciling post-up");
                side.reconcile_post_up(&spec).await?;
            }
        }

        if spec.has_vips() {
            let master = vrrp_state(self.master.as_ref(), &spec).await?;
            let slave = vrrp_state(self.slave.as_ref(), &spec).await?;
            let mut pending = Vec::new();
            if !matches!(slave, VrrpState::Converged) {
                pending.push((self.slave.as_ref(), slave));
            }
            if !matches!(master, VrrpState::Converged) {
                pending.push((self.master.as_ref(), master));
            }
            for (side, state) in pending {
                if let VrrpState::Stale(group) = state {
                    side.remove_vrrp(&spec.with_vrrp_group(&group)).await?;
                }
                self.install_vrrp(side, &spec).await?;
                self.pacing.settle().await;
            }
        } else {
            for side in [self.slave.as_ref(), self.master.as_ref()] {
                if side.vrrp_exists(&spec).await? {
                    side.remove_vrrp(&spec).await?;
                    side.reconcile_sync_groups().await?;
                    self.pacing.settle().await;
                }
            }
        }
        tracing::info!(iface = %spec.iface, "change_iface_vrrp done");
        Ok(())
    }

    /// Renumber a VRRP instance from `old_id` to the requested `Id_vrrp`.
    ///
    /// The old instance must match the request on both nodes (the `interface`
    /// line aside), so only the id changes.
    pub async fn move_id(&self, spec: &InterfaceVrrpSpec, old_id: &str) -> Result<()> {
        let spec = prepare(spec)?;
        if !spec.has_vips() {
            return Err(ReconcileError::validation("IP_vip empty, no move needed").into());
        }
        let old = spec.with_vrrp_id(old_id);
        validate_spec(&old)?;

        let _guard = self.lock.lock().await;
        for side in self.sides() {
            let role = side.role();
            if !side.vrrp_exists(&old).await? {
                return Err(
                    ReconcileError::validation(format!("unknown old vrrp id on {}", role)).into(),
                );
            }
            if !side.vrrp_matches(&old, Projection::WithoutInterfaceLine).await? {
                return Err(ReconcileError::drift(format!(
                    "different vrrp on {} => you can't change Id_vrrp and others options at the same time",
                    role
                ))
                .into());
            }
        }

        let slave = self.slave.as_ref();
        let master = self.master.as_ref();

        slave.remove_vrrp(&old).await?;
        slave.reconcile_sync_groups().await?;
        self.pacing.settle().await;

        master.remove_vrrp(&old).await?;
        self.install_vrrp(master, &spec).await?;
        self.pacing.settle().await;

        self.install_vrrp(slave, &spec).await?;
        self.pacing.settle().await;

        tracing::info!(iface = %spec.iface, old_id, new_id = %spec.id_vrrp, "moveid_iface_vrrp done");
        Ok(())
    }
}

async fn vrrp_state(target: &dyn ConfigTarget, spec: &InterfaceVrrpSpec) -> Result<VrrpState> {
    if target.vrrp_exists(spec).await? {
        if target.vrrp_matches(spec, Projection::Full).await? {
            return Ok(VrrpState::Converged);
        }
        return Ok(VrrpState::Stale(spec.vrrp_group.clone()));
    }
    Ok(match target.vrrp_group_elsewhere(spec).await? {
        Some(group) => VrrpState::Stale(group),
        None => VrrpState::Absent,
    })
}

fn mask_missing_iface(view: &mut InterfaceVrrpSpec, role: Role) {
    match role {
        Role::Master => {
            view.ip_master = UNKNOWN.to_string();
            view.lacp_slaves_master.clear();
        }
        Role::Slave => {
            view.ip_slave = UNKNOWN.to_string();
            view.lacp_slaves_slave.clear();
        }
    }
}

fn mask_drifted_iface(view: &mut InterfaceVrrpSpec, role: Role) {
    mask_missing_iface(view, role);
    view.mask = UNKNOWN.to_string();
    view.post_up = unknown_list();
    view.default_gw.clear();
    view.vlan_device.clear();
}

fn mask_vrrp(view: &mut InterfaceVrrpSpec, role: Role, exists: bool) {
    view.ip_vip = unknown_list();
    view.auth_type.clear();
    view.auth_pass.clear();
    view.sync_iface.clear();
    view.garp_m_delay.clear();
    view.advert_int.clear();
    match role {
        Role::Master => {
            view.prio_master = UNKNOWN.to_string();
            if !exists {
                view.id_vrrp = UNKNOWN.to_string();
            }
        }
        Role::Slave => {
            view.prio_slave = UNKNOWN.to_string();
            view.id_vrrp = UNKNOWN.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::{pair, recorded_pair, spec, Journal, Node};
    use super::*;

    #[tokio::test]
    async fn test_add_converges_both_nodes() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let master_iface = p.master.read(p.master.store.paths().iface_file("eth0"));
        let slave_iface = p.slave.read(p.slave.store.paths().iface_file("eth0"));
        assert!(master_iface.contains("address 10.0.0.1/24"));
        assert!(slave_iface.contains("address 10.0.0.2/24"));

        for node in [&p.master, &p.slave] {
            let vrrp = node.read(node.store.paths().vrrp_file(&s));
            assert!(vrrp.contains("virtual_router_id 50"));
            assert!(vrrp.contains("10.0.0.10 dev eth0"));
            let sync = node.read(node.store.paths().group_dir("g1").join("vrrp_sync_group"));
            assert!(sync.contains("\t\tnetwork_eth0_id_50\n"));
        }
        assert!(p.master.runner.called("ping -c1 -t1 10.0.0.2"));

        assert_eq!(
            p.orchestrator.check(&s).await.unwrap(),
            CheckOutcome::Converged(s.clone())
        );
    }

    #[tokio::test]
    async fn test_add_twice_is_idempotent() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();
        let ifups = |n: &Node| {
            n.runner.calls().iter().filter(|c| c.starts_with("ifup")).count()
        };
        let before = (ifups(&p.master), ifups(&p.slave));

        p.orchestrator.add(&s).await.unwrap();
        assert_eq!((ifups(&p.master), ifups(&p.slave)), before);
        assert!(!p.master.runner.called("ifdown"));
        assert!(!p.slave.runner.called("ifdown"));
    }

    #[tokio::test]
    async fn test_add_rejects_drifted_interface() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let mut other = s.clone();
        other.mask = "16".to_string();
        other.ip_vip.clear();
        let err = p.orchestrator.add(&other).await.unwrap_err();
        match err.downcast_ref::<ReconcileError>() {
            Some(ReconcileError::Drift(msg)) => assert!(msg.contains("on master")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_rejects_drifted_vrrp_on_slave_first() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let mut other = s.clone();
        other.prio_slave = "90".to_string();
        let err = p.orchestrator.add(&other).await.unwrap_err();
        assert_eq!(err.to_string(), "vrrp already exist on slave with different config");
    }

    #[tokio::test]
    async fn test_add_rolls_back_when_slave_unreachable() {
        let p = pair();
        p.master.runner.fail("ping -c1 -t1 10.0.0.2", "");
        let s = spec();

        let err = p.orchestrator.add(&s).await.unwrap_err();
        assert!(err.to_string().contains("master don't ping slave 10.0.0.2"));
        assert!(!p.master.store.paths().iface_file("eth0").exists());
        assert!(!p.slave.store.paths().iface_file("eth0").exists());
        assert!(p.slave.runner.called("ifdown eth0 --force"));
        assert!(!p.master.store.paths().vrrp_file(&s).exists());
    }

    #[tokio::test]
    async fn test_add_vip_only_requires_interfaces() {
        let p = pair();
        let mut s = spec();
        s.ip_vip_only = true;
        let err = p.orchestrator.add(&s).await.unwrap_err();
        assert_eq!(err.to_string(), "Iface eth0 does not exist on master");
    }

    #[tokio::test]
    async fn test_add_unknown_track_script() {
        let p = pair();
        let mut s = spec();
        s.track_script = vec!["chk_missing".to_string()];
        let err = p.orchestrator.add(&s).await.unwrap_err();
        assert_eq!(err.to_string(), "unknown Track_script chk_missing");
        assert!(p.master.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_add_vmac_reloads_twice() {
        let p = pair();
        let mut s = spec();
        s.use_vmac = true;
        p.orchestrator.add(&s).await.unwrap();
        let reloads = p
            .slave
            .runner
            .calls()
            .iter()
            .filter(|c| *c == "reload-keepalived")
            .count();
        assert_eq!(reloads, 2);
    }

    #[tokio::test]
    async fn test_master_reloads_twice_without_vmac() {
        let p = pair();
        p.orchestrator.add(&spec()).await.unwrap();
        let reloads = |node: &Node| {
            node.runner
                .calls()
                .iter()
                .filter(|c| *c == "reload-keepalived")
                .count()
        };
        assert_eq!(reloads(&p.master), 2);
        assert_eq!(reloads(&p.slave), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_long_vmac_iface_before_touching_nodes() {
        let p = pair();
        let mut s = spec();
        s.iface = "eth1234567".to_string();
        s.use_vmac = true;

        let err = p.orchestrator.add(&s).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::Validation(_))
        ));
        assert_eq!(err.to_string(), "interface eth1234567 too long");
        for node in [&p.master, &p.slave] {
            assert!(node.runner.calls().is_empty());
            assert!(!node.store.paths().iface_file("eth1234567").exists());
            assert!(!node.store.paths().group_dir("g1").exists());
        }
    }

    fn take(journal: &Journal) -> Vec<String> {
        std::mem::take(&mut *journal.lock().unwrap())
    }

    #[tokio::test]
    async fn test_add_and_remove_order_slave_before_master() {
        let (p, journal) = recorded_pair();
        let s = spec();

        p.orchestrator.add(&s).await.unwrap();
        assert_eq!(
            take(&journal),
            [
                "master apply_iface",
                "slave apply_iface",
                "slave add_vrrp",
                "slave reconcile_sync_groups",
                "master add_vrrp",
                "master reconcile_sync_groups",
                "master reload_vrrp",
            ]
        );

        p.orchestrator.remove(&s).await.unwrap();
        assert_eq!(
            take(&journal),
            [
                "slave remove_vrrp",
                "slave reconcile_sync_groups",
                "master remove_vrrp",
                "master reconcile_sync_groups",
                "slave remove_iface",
                "master remove_iface",
            ]
        );
    }

    #[tokio::test]
    async fn test_move_id_order() {
        let (p, journal) = recorded_pair();
        p.orchestrator.add(&spec()).await.unwrap();
        take(&journal);

        let mut s = spec();
        s.id_vrrp = "51".to_string();
        p.orchestrator.move_id(&s, "50").await.unwrap();
        assert_eq!(
            take(&journal),
            [
                "slave remove_vrrp",
                "slave reconcile_sync_groups",
                "master remove_vrrp",
                "master add_vrrp",
                "master reconcile_sync_groups",
                "master reload_vrrp",
                "slave add_vrrp",
                "slave reconcile_sync_groups",
            ]
        );
    }

    #[tokio::test]
    async fn test_remove_tears_down_everything() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();
        p.orchestrator.remove(&s).await.unwrap();

        for node in [&p.master, &p.slave] {
            assert!(!node.store.paths().iface_file("eth0").exists());
            assert!(!node.store.paths().group_dir("g1").exists());
            assert!(node.runner.called("ifdown eth0 --force"));
        }
        assert_eq!(p.orchestrator.check(&s).await.unwrap(), CheckOutcome::Absent);
    }

    #[tokio::test]
    async fn test_remove_blocked_by_other_group_leaves_files() {
        let p = pair();
        let mut s = spec();
        s.ip_vip.clear();
        p.orchestrator.add(&s).await.unwrap();

        // a VIP-only instance of another group still binds to eth0 on the slave
        let mut alias = spec();
        alias.iface = "eth0:1".to_string();
        alias.vrrp_group = "g2".to_string();
        alias.id_vrrp = "60".to_string();
        alias.ip_vip = vec!["10.0.0.20".to_string()];
        p.slave.store.add_vrrp(&alias).await.unwrap();

        let err = p.orchestrator.remove(&s).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::DependencyConflict(_))
        ));
        assert!(p.slave.store.paths().iface_file("eth0").exists());
        assert!(p.master.store.paths().iface_file("eth0").exists());
        assert!(p.slave.store.paths().vrrp_file(&alias).exists());
        assert!(!p.slave.runner.called("ifdown"));
        assert!(!p.master.runner.called("ifdown"));
    }

    #[tokio::test]
    async fn test_check_masks_disagreements() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        // slave lost its VRRP instance
        p.slave.store.remove_vrrp(&s).await.unwrap();
        match p.orchestrator.check(&s).await.unwrap() {
            CheckOutcome::Partial(view) => {
                assert_eq!(view.prio_slave, "?");
                assert_eq!(view.id_vrrp, "?");
                assert_eq!(view.ip_vip, vec!["?"]);
                assert_eq!(view.prio_master, "150");
                assert_eq!(view.ip_master, "10.0.0.1");
            }
            other => panic!("unexpected {:?}", other),
        }

        // master interface only differs by post-up
        let mut with_post = s.clone();
        with_post.post_up = vec!["ip route add 10.9.0.0/16 via 10.0.0.254".to_string()];
        p.slave.store.add_vrrp(&s).await.unwrap();
        match p.orchestrator.check(&with_post).await.unwrap() {
            CheckOutcome::Partial(view) => {
                assert_eq!(view.post_up, vec!["?"]);
                assert_eq!(view.mask, "24");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_check_missing_master_interface() {
        let p = pair();
        let mut s = spec();
        s.ip_vip.clear();
        p.slave.store.apply_iface(&s).await.unwrap();
        match p.orchestrator.check(&s).await.unwrap() {
            CheckOutcome::Partial(view) => {
                assert_eq!(view.ip_master, "?");
                assert_eq!(view.ip_slave, "10.0.0.2");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_change_post_up_only() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let mut changed = s.clone();
        changed.post_up = vec!["ip route add 10.9.0.0/16 via 10.0.0.254".to_string()];
        p.orchestrator.change(&changed).await.unwrap();

        for node in [&p.master, &p.slave] {
            assert!(node.runner.called("ip route add 10.9.0.0/16 via 10.0.0.254"));
            let iface = node.read(node.store.paths().iface_file("eth0"));
            assert!(iface.ends_with("\tpost-up ip route add 10.9.0.0/16 via 10.0.0.254\n"));
        }
        assert_eq!(
            p.orchestrator.check(&changed).await.unwrap(),
            CheckOutcome::Converged(changed.clone())
        );
    }

    #[tokio::test]
    async fn test_change_rejects_address_change() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let mut changed = s.clone();
        changed.ip_master = "10.0.0.3".to_string();
        let err = p.orchestrator.change(&changed).await.unwrap_err();
        match err.downcast_ref::<ReconcileError>() {
            Some(ReconcileError::Unsupported(msg)) => assert!(msg.starts_with("[MASTER] Change")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_change_moves_vrrp_group() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let moved = s.with_vrrp_group("g2");
        p.orchestrator.change(&moved).await.unwrap();

        for node in [&p.master, &p.slave] {
            assert!(!node.store.paths().group_dir("g1").exists());
            let sync = node.read(node.store.paths().group_dir("g2").join("vrrp_sync_group"));
            assert!(sync.starts_with("vrrp_sync_group g2 {"));
        }
        assert_eq!(
            p.orchestrator.check(&moved).await.unwrap(),
            CheckOutcome::Converged(moved.clone())
        );
    }

    #[tokio::test]
    async fn test_change_rewrites_stale_priority() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let mut changed = s.clone();
        changed.prio_master = "200".to_string();
        p.orchestrator.change(&changed).await.unwrap();
        let vrrp = p.master.read(p.master.store.paths().vrrp_file(&changed));
        assert!(vrrp.contains("\tpriority 200\n"));
        let slave_vrrp = p.slave.read(p.slave.store.paths().vrrp_file(&changed));
        assert!(slave_vrrp.contains("\tpriority 100\n"));
    }

    #[tokio::test]
    async fn test_change_without_vips_drops_vrrp() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let mut changed = s.clone();
        changed.ip_vip.clear();
        p.orchestrator.change(&changed).await.unwrap();
        for node in [&p.master, &p.slave] {
            assert!(!node.store.paths().vrrp_file(&s).exists());
            assert!(node.store.paths().iface_file("eth0").exists());
        }
    }

    #[tokio::test]
    async fn test_move_id() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let renumbered = s.with_vrrp_id("51");
        p.orchestrator.move_id(&renumbered, "50").await.unwrap();

        for node in [&p.master, &p.slave] {
            assert!(!node.store.paths().vrrp_file(&s).exists());
            let vrrp = node.read(node.store.paths().vrrp_file(&renumbered));
            assert!(vrrp.contains("virtual_router_id 51"));
            let sync = node.read(node.store.paths().group_dir("g1").join("vrrp_sync_group"));
            assert!(sync.contains("network_eth0_id_51"));
            assert!(!sync.contains("network_eth0_id_50"));
        }
    }

    #[tokio::test]
    async fn test_move_id_refuses_other_changes() {
        let p = pair();
        let s = spec();
        p.orchestrator.add(&s).await.unwrap();

        let mut renumbered = s.with_vrrp_id("51");
        renumbered.prio_master = "200".to_string();
        let err = p.orchestrator.move_id(&renumbered, "50").await.unwrap_err();
        assert!(err.to_string().starts_with("different vrrp on master"));

        let err = p
            .orchestrator
            .move_id(&s.with_vrrp_id("52"), "49")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "unknown old vrrp id on master");

        let mut no_vips = s.clone();
        no_vips.ip_vip.clear();
        let err = p.orchestrator.move_id(&no_vips, "50").await.unwrap_err();
        assert_eq!(err.to_string(), "IP_vip empty, no move needed");
    }
}
