use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::error::ReconcileError;
use crate::exec::{self, CommandRunner};
use crate::models::{InterfaceVrrpSpec, Projection, Role, VrrpScript};
use crate::render;

use super::ConfigTarget;

/// Name of the generated sync group file inside each group directory
pub const SYNC_GROUP_FILE: &str = "vrrp_sync_group";

/// Where the managed files live on this node
#[derive(Debug, Clone)]
pub struct StatePaths {
    pub interfaces_dir: PathBuf,
    pub keepalived_dir: PathBuf,
}

impl StatePaths {
    pub fn iface_file(&self, iface: &str) -> PathBuf {
        self.interfaces_dir.join(iface)
    }

    pub fn group_dir(&self, group: &str) -> PathBuf {
        self.keepalived_dir.join(group)
    }

    pub fn vrrp_file(&self, spec: &InterfaceVrrpSpec) -> PathBuf {
        self.group_dir(&spec.vrrp_group).join(spec.vrrp_file_name())
    }

    pub fn script_file(&self, name: &str) -> PathBuf {
        self.keepalived_dir.join(format!("script_{}.conf", name))
    }
}

/// LocalStateStore applies configuration to this host
pub struct LocalStateStore {
    role: Role,
    paths: StatePaths,
    runner: Arc<dyn CommandRunner>,
    reload_cmd: String,
}

impl LocalStateStore {
    pub fn new(
        role: Role,
        paths: StatePaths,
        runner: Arc<dyn CommandRunner>,
        reload_cmd: impl Into<String>,
    ) -> Self {
        Self {
            role,
            paths,
            runner,
            reload_cmd: reload_cmd.into(),
        }
    }

    pub fn paths(&self) -> &StatePaths {
        &self.paths
    }

    fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    async fn is_up(&self, iface: &str) -> Result<bool> {
        let output = self.runner().run("ifquery", &[iface, "--state"]).await?;
        if !output.success {
            tracing::debug!(iface, "ifquery --state failed");
        }
        Ok(output.success)
    }

    /// Refuse to install a gateway when another default route is already present
    async fn check_default_route(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        if spec.default_gw.is_empty() {
            return Ok(());
        }
        let family = if spec.role_ip(self.role).contains(':') {
            "-6"
        } else {
            "-4"
        };
        let routes = exec::run_checked(self.runner(), "ip", &[family, "route"]).await?;
        if routes.stdout.contains("default")
            && !routes.stdout.contains(&format!("default via {}", spec.default_gw))
        {
            return Err(ReconcileError::drift("default gateway already exist").into());
        }
        Ok(())
    }

    async fn write_iface_file(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        let path = self.paths.iface_file(&spec.iface);
        let content = render::render_interface(spec, self.role, Projection::Full);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("write {}", path.display()))
    }

    /// Live `post-up` commands of an interface file, without the bond hash policy line
    async fn live_post_up(&self, spec: &InterfaceVrrpSpec) -> Result<Vec<String>> {
        let path = self.paths.iface_file(&spec.iface);
        let content = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("read {}", path.display()))?;
        let xmit = render::xmit_hash_policy_command(&spec.iface);
        Ok(content
            .lines()
            .filter_map(|line| line.strip_prefix("\tpost-up "))
            .filter(|cmd| *cmd != xmit)
            .map(str::to_string)
            .collect())
    }

    async fn reverse(&self, cmd: &str) -> Result<()> {
        match exec::reverse_post_up(cmd) {
            Some(undo) => {
                tracing::info!(role = %self.role, command = %undo, "Reversing post-up");
                exec::run_line(self.runner(), &undo).await?;
            }
            None => tracing::debug!(command = %cmd, "Post-up not reversible, left in place"),
        }
        Ok(())
    }

    /// Fails with `DependencyConflict` when any VRRP instance binds VIPs to this interface
    async fn check_not_referenced(&self, iface: &str) -> Result<()> {
        let needles = [
            format!(" dev {}\n", iface),
            format!(" dev vmac_{}_", iface),
            format!(" dev vc_{}_", iface),
        ];
        for group in group_dirs(&self.paths.keepalived_dir).await? {
            for file in conf_files(&group).await? {
                let content = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("read file {} error", file.display()))?;
                if needles.iter().any(|needle| content.contains(needle.as_str())) {
                    return Err(ReconcileError::DependencyConflict(format!(
                        "iface {} used for an other vrrp",
                        iface
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    async fn read_optional(path: &Path) -> Result<Option<String>> {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("read {}", path.display())),
        }
    }

    async fn remove_optional(path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove {}", path.display())),
        }
    }
}

fn log_mismatch(what: &str, expected: &str, actual: &str) {
    tracing::debug!(what, expected = ?expected, actual = ?actual, "Rendered file differs from disk");
}

/// Drop every line starting with `prefix` (tab included)
fn strip_lines(content: &str, prefix: &str) -> String {
    content
        .split_inclusive('\n')
        .filter(|line| !line.starts_with(prefix))
        .collect()
}

/// Group directories under the keepalived root, sorted. A missing root has none.
async fn group_dirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e).with_context(|| format!("readdir {} error", root.display())),
    };
    let mut dirs = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// `*.conf` files of a group directory, sorted
async fn conf_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("readdir {} error", dir.display()))?;
    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file()
            && path.extension().map_or(false, |ext| ext == "conf")
        {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

#[async_trait]
impl ConfigTarget for LocalStateStore {
    fn role(&self) -> Role {
        self.role
    }

    async fn iface_exists(&self, spec: &InterfaceVrrpSpec) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.paths.iface_file(&spec.iface)).await?)
    }

    async fn iface_matches(&self, spec: &InterfaceVrrpSpec, projection: Projection) -> Result<bool> {
        let Some(actual) = Self::read_optional(&self.paths.iface_file(&spec.iface)).await? else {
            return Ok(false);
        };
        match projection {
            Projection::WithoutPostUp => {
                let expected = render::render_interface(spec, self.role, projection);
                let actual = strip_lines(&actual, "\tpost-up");
                if expected != actual {
                    log_mismatch("interface", &expected, &actual);
                    return Ok(false);
                }
                Ok(true)
            }
            _ => {
                let expected = render::render_interface(spec, self.role, Projection::Full);
                if expected != actual {
                    log_mismatch("interface", &expected, &actual);
                    return Ok(false);
                }
                self.is_up(&spec.iface).await
            }
        }
    }

    async fn apply_iface(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        self.apply_iface_file(spec).await?;
        exec::run_checked(self.runner(), "ifup", &[spec.iface.as_str()]).await?;
        if !self.is_up(&spec.iface).await? {
            return Err(ReconcileError::command(
                format!("ifquery {} --state", spec.iface),
                format!("error on ifup {}", spec.iface),
            )
            .into());
        }
        tracing::info!(role = %self.role, iface = %spec.iface, "Interface up");
        Ok(())
    }

    async fn apply_iface_file(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        self.check_default_route(spec).await?;
        tokio::fs::create_dir_all(&self.paths.interfaces_dir).await?;
        self.write_iface_file(spec).await
    }

    async fn remove_iface(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        self.check_not_referenced(&spec.iface).await?;

        let post_up = match self.live_post_up(spec).await {
            Ok(cmds) => cmds,
            Err(e) => {
                tracing::debug!(error = %e, "Falling back to requested post-up list");
                spec.post_up.clone()
            }
        };
        for cmd in &post_up {
            self.reverse(cmd).await?;
        }

        exec::run_checked(self.runner(), "ifdown", &[spec.iface.as_str(), "--force"]).await?;
        self.remove_iface_file(spec).await?;
        tracing::info!(role = %self.role, iface = %spec.iface, "Interface removed");
        Ok(())
    }

    async fn remove_iface_file(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::remove_optional(&self.paths.iface_file(&spec.iface)).await
    }

    async fn reconcile_post_up(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        let live = self.live_post_up(spec).await?;

        // interface is already up, boot-time post-up will not run again
        for cmd in spec.post_up.iter().filter(|cmd| !live.contains(cmd)) {
            tracing::info!(role = %self.role, command = %cmd, "Running new post-up");
            exec::run_line(self.runner(), cmd).await?;
        }
        for cmd in live.iter().filter(|cmd| !spec.post_up.contains(cmd)) {
            self.reverse(cmd).await?;
        }

        self.write_iface_file(spec).await
    }

    async fn vrrp_exists(&self, spec: &InterfaceVrrpSpec) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.paths.vrrp_file(spec)).await?)
    }

    async fn vrrp_group_elsewhere(&self, spec: &InterfaceVrrpSpec) -> Result<Option<String>> {
        let file_name = spec.vrrp_file_name();
        for dir in group_dirs(&self.paths.keepalived_dir).await? {
            let Some(group) = dir.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if group == spec.vrrp_group {
                continue;
            }
            if tokio::fs::try_exists(dir.join(&file_name)).await? {
                return Ok(Some(group.to_string()));
            }
        }
        Ok(None)
    }

    async fn vrrp_matches(&self, spec: &InterfaceVrrpSpec, projection: Projection) -> Result<bool> {
        let Some(actual) = Self::read_optional(&self.paths.vrrp_file(spec)).await? else {
            return Ok(false);
        };
        let (expected, actual) = match projection {
            Projection::WithoutInterfaceLine => (
                render::render_vrrp(spec, self.role, projection)?,
                strip_lines(&actual, "\tinterface "),
            ),
            _ => (render::render_vrrp(spec, self.role, Projection::Full)?, actual),
        };
        if expected != actual {
            log_mismatch("vrrp", &expected, &actual);
            return Ok(false);
        }
        Ok(true)
    }

    async fn add_vrrp(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        let content = render::render_vrrp(spec, self.role, Projection::Full)?;
        let dir = self.paths.group_dir(&spec.vrrp_group);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create {}", dir.display()))?;
        let path = self.paths.vrrp_file(spec);
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        tracing::info!(role = %self.role, instance = %spec.instance_name(), group = %spec.vrrp_group, "VRRP instance written");
        Ok(())
    }

    async fn remove_vrrp(&self, spec: &InterfaceVrrpSpec) -> Result<()> {
        Self::remove_optional(&self.paths.vrrp_file(spec)).await?;
        tracing::info!(role = %self.role, instance = %spec.instance_name(), group = %spec.vrrp_group, "VRRP instance removed");
        Ok(())
    }

    async fn reconcile_sync_groups(&self) -> Result<()> {
        for dir in group_dirs(&self.paths.keepalived_dir).await? {
            let mut instances = Vec::new();
            for file in conf_files(&dir).await? {
                let content = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("read file {} error", file.display()))?;
                if let Some(name) = render::instance_name_of(&content) {
                    instances.push(name.to_string());
                }
            }

            let group = dir
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            if instances.is_empty() {
                tokio::fs::remove_dir_all(&dir)
                    .await
                    .context("error when remove VG empty")?;
                tracing::info!(role = %self.role, group = %group, "Empty sync group removed");
            } else {
                let path = dir.join(SYNC_GROUP_FILE);
                tokio::fs::write(&path, render::render_sync_group(&group, &instances))
                    .await
                    .with_context(|| format!("write {}", path.display()))?;
            }
        }
        self.reload_vrrp().await
    }

    async fn reload_vrrp(&self) -> Result<()> {
        tracing::info!(role = %self.role, command = %self.reload_cmd, "Reloading keepalived");
        exec::run_line(self.runner(), &self.reload_cmd).await?;
        Ok(())
    }

    async fn script_exists(&self, name: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.paths.script_file(name)).await?)
    }

    async fn script_matches(&self, script: &VrrpScript) -> Result<bool> {
        let Some(actual) = Self::read_optional(&self.paths.script_file(&script.name)).await? else {
            return Ok(false);
        };
        let expected = render::render_script(script);
        if expected != actual {
            log_mismatch("vrrp_script", &expected, &actual);
            return Ok(false);
        }
        Ok(true)
    }

    async fn read_script(&self, name: &str) -> Result<VrrpScript> {
        match Self::read_optional(&self.paths.script_file(name)).await? {
            Some(content) => render::parse_script(name, &content),
            None => Err(ReconcileError::NotFound(format!("vrrp script {}", name)).into()),
        }
    }

    async fn add_script(&self, script: &VrrpScript) -> Result<()> {
        tokio::fs::create_dir_all(&self.paths.keepalived_dir).await?;
        let path = self.paths.script_file(&script.name);
        tokio::fs::write(&path, render::render_script(script))
            .await
            .with_context(|| format!("write {}", path.display()))?;
        tracing::info!(role = %self.role, script = %script.name, "VRRP script written");
        Ok(())
    }

    async fn remove_script(&self, name: &str) -> Result<()> {
        Self::remove_optional(&self.paths.script_file(name)).await?;
        tracing::info!(role = %self.role, script = %name, "VRRP script removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::testing::FakeRunner;
    use crate::exec::CommandOutput;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        runner: Arc<FakeRunner>,
        store: LocalStateStore,
    }

    fn fixture(role: Role) -> Fixture {
        let dir = TempDir::new().unwrap();
        let paths = StatePaths {
            interfaces_dir: dir.path().join("interfaces.d"),
            keepalived_dir: dir.path().join("keepalived-vrrp.d"),
        };
        std::fs::create_dir_all(&paths.interfaces_dir).unwrap();
        std::fs::create_dir_all(&paths.keepalived_dir).unwrap();
        let runner = Arc::new(FakeRunner::new());
        let store = LocalStateStore::new(role, paths, runner.clone(), "keepalived-reload now");
        Fixture {
            _dir: dir,
            runner,
            store,
        }
    }

    #[test]
    fn test_strip_lines_drops_only_prefixed_lines() {
        let content = "auto eth0\n\tpost-up ip route add 10.1.0.0/16 dev eth0\n\taddress 10.0.0.1\n\tpost-up true";
        assert_eq!(
            strip_lines(content, "\tpost-up"),
            "auto eth0\n\taddress 10.0.0.1\n"
        );
        // a line merely containing the prefix stays
        assert_eq!(strip_lines("#\tpost-up x\n", "\tpost-up"), "#\tpost-up x\n");
        assert_eq!(strip_lines("", "\tinterface "), "");
    }

    fn spec() -> InterfaceVrrpSpec {
        InterfaceVrrpSpec {
            iface: "eth0".to_string(),
            ip_master: "10.0.0.1".to_string(),
            ip_slave: "10.0.0.2".to_string(),
            mask: "24".to_string(),
            vrrp_group: "g1".to_string(),
            id_vrrp: "50".to_string(),
            ip_vip: vec!["10.0.0.10".to_string()],
            prio_master: "150".to_string(),
            prio_slave: "100".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_apply_iface_writes_and_brings_up() {
        let f = fixture(Role::Slave);
        let s = spec();
        f.store.apply_iface(&s).await.unwrap();

        let content = std::fs::read_to_string(f.store.paths().iface_file("eth0")).unwrap();
        assert!(content.contains("address 10.0.0.2/24"));
        assert_eq!(f.runner.calls(), vec!["ifup eth0", "ifquery eth0 --state"]);
        assert!(f.store.iface_matches(&s, Projection::Full).await.unwrap());
    }

    #[tokio::test]
    async fn test_iface_not_up_is_not_matching() {
        let f = fixture(Role::Master);
        let s = spec();
        f.store.apply_iface_file(&s).await.unwrap();
        f.runner.fail("ifquery eth0 --state", "");
        assert!(!f.store.iface_matches(&s, Projection::Full).await.unwrap());
    }

    #[tokio::test]
    async fn test_apply_fails_when_ifup_fails() {
        let f = fixture(Role::Master);
        f.runner.fail("ifup eth0", "Cannot find device");
        let err = f.store.apply_iface(&spec()).await.unwrap_err();
        assert!(err.to_string().contains("Cannot find device"));
    }

    #[tokio::test]
    async fn test_gateway_conflict() {
        let f = fixture(Role::Master);
        let mut s = spec();
        s.default_gw = "10.0.0.254".to_string();
        f.runner.script(
            "ip -4 route",
            CommandOutput::ok("default via 192.168.1.1 dev eth9\n"),
        );
        let err = f.store.apply_iface_file(&s).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::Drift(_))
        ));

        f.runner.script(
            "ip -4 route",
            CommandOutput::ok("default via 10.0.0.254 dev eth0\n"),
        );
        f.store.apply_iface_file(&s).await.unwrap();
    }

    #[tokio::test]
    async fn test_without_post_up_projection() {
        let f = fixture(Role::Master);
        let mut s = spec();
        s.post_up = vec!["ip route add 10.9.0.0/16 via 10.0.0.254".to_string()];
        f.store.apply_iface_file(&s).await.unwrap();

        let mut changed = s.clone();
        changed.post_up = vec!["ip rule add from 10.0.0.0/24 table 10".to_string()];
        assert!(!f.store.iface_matches(&changed, Projection::Full).await.unwrap());
        assert!(f
            .store
            .iface_matches(&changed, Projection::WithoutPostUp)
            .await
            .unwrap());

        changed.mask = "16".to_string();
        assert!(!f
            .store
            .iface_matches(&changed, Projection::WithoutPostUp)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_reconcile_post_up_runs_and_reverses() {
        let f = fixture(Role::Master);
        let mut s = spec();
        s.post_up = vec!["ip route add 10.9.0.0/16 via 10.0.0.254".to_string()];
        f.store.apply_iface_file(&s).await.unwrap();

        s.post_up = vec!["ip rule add from 10.0.0.0/24 table 10".to_string()];
        f.store.reconcile_post_up(&s).await.unwrap();

        assert_eq!(
            f.runner.calls(),
            vec![
                "ip rule add from 10.0.0.0/24 table 10",
                "ip route del 10.9.0.0/16 via 10.0.0.254",
            ]
        );
        let content = std::fs::read_to_string(f.store.paths().iface_file("eth0")).unwrap();
        assert!(content.ends_with("\tpost-up ip rule add from 10.0.0.0/24 table 10\n"));
    }

    #[tokio::test]
    async fn test_reconcile_post_up_ignores_bond_hash_line() {
        let f = fixture(Role::Master);
        let mut s = spec();
        s.iface = "bond0".to_string();
        s.lacp_slaves_master = "eth0 eth1".to_string();
        f.store.apply_iface_file(&s).await.unwrap();
        f.store.reconcile_post_up(&s).await.unwrap();
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_iface_reverses_live_post_up() {
        let f = fixture(Role::Master);
        let mut s = spec();
        s.post_up = vec![
            "ip route add 10.9.0.0/16 via 10.0.0.254".to_string(),
            "sysctl -w net.ipv4.conf.eth0.arp_ignore=1".to_string(),
        ];
        f.store.apply_iface_file(&s).await.unwrap();

        f.store.remove_iface(&spec()).await.unwrap();
        assert_eq!(
            f.runner.calls(),
            vec!["ip route del 10.9.0.0/16 via 10.0.0.254", "ifdown eth0 --force"]
        );
        assert!(!f.store.iface_exists(&s).await.unwrap());
    }

    #[tokio::test]
    async fn test_remove_iface_blocked_by_other_group() {
        let f = fixture(Role::Master);
        let s = spec();
        f.store.apply_iface_file(&s).await.unwrap();

        let mut other = s.clone();
        other.vrrp_group = "g2".to_string();
        other.iface = "eth0:1".to_string();
        other.id_vrrp = "60".to_string();
        f.store.add_vrrp(&other).await.unwrap();

        let err = f.store.remove_iface(&s).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::DependencyConflict(_))
        ));
        assert!(f.store.iface_exists(&s).await.unwrap());
        assert!(f.runner.calls().is_empty());
    }

    #[tokio::test]
    async fn test_remove_iface_blocked_by_vmac_reference() {
        let f = fixture(Role::Master);
        let s = spec();
        f.store.apply_iface_file(&s).await.unwrap();

        let mut other = s.clone();
        other.use_vmac = true;
        f.store.add_vrrp(&other).await.unwrap();

        assert!(f.store.remove_iface(&s).await.is_err());
    }

    #[tokio::test]
    async fn test_vrrp_lifecycle_and_sync_group() {
        let f = fixture(Role::Master);
        let s = spec();
        assert!(!f.store.vrrp_exists(&s).await.unwrap());

        f.store.add_vrrp(&s).await.unwrap();
        f.store.reconcile_sync_groups().await.unwrap();
        assert!(f.store.vrrp_matches(&s, Projection::Full).await.unwrap());

        let sync = f.store.paths().group_dir("g1").join(SYNC_GROUP_FILE);
        assert_eq!(
            std::fs::read_to_string(&sync).unwrap(),
            "vrrp_sync_group g1 {\n\tgroup {\n\t\tnetwork_eth0_id_50\n\t}\n}\n"
        );
        assert_eq!(f.runner.calls(), vec!["keepalived-reload now"]);

        f.store.remove_vrrp(&s).await.unwrap();
        f.store.reconcile_sync_groups().await.unwrap();
        assert!(!f.store.paths().group_dir("g1").exists());
    }

    #[tokio::test]
    async fn test_sync_group_skips_scripts_and_missing_root() {
        let f = fixture(Role::Master);
        let script = VrrpScript {
            name: "chk".to_string(),
            script: "true".to_string(),
            ..Default::default()
        };
        f.store.add_script(&script).await.unwrap();
        f.store.reconcile_sync_groups().await.unwrap();
        assert!(f.store.script_exists("chk").await.unwrap());

        std::fs::remove_dir_all(&f.store.paths().keepalived_dir).unwrap();
        f.store.reconcile_sync_groups().await.unwrap();
    }

    #[tokio::test]
    async fn test_vrrp_interface_line_projection_and_other_group() {
        let f = fixture(Role::Slave);
        let mut s = spec();
        s.iface_vrrp = "eth5".to_string();
        f.store.add_vrrp(&s).await.unwrap();

        let mut plain = s.clone();
        plain.iface_vrrp.clear();
        assert!(!f.store.vrrp_matches(&plain, Projection::Full).await.unwrap());
        assert!(f
            .store
            .vrrp_matches(&plain, Projection::WithoutInterfaceLine)
            .await
            .unwrap());

        let moved = s.with_vrrp_group("g2");
        assert_eq!(
            f.store.vrrp_group_elsewhere(&moved).await.unwrap().as_deref(),
            Some("g1")
        );
        assert_eq!(f.store.vrrp_group_elsewhere(&s).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_script_read_back() {
        let f = fixture(Role::Master);
        let script = VrrpScript {
            name: "chk".to_string(),
            script: "/bin/true".to_string(),
            interval: 2,
            fall: 1,
            rise: 1,
            ..Default::default()
        };
        f.store.add_script(&script).await.unwrap();
        assert!(f.store.script_matches(&script).await.unwrap());
        assert_eq!(f.store.read_script("chk").await.unwrap(), script);

        f.store.remove_script("chk").await.unwrap();
        let err = f.store.read_script("chk").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ReconcileError>(),
            Some(ReconcileError::NotFound(_))
        ));
    }
}
