use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which node of the pair a file is rendered for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Master,
    Slave,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Slave => "slave",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "master" => Ok(Role::Master),
            "slave" => Ok(Role::Slave),
            other => Err(format!("unknown role '{}' (expected master or slave)", other)),
        }
    }
}

/// Which lines of a rendered file take part in a comparison.
///
/// `WithoutPostUp` drops every `post-up` line of an interface file,
/// `WithoutInterfaceLine` drops the `interface` line of a VRRP instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Full,
    WithoutPostUp,
    WithoutInterfaceLine,
}

/// InterfaceVrrpSpec is the unit of configuration, keyed by (iface, Id_vrrp).
///
/// Field names on the wire are kept from the v1 API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceVrrpSpec {
    #[serde(rename = "IP_vip_only", default)]
    pub ip_vip_only: bool,
    #[serde(rename = "Use_vmac", default)]
    pub use_vmac: bool,
    #[serde(default)]
    pub iface: String,
    #[serde(rename = "IP_master", default)]
    pub ip_master: String,
    #[serde(rename = "IP_slave", default)]
    pub ip_slave: String,
    #[serde(rename = "Mask", default)]
    pub mask: String,
    #[serde(rename = "Prio_master", default)]
    pub prio_master: String,
    #[serde(rename = "Prio_slave", default)]
    pub prio_slave: String,
    #[serde(rename = "Vlan_device", default)]
    pub vlan_device: String,
    #[serde(rename = "Vrrp_group", default)]
    pub vrrp_group: String,
    #[serde(rename = "Iface_vrrp", default)]
    pub iface_vrrp: String,
    #[serde(rename = "Id_vrrp", default)]
    pub id_vrrp: String,
    #[serde(rename = "Auth_type", default)]
    pub auth_type: String,
    #[serde(rename = "Auth_pass", default)]
    pub auth_pass: String,
    #[serde(rename = "Default_GW", default)]
    pub default_gw: String,
    #[serde(rename = "LACP_slaves_master", default)]
    pub lacp_slaves_master: String,
    #[serde(rename = "LACP_slaves_slave", default)]
    pub lacp_slaves_slave: String,
    #[serde(rename = "Sync_iface", default)]
    pub sync_iface: String,
    #[serde(rename = "Garp_m_delay", default)]
    pub garp_m_delay: String,
    #[serde(rename = "Garp_master_refresh", default)]
    pub garp_master_refresh: String,
    #[serde(rename = "Advert_int", default)]
    pub advert_int: String,
    #[serde(rename = "IP_vip", default)]
    pub ip_vip: Vec<String>,
    #[serde(rename = "Post_up", default)]
    pub post_up: Vec<String>,
    #[serde(rename = "Track_script", default)]
    pub track_script: Vec<String>,
}

impl InterfaceVrrpSpec {
    /// Sort the order-insensitive lists so rendering does not depend on the client
    pub fn normalize(&mut self) {
        self.ip_vip.sort();
        self.post_up.sort();
    }

    pub fn has_vips(&self) -> bool {
        !self.ip_vip.is_empty()
    }

    /// VIP family is inferred: any literal containing ':' makes the instance IPv6
    pub fn is_ipv6(&self) -> bool {
        self.ip_vip.iter().any(|vip| vip.contains(':'))
    }

    /// Interface name without an alias suffix ("eth0:1" -> "eth0")
    pub fn base_iface(&self) -> &str {
        self.iface.split(':').next().unwrap_or(&self.iface)
    }

    pub fn role_ip(&self, role: Role) -> &str {
        match role {
            Role::Master => &self.ip_master,
            Role::Slave => &self.ip_slave,
        }
    }

    pub fn role_lacp_slaves(&self, role: Role) -> &str {
        match role {
            Role::Master => &self.lacp_slaves_master,
            Role::Slave => &self.lacp_slaves_slave,
        }
    }

    pub fn role_priority(&self, role: Role) -> &str {
        match role {
            Role::Master => &self.prio_master,
            Role::Slave => &self.prio_slave,
        }
    }

    /// keepalived instance name, also the token listed in sync groups
    pub fn instance_name(&self) -> String {
        format!("network_{}_id_{}", self.iface, self.id_vrrp)
    }

    /// VRRP instance file name inside its group directory
    pub fn vrrp_file_name(&self) -> String {
        format!("{}_{}.conf", self.iface, self.id_vrrp)
    }

    pub fn with_vrrp_id(&self, id: &str) -> Self {
        Self {
            id_vrrp: id.to_string(),
            ..self.clone()
        }
    }

    pub fn with_vrrp_group(&self, group: &str) -> Self {
        Self {
            vrrp_group: group.to_string(),
            ..self.clone()
        }
    }
}

/// VrrpScript is a keepalived `vrrp_script` referenced by name from `Track_script`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrrpScript {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub script: String,
    #[serde(default)]
    pub fall: i32,
    #[serde(default)]
    pub rise: i32,
    #[serde(default)]
    pub interval: i32,
    #[serde(default)]
    pub timeout: i32,
    #[serde(default)]
    pub weight: i32,
    #[serde(default)]
    pub weight_reverse: bool,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub init_fail: bool,
}

impl VrrpScript {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }
}
