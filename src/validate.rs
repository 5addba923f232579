//! Consistency checks run before any mutation.
//!
//! Checks run in a fixed order and the first failure wins, so a client always
//! sees the same message for the same body.

use std::net::IpAddr;

use anyhow::Result;

use crate::error::ReconcileError;
use crate::models::{InterfaceVrrpSpec, VrrpScript};
use crate::render;

fn fail<T>(msg: impl Into<String>) -> Result<T> {
    Err(ReconcileError::validation(msg).into())
}

/// An IP network parsed from `ip` + prefix length
#[derive(Debug, Clone, Copy)]
struct Network {
    addr: IpAddr,
    prefix: u8,
}

impl Network {
    fn parse(ip: &str, mask: &str) -> Option<Self> {
        let addr: IpAddr = ip.parse().ok()?;
        let prefix: u8 = mask.parse().ok()?;
        let max = match addr {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix > max {
            return None;
        }
        Some(Self { addr, prefix })
    }

    fn contains(&self, other: &str) -> bool {
        let Ok(other) = other.parse::<IpAddr>() else {
            return false;
        };
        match (self.addr, other) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = u32::MAX.checked_shl(32 - self.prefix as u32).unwrap_or(0);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = u128::MAX.checked_shl(128 - self.prefix as u32).unwrap_or(0);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

/// Names end up as path components and keepalived tokens
fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':' | '@'))
}

/// Reject a name that cannot be used as a single path component
pub fn validate_name(kind: &str, name: &str) -> Result<()> {
    if !is_safe_name(name) {
        return fail(format!("invalid {} {:?}", kind, name));
    }
    Ok(())
}

/// Validate an interface/VRRP spec.
pub fn validate_spec(spec: &InterfaceVrrpSpec) -> Result<()> {
    if !is_safe_name(&spec.iface) {
        return fail(format!("invalid iface {:?}", spec.iface));
    }

    if !spec.ip_vip_only && spec.has_vips() {
        if spec.ip_master.is_empty() {
            return fail("missing IP_master");
        }
        if spec.ip_slave.is_empty() {
            return fail("missing IP_slave");
        }
        if spec.mask.is_empty() {
            return fail("missing Mask");
        }
        if spec.iface.contains("vlan") && spec.vlan_device.is_empty() {
            return fail("missing Vlan_device with iface vlan");
        }
    }

    let network = if spec.ip_master.is_empty() {
        None
    } else {
        if spec.mask.is_empty() {
            return fail("missing Mask");
        }
        let Some(network) = Network::parse(&spec.ip_master, &spec.mask) else {
            return fail(format!("Error CIDR {}/{}", spec.ip_master, spec.mask));
        };
        if spec.ip_slave.is_empty() {
            return fail("missing IP_slave");
        }
        if !network.contains(&spec.ip_slave) {
            return fail(format!(
                "IP_master network don't include IP slave : {}",
                spec.ip_slave
            ));
        }
        Some(network)
    };

    if !spec.default_gw.is_empty() && (spec.ip_master.is_empty() || spec.ip_slave.is_empty()) {
        return fail("missing IP_master || IP_slave with Default_GW");
    }

    for vip in &spec.ip_vip {
        if vip.parse::<IpAddr>().is_err() {
            return fail(format!("invalid VIP : {}", vip));
        }
    }
    if spec.has_vips() {
        let v6 = spec.ip_vip.iter().filter(|vip| vip.contains(':')).count();
        if v6 != 0 && v6 != spec.ip_vip.len() {
            return fail("IP_vip mixes IPv4 and IPv6");
        }
    }

    if !spec.ip_vip_only {
        if let Some(network) = network {
            if let Some(vip) = spec.ip_vip.iter().find(|vip| !network.contains(vip)) {
                return fail(format!("IP_master network don't include VIP : {}", vip));
            }
        }
    }

    if spec.has_vips() {
        if spec.vrrp_group.is_empty() {
            return fail("missing Vrrp_group for VIP");
        }
        if !is_safe_name(&spec.vrrp_group) || spec.vrrp_group.ends_with(".conf") {
            return fail(format!("invalid Vrrp_group {:?}", spec.vrrp_group));
        }
        if spec.id_vrrp.is_empty() {
            return fail("missing ID_vrrp for VIP");
        }
        let Ok(id) = spec.id_vrrp.parse::<i64>() else {
            return fail("Error on Id_vrrp integer");
        };
        if !(1..=255).contains(&id) {
            return fail("Id_vrrp must be in the range from 1 to 255");
        }
        if spec.use_vmac && !spec.is_ipv6() {
            render::vmac_device_name(spec.base_iface(), &spec.id_vrrp)?;
        }
        if spec.prio_master.is_empty() {
            return fail("missing Prio_master for VIP");
        }
        if spec.prio_slave.is_empty() {
            return fail("missing Prio_slave for VIP");
        }
    }

    if spec.auth_type.is_empty() != spec.auth_pass.is_empty() {
        return fail("missing Auth_type or Auth_pass");
    }

    if let Some(name) = spec.track_script.iter().find(|name| !is_safe_name(name)) {
        return fail(format!("invalid Track_script {:?}", name));
    }

    Ok(())
}

/// Validate a VRRP script definition.
pub fn validate_script(script: &VrrpScript) -> Result<()> {
    if !is_safe_name(&script.name) {
        return fail(format!("invalid script name {:?}", script.name));
    }
    if script.interval < 1 {
        return fail("interval too small");
    }
    if script.timeout > script.interval {
        return fail("timeout too long with this interval");
    }
    if !(-253..=253).contains(&script.weight) {
        return fail("weight is not in valid range");
    }
    if script.script.is_empty() {
        return fail("missing script");
    }
    if script.script.contains('"') || script.script.contains('\n') {
        return fail("script must not contain quotes or newlines");
    }
    if script.fall < 1 {
        return fail("fall too small");
    }
    if script.rise < 1 {
        return fail("rise too small");
    }
    Ok(())
}
