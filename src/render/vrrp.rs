use anyhow::Result;

use crate::error::ReconcileError;
use crate::models::{InterfaceVrrpSpec, Projection, Role};

use super::ConfigText;

/// keepalived only sends gratuitous ARP/NA for this many addresses per instance
pub const MAX_VIPS_IN_BLOCK: usize = 20;

const DEFAULT_GARP_DELAY: &str = "5";
const DEFAULT_ADVERT_INT: &str = "1";

/// Name of the macvlan device keepalived creates for `use_vmac`.
///
/// Kernel device names are limited to 15 bytes, so short names get the
/// readable `vmac_` prefix and longer ones fall back to `vc_`.
pub fn vmac_device_name(base_iface: &str, id: &str) -> Result<String> {
    if base_iface.len() < 9 && id.len() < 4 {
        Ok(format!("vmac_{}_{}", base_iface, id))
    } else if base_iface.len() < 10 {
        Ok(format!("vc_{}_{}", base_iface, id))
    } else {
        Err(ReconcileError::validation(format!("interface {} too long", base_iface)).into())
    }
}

/// Device the VIPs are bound to: the vmac device in vmac mode, else the base interface
pub fn vip_device(spec: &InterfaceVrrpSpec) -> Result<String> {
    if uses_vmac(spec) {
        vmac_device_name(spec.base_iface(), &spec.id_vrrp)
    } else {
        Ok(spec.base_iface().to_string())
    }
}

// vmac is IPv4 only
fn uses_vmac(spec: &InterfaceVrrpSpec) -> bool {
    spec.use_vmac && !spec.is_ipv6()
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

/// Render the keepalived instance file `<group>/<iface>_<id>.conf`.
///
/// Every instance starts as BACKUP; priorities decide who becomes master.
/// `Projection::WithoutInterfaceLine` omits the `interface` line so an
/// instance can be compared across a change of `Iface_vrrp`.
pub fn render_vrrp(spec: &InterfaceVrrpSpec, role: Role, projection: Projection) -> Result<String> {
    let cut = spec.base_iface();
    let device = vip_device(spec)?;
    let ipv6 = spec.is_ipv6();
    let id = &spec.id_vrrp;

    let mut text = ConfigText::new();
    text.line(0, format!("vrrp_instance {} {{", spec.instance_name()));
    text.line(1, "state BACKUP");
    text.line_if(
        projection != Projection::WithoutInterfaceLine,
        1,
        format!("interface {}", or_default(&spec.iface_vrrp, cut)),
    );
    text.block(1, "track_interface", [cut]);
    if !spec.track_script.is_empty() {
        text.block(1, "track_script", &spec.track_script);
    }
    if uses_vmac(spec) {
        text.line(1, format!("use_vmac {}", device));
        text.line(1, "vmac_xmit_base");
    }

    let garp_delay = or_default(&spec.garp_m_delay, DEFAULT_GARP_DELAY);
    text.line(1, format!("garp_master_delay {}", garp_delay));
    text.line(1, format!("garp_lower_prio_delay {}", garp_delay));
    text.line_if(
        !spec.garp_master_refresh.is_empty(),
        1,
        format!("garp_master_refresh {}", spec.garp_master_refresh),
    );

    text.line(1, format!("virtual_router_id {}", id));
    text.line(1, format!("priority {}", spec.role_priority(role)));
    text.line(1, format!("advert_int {}", or_default(&spec.advert_int, DEFAULT_ADVERT_INT)));

    // VRRPv3 (IPv6) has no authentication
    if !ipv6 && !spec.auth_type.is_empty() {
        text.block(
            1,
            "authentication",
            [
                format!("auth_type {}", spec.auth_type),
                format!("auth_pass {}", spec.auth_pass),
            ],
        );
    }

    let vips: Vec<String> = spec
        .ip_vip
        .iter()
        .map(|vip| format!("{} dev {}", vip, device))
        .collect();
    let split = vips.len().min(MAX_VIPS_IN_BLOCK);
    text.block(1, "virtual_ipaddress", &vips[..split]);
    if vips.len() > MAX_VIPS_IN_BLOCK {
        text.block(1, "virtual_ipaddress_excluded", &vips[split..]);
    }
    text.line(0, "}");

    if !spec.sync_iface.is_empty() {
        text.block(
            0,
            "global_defs",
            [format!(
                "lvs_sync_daemon {} {} id {}",
                spec.sync_iface,
                spec.instance_name(),
                id
            )],
        );
    }

    Ok(text.finish())
}
