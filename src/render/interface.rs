use crate::models::{InterfaceVrrpSpec, Projection, Role};

use super::ConfigText;

/// Fixed bonding timers written for every LACP bond
const BOND_STANZA: &[&str] = &[
    "bond_mode 802.3ad",
    "bond_miimon 50",
    "bond_downdelay 200",
    "bond_updelay 200",
];

/// Post-up command that pins the bond hash policy; managed with the bond, not with `Post_up`
pub fn xmit_hash_policy_command(iface: &str) -> String {
    format!("echo layer3+4 > /sys/class/net/{}/bonding/xmit_hash_policy", iface)
}

/// Render `/etc/network/interfaces.d/<iface>` for one node.
///
/// Line order: `auto`, `iface` header, address or manual `up`, vlan raw
/// device, gateway, bond stanza, post-up commands. Post-up lines (including
/// the bond hash policy) are dropped under `Projection::WithoutPostUp`.
pub fn render_interface(spec: &InterfaceVrrpSpec, role: Role, projection: Projection) -> String {
    let with_post_up = projection != Projection::WithoutPostUp;
    let iface = &spec.iface;
    let ip = spec.role_ip(role);

    let mut text = ConfigText::new();
    text.line(0, format!("auto {}", iface));
    address_stanza(&mut text, iface, ip, &spec.mask);

    text.line_if(
        !spec.vlan_device.is_empty() && iface.contains("vlan"),
        1,
        format!("vlan-raw-device {}", spec.vlan_device),
    );
    text.line_if(
        !spec.default_gw.is_empty(),
        1,
        format!("gateway {}", spec.default_gw),
    );

    bond_stanza(&mut text, iface, spec.role_lacp_slaves(role), with_post_up);

    if with_post_up {
        for cmd in &spec.post_up {
            text.line(1, format!("post-up {}", cmd));
        }
    }

    text.finish()
}

fn address_stanza(text: &mut ConfigText, iface: &str, ip: &str, mask: &str) {
    if ip.contains(':') {
        text.line(0, format!("iface {} inet6 static", iface));
        text.line(1, format!("address {}/{}", ip, mask));
    } else if ip.is_empty() {
        text.line(0, format!("iface {} inet manual", iface));
        text.line(1, format!("up ifconfig {} up", iface));
    } else {
        text.line(0, format!("iface {} inet static", iface));
        text.line(1, format!("address {}/{}", ip, mask));
    }
}

fn bond_stanza(text: &mut ConfigText, iface: &str, slaves: &str, with_post_up: bool) {
    if slaves.is_empty() {
        return;
    }
    text.line(1, format!("slaves {}", slaves));
    for line in BOND_STANZA {
        text.line(1, line);
    }
    text.line_if(
        with_post_up,
        1,
        format!("post-up {}", xmit_hash_policy_command(iface)),
    );
}
