//! Canonical on-disk text for every managed file kind.
//!
//! Rendering is pure: the output depends only on the request, the node role and
//! the projection. Checks compare these bytes against what is on disk.

pub mod interface;
pub mod script;
pub mod sync_group;
pub mod vrrp;

pub use interface::{render_interface, xmit_hash_policy_command};
pub use script::{parse_script, render_script};
pub use sync_group::{instance_name_of, render_sync_group};
pub use vrrp::{render_vrrp, vip_device, vmac_device_name};

/// Line-oriented text builder shared by the file renderers.
///
/// Nesting depth is written as leading tabs, the only indentation keepalived
/// and ifupdown files use here.
#[derive(Debug, Default)]
pub struct ConfigText {
    buf: String,
}

impl ConfigText {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, depth: usize, text: impl AsRef<str>) -> &mut Self {
        for _ in 0..depth {
            self.buf.push('\t');
        }
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
        self
    }

    /// Emit `text` only when `cond` holds
    pub fn line_if(&mut self, cond: bool, depth: usize, text: impl AsRef<str>) -> &mut Self {
        if cond {
            self.line(depth, text);
        }
        self
    }

    /// `header {` / items one level deeper / `}`
    pub fn block<I, S>(&mut self, depth: usize, header: &str, items: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.line(depth, format!("{} {{", header));
        for item in items {
            self.line(depth + 1, item);
        }
        self.line(depth, "}")
    }

    pub fn finish(self) -> String {
        self.buf
    }
}
