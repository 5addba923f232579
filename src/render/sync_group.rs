use super::ConfigText;

/// Instance name declared by a VRRP instance file, if it declares one
pub fn instance_name_of(content: &str) -> Option<&str> {
    let mut tokens = content.split_whitespace();
    match tokens.next() {
        Some("vrrp_instance") => tokens.next(),
        _ => None,
    }
}

/// Render `<keepalived_dir>/<group>/vrrp_sync_group` listing every instance of the group
pub fn render_sync_group<S: AsRef<str>>(group: &str, instances: &[S]) -> String {
    let mut text = ConfigText::new();
    text.line(0, format!("vrrp_sync_group {} {{", group));
    text.block(1, "group", instances.iter().map(|i| i.as_ref()));
    text.line(0, "}");
    text.finish()
}
