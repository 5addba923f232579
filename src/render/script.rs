use anyhow::{anyhow, Context, Result};

use crate::models::VrrpScript;

use super::ConfigText;

/// Render `<keepalived_dir>/script_<name>.conf`; zero or empty options are omitted
pub fn render_script(script: &VrrpScript) -> String {
    let mut text = ConfigText::new();
    text.line(0, format!("vrrp_script {} {{", script.name));
    text.line(1, format!("script \"{}\"", script.script));
    text.line_if(script.fall != 0, 1, format!("fall {}", script.fall));
    text.line_if(script.interval != 0, 1, format!("interval {}", script.interval));
    text.line_if(script.rise != 0, 1, format!("rise {}", script.rise));
    text.line_if(script.timeout != 0, 1, format!("timeout {}", script.timeout));
    if script.weight_reverse {
        text.line(1, format!("weight {} reverse", script.weight));
    } else {
        text.line_if(script.weight != 0, 1, format!("weight {}", script.weight));
    }
    text.line_if(!script.user.is_empty(), 1, format!("user {}", script.user));
    text.line_if(script.init_fail, 1, "init_fail");
    text.line(0, "}");
    text.finish()
}

fn parse_int(key: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse()
        .with_context(|| format!("vrrp script {} is not a number: {:?}", key, value))
}

/// Parse a script file written by [`render_script`]. Option lines may come in any order.
pub fn parse_script(name: &str, content: &str) -> Result<VrrpScript> {
    if !content.starts_with(&format!("vrrp_script {} {{", name)) || !content.ends_with("\n}\n") {
        return Err(anyhow!("the file is bad (not start or end with good character)"));
    }

    let mut script = VrrpScript::default();
    for line in content.lines() {
        if let Some(rest) = line.strip_prefix("vrrp_script ") {
            script.name = rest.trim_end_matches(" {").to_string();
        } else if let Some(rest) = line.strip_prefix("\tscript ") {
            script.script = rest.trim_matches('"').to_string();
        } else if let Some(rest) = line.strip_prefix("\tuser ") {
            script.user = rest.to_string();
        } else if line == "\tinit_fail" {
            script.init_fail = true;
        } else if let Some(rest) = line.strip_prefix("\tfall ") {
            script.fall = parse_int("fall", rest)?;
        } else if let Some(rest) = line.strip_prefix("\tinterval ") {
            script.interval = parse_int("interval", rest)?;
        } else if let Some(rest) = line.strip_prefix("\trise ") {
            script.rise = parse_int("rise", rest)?;
        } else if let Some(rest) = line.strip_prefix("\ttimeout ") {
            script.timeout = parse_int("timeout", rest)?;
        } else if let Some(rest) = line.strip_prefix("\tweight ") {
            let mut parts = rest.split(' ');
            script.weight = parse_int("weight", parts.next().unwrap_or_default())?;
            script.weight_reverse = parts.next().is_some();
        } else if line == "}" || line.is_empty() {
            continue;
        } else {
            return Err(anyhow!("vrrp script file has unknown line {:?}", line));
        }
    }
    Ok(script)
}
