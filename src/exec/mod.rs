//! External process execution.
//!
//! Every program the service drives (`ifup`, `ifdown`, `ifquery`, `ip`,
//! `ping`, post-up lines, the keepalived reload command) goes through the
//! [`CommandRunner`] trait so tests can substitute a recording fake.

use anyhow::Result;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::ReconcileError;

/// Outcome of one program run
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    /// stdout and stderr joined, for error messages
    pub fn combined(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args` (no shell). `Err` only when it cannot be spawned.
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput>;
}

/// Runs real processes with `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput> {
        tracing::debug!(program, ?args, "Executing command");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| ReconcileError::command(display(program, args), e.to_string()))?;

        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn display(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Run a program and turn a non-zero exit into `ReconcileError::Command`
pub async fn run_checked(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&str],
) -> Result<CommandOutput> {
    let output = runner.run(program, args).await?;
    if !output.success {
        let command = display(program, args);
        tracing::warn!(command = %command, output = %output.combined(), "Command failed");
        return Err(ReconcileError::command(command, output.combined()).into());
    }
    Ok(output)
}

/// Run a whole command line split on whitespace (post-up lines, reload command)
pub async fn run_line(runner: &dyn CommandRunner, line: &str) -> Result<CommandOutput> {
    let mut parts = line.split_whitespace();
    let Some(program) = parts.next() else {
        return Err(ReconcileError::validation("empty command line").into());
    };
    let args: Vec<&str> = parts.collect();
    run_checked(runner, program, &args).await
}

/// Undo command for a post-up line, if it has one.
///
/// Only route and rule additions are reversible; anything else was applied
/// once and stays.
pub fn reverse_post_up(cmd: &str) -> Option<String> {
    if !cmd.contains("route add") && !cmd.contains("ip rule add") {
        return None;
    }
    Some(
        cmd.replacen("route add", "route del", 1)
            .replacen("ip rule add", "ip rule del", 1),
    )
}

/// Whether the installed ifupdown knows `ifquery --state`
pub async fn ifquery_supports_state(runner: &dyn CommandRunner) -> Result<bool> {
    let output = runner.run("ifquery", &["--help"]).await?;
    Ok(output.combined().contains("state"))
}
