//! Play one round between an in-process phone and watch.

use anyhow::{Context, Result};
use serde::Serialize;
use std::time::Duration;
use tandem_client::{spawn_peer, spawn_primary, Config, ControllerHandle, MemoryChannel, Snapshot};
use tandem_core::{Role, Round};
use tandem_types::Choice;

/// What to play.
#[derive(Debug, Clone, Copy)]
pub struct Plan {
    /// Phone choice.
    pub primary: Choice,
    /// Watch choice.
    pub peer: Choice,
    /// Submit the watch choice first.
    pub peer_first: bool,
    /// How long to wait for each step.
    pub timeout: Duration,
}

/// Final state of one device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceReport {
    /// Device role.
    pub role: Role,
    /// Final round.
    pub round: Round,
    /// Final status line.
    pub status: String,
}

impl From<Snapshot> for DeviceReport {
    fn from(snapshot: Snapshot) -> Self {
        Self {
            role: snapshot.role,
            round: snapshot.round,
            status: snapshot.status.to_string(),
        }
    }
}

/// Outcome of a simulated round.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Phone state.
    pub phone: DeviceReport,
    /// Watch state.
    pub watch: DeviceReport,
    /// Messages the link lost.
    pub lost: u64,
    /// Whether the round failed to resolve on both devices.
    pub stalled: bool,
}

/// Play the round described by `plan` over a link built from `config`.
pub async fn simulate(config: &Config, plan: Plan) -> Result<Report> {
    let (phone_link, watch_link) = MemoryChannel::pair(config.link_config());
    let link = phone_link.clone();
    let options = config.controller_options();

    let (phone, _phone_events) = spawn_primary(phone_link, options.clone());
    let (watch, _watch_events) = spawn_peer(watch_link, options);

    if plan.peer_first {
        watch.submit_choice(plan.peer)?;
        let arrived = settle(&phone, plan.timeout, |s| s.round.remote_choice.is_some()).await;
        if !arrived {
            tracing::warn!("Watch choice did not reach the phone");
        }
        phone.submit_choice(plan.primary)?;
    } else {
        phone.submit_choice(plan.primary)?;
        watch.submit_choice(plan.peer)?;
    }

    let phone_done = settle(&phone, plan.timeout, |s| s.round.is_resolved()).await;
    let watch_done = settle(&watch, plan.timeout, |s| s.round.is_resolved()).await;

    let report = Report {
        phone: phone.snapshot().into(),
        watch: watch.snapshot().into(),
        lost: link.lost_count(),
        stalled: !(phone_done && watch_done),
    };

    phone.shutdown().await.context("Phone controller stopped early")?;
    watch.shutdown().await.context("Watch controller stopped early")?;
    Ok(report)
}

async fn settle<F>(handle: &ControllerHandle, timeout: Duration, predicate: F) -> bool
where
    F: FnMut(&Snapshot) -> bool,
{
    matches!(
        tokio::time::timeout(timeout, handle.wait_for(predicate)).await,
        Ok(Ok(_))
    )
}

/// Render a report for humans.
pub fn render(report: &Report) -> String {
    let mut out = String::new();
    for device in [&report.phone, &report.watch] {
        let choice = |c: Option<Choice>| c.map_or("-".to_string(), |c| c.to_string());
        out.push_str(&format!(
            "{:<7} choice={:<8} remote={:<8} outcome={:<12} input={} status={:?}\n",
            device.role,
            choice(device.round.local_choice),
            choice(device.round.remote_choice),
            device
                .round
                .outcome
                .map_or("-".to_string(), |o| o.to_string()),
            if device.round.accepting_input { "open" } else { "closed" },
            device.status,
        ));
    }
    out.push_str(&format!("lost messages: {}\n", report.lost));
    if report.stalled {
        out.push_str("round stalled; a reset is needed\n");
    }
    out
}

/// Run the simulate command.
pub async fn run(config: &Config, plan: Plan, json: bool) -> Result<()> {
    let report = simulate(config, plan).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        );
    } else {
        print!("{}", render(&report));
    }
    Ok(())
}
