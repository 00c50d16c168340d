//! Scripted two-component scenario.
//!
//! `A` connects to `B` and forwards a `get x`. The first attempt fails
//! because `B` has no register `x`; after `B` receives an `add`, the same
//! request returns `42`. Every step travels through a queue and is
//! dispatched by the owning component's worker.

use crate::worker::{run_worker, Report};
use anyhow::{anyhow, bail, Context as _, Result};
use harp_auth::{Context, Predicate};
use harp_component::{ErrorCode, Outcome};
use harp_event::Message;
use harp_runtime::{ComponentBuilder, ComponentHandle, Directory};
use harp_types::ComponentId;
use serde_json::json;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::info;

const STEP_TIMEOUT: Duration = Duration::from_secs(5);

struct Driver {
    id: ComponentId,
    reports: mpsc::UnboundedReceiver<Report>,
}

impl Driver {
    fn message(&self, operation: &str) -> Message {
        Message::new(self.id.clone(), operation, Context::system())
    }

    /// Waits for one report from each named component, in that order.
    async fn expect(&mut self, components: &[&str]) -> Result<Vec<Report>> {
        let mut pending: Vec<Report> = Vec::new();
        while pending.len() < components.len() {
            let report = tokio::time::timeout(STEP_TIMEOUT, self.reports.recv())
                .await
                .context("timed out waiting for a worker report")?
                .ok_or_else(|| anyhow!("all workers stopped"))?;
            pending.push(report);
        }

        let mut ordered = Vec::with_capacity(components.len());
        for name in components {
            let pos = pending
                .iter()
                .position(|r| r.component == *name)
                .ok_or_else(|| anyhow!("no report from component '{name}'"))?;
            ordered.push(pending.swap_remove(pos));
        }
        Ok(ordered)
    }
}

fn render(report: &Report) -> String {
    match &report.result {
        Ok(Outcome::Done) => "ok".to_string(),
        Ok(Outcome::Value(v)) => match v.as_data() {
            Some(data) => data.to_string(),
            None => "<callable>".to_string(),
        },
        Err(e) => format!("{} ({e})", e.code()),
    }
}

fn print_step(label: &str, reports: &[Report]) {
    for report in reports {
        println!("[{}] {label} -> {}", report.component, render(report));
    }
}

fn push(handle: &ComponentHandle, message: Message) -> Result<()> {
    handle
        .push_message(message)
        .with_context(|| format!("push into '{}'", handle.name()))
}

/// Runs the scenario and returns the final value of `B.x`.
pub async fn run(capacity: Option<usize>) -> Result<serde_json::Value> {
    let capacity = capacity.filter(|&c| c > 0);
    let directory = Directory::shared();
    let a = ComponentBuilder::new("A")
        .queue_capacity(capacity)
        .build(&directory)?;
    let b = ComponentBuilder::new("B")
        .queue_capacity(capacity)
        .build(&directory)?;
    let (a_handle, b_handle) = (a.handle(), b.handle());

    let bound = capacity.map_or_else(|| "unbounded".to_string(), |c| c.to_string());
    println!("harp demo: {} components, queue capacity {bound}", directory.len());

    let (stop_tx, stop_rx) = watch::channel(false);
    let (report_tx, report_rx) = mpsc::unbounded_channel();
    let workers = [
        tokio::spawn(run_worker(a, stop_rx.clone(), report_tx.clone())),
        tokio::spawn(run_worker(b, stop_rx, report_tx)),
    ];
    let mut driver = Driver {
        id: ComponentId::new("driver"),
        reports: report_rx,
    };

    let get_x = || {
        driver
            .message("get")
            .with_key("x")
            .with_context(Context::system())
    };
    let first_get = get_x();
    let second_get = get_x();

    push(
        &a_handle,
        driver
            .message("connect_entity")
            .with_entity("B")
            .with_context(Context::system()),
    )?;
    print_step("connect_entity(B)", &driver.expect(&["A"]).await?);

    push(
        &a_handle,
        driver
            .message("message_entity")
            .with_entity("B")
            .with_message(first_get),
    )?;
    let reports = driver.expect(&["A", "B"]).await?;
    print_step("message_entity(B, get x)", &reports[..1]);
    print_step("get x", &reports[1..]);

    push(
        &b_handle,
        driver
            .message("add")
            .with_key("x")
            .with_accessor(Predicate::always())
            .with_mutator(Predicate::always())
            .with_immutable(false)
            .with_value(json!(42)),
    )?;
    print_step("add x = 42", &driver.expect(&["B"]).await?);

    push(
        &a_handle,
        driver
            .message("message_entity")
            .with_entity("B")
            .with_message(second_get),
    )?;
    let reports = driver.expect(&["A", "B"]).await?;
    print_step("message_entity(B, get x)", &reports[..1]);
    print_step("get x", &reports[1..]);

    let value = match &reports[1].result {
        Ok(outcome) => outcome.as_data().cloned(),
        Err(_) => None,
    };

    stop_tx.send(true).ok();
    for worker in workers {
        let component = worker.await.context("worker task panicked")?;
        info!(
            component = %component.name(),
            registers = ?component.registers().keys(),
            connected = ?component.connections().connected(),
            "worker joined"
        );
    }

    match value {
        Some(v) => Ok(v),
        None => bail!("final get did not return a value"),
    }
}
