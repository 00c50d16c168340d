//! One tokio task per component.
//!
//! ```text
//! loop:
//!   run() ─ Ok / Err ──▶ report
//!     └── ComponentBlocked ──▶ park on queue.notified()
//!                              or exit on shutdown
//! ```

use harp_component::{ComponentError, Outcome};
use harp_runtime::Component;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

/// Result of one dispatched message.
#[derive(Debug)]
pub struct Report {
    pub component: String,
    pub result: Result<Outcome, ComponentError>,
}

/// Drives `component` until `shutdown` flips to `true`, then returns it.
pub async fn run_worker(
    mut component: Component,
    mut shutdown: watch::Receiver<bool>,
    reports: mpsc::UnboundedSender<Report>,
) -> Component {
    let queue = Arc::clone(component.queue());
    let name = component.name().to_string();
    debug!(component = %name, "worker started");

    loop {
        match component.run() {
            Err(e) if e.is_blocked() => {
                if *shutdown.borrow() {
                    break;
                }
                tokio::select! {
                    () = queue.notified() => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            result => {
                let report = Report {
                    component: name.clone(),
                    result,
                };
                if reports.send(report).is_err() {
                    warn!(component = %name, "report channel closed, stopping worker");
                    break;
                }
            }
        }
    }

    debug!(component = %name, "worker stopped");
    component
}
