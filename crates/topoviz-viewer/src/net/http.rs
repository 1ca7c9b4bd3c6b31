use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use topoviz_core::{AnimateRequest, AnimateResponse, Graph, Step};

use crate::net::{Incoming, SimulateError};

/// HTTP client for the routing simulator.
#[derive(Debug, Clone)]
pub struct SimulatorClient {
    base: String,
    http: reqwest::Client,
}

/// Everything one simulate action needs, captured when it was requested.
#[derive(Debug, Clone)]
pub struct SimulateRequest {
    pub generation: u64,
    pub topology: Graph,
    pub protocol: String,
}

impl SimulatorClient {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn submit_topology(&self, graph: &Graph) -> Result<()> {
        let url = self.endpoint("add_topology");
        let resp = self
            .http
            .post(&url)
            .json(graph)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url}"))?;
        // the acknowledgement is not interpreted, but it has to be JSON
        let _: serde_json::Value = resp.json().await.context("decode topology ack")?;
        Ok(())
    }

    pub async fn request_steps(&self, protocol: &str) -> Result<Option<Vec<Step>>> {
        let url = self.endpoint("animate");
        let body = AnimateRequest {
            protocol: protocol.to_string(),
        };
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url}"))?;
        let decoded: AnimateResponse = resp.json().await.context("decode animation steps")?;
        Ok(decoded.steps)
    }
}

/// Submits the topology, then asks for steps, reporting each stage on `tx`.
pub async fn run_simulate(client: SimulatorClient, req: SimulateRequest, tx: Sender<Incoming>) {
    let generation = req.generation;

    if let Err(e) = client.submit_topology(&req.topology).await {
        tracing::error!(generation, error = ?e, "error sending topology");
        let _ = tx.send(Incoming::failed(generation, SimulateError::Submit(format!("{e:#}"))));
        return;
    }
    let _ = tx.send(Incoming::topology_accepted(generation));

    match client.request_steps(&req.protocol).await {
        Ok(steps) => {
            tracing::debug!(
                generation,
                steps = steps.as_ref().map(Vec::len).unwrap_or(0),
                "animate steps received"
            );
            let _ = tx.send(Incoming::steps(generation, steps));
        }
        Err(e) => {
            tracing::error!(generation, error = ?e, "error fetching animation steps");
            let _ = tx.send(Incoming::failed(generation, SimulateError::Animate(format!("{e:#}"))));
        }
    }
}

pub fn spawn_simulate(
    rt: &tokio::runtime::Handle,
    client: SimulatorClient,
    req: SimulateRequest,
    tx: Sender<Incoming>,
) {
    rt.spawn(run_simulate(client, req, tx));
}
