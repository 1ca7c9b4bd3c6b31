//! Headless playback of a saved simulation result.

use anyhow::Context;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use topoviz_core::{AnimateResponse, Step};

use crate::graph::playback::{PlayOutcome, PlaybackController};
use crate::graph::scene::Scene;
use crate::util::config::ViewerConfig;

#[derive(Deserialize)]
#[serde(untagged)]
enum ReplayFile {
    Steps(Vec<Step>),
    Response(AnimateResponse),
}

/// Accepts either an `/animate` response body or a bare step array.
pub fn parse_replay(text: &str) -> anyhow::Result<Option<Vec<Step>>> {
    let file: ReplayFile =
        serde_json::from_str(text).context("expected {\"steps\": [...]} or a step array")?;
    Ok(match file {
        ReplayFile::Steps(steps) => Some(steps),
        ReplayFile::Response(resp) => resp.steps,
    })
}

pub fn run(path: &Path, cfg: &ViewerConfig) -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt::try_init();

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read replay file {}", path.display()))?;
    let steps = parse_replay(&text)
        .with_context(|| format!("failed to parse replay file {}", path.display()))?;

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to build replay runtime")?;

    let mut playback = PlaybackController::new(Duration::from_millis(cfg.step_interval_ms));
    let mut scene = Scene::default();
    if let PlayOutcome::NoSteps = playback.play(steps) {
        tracing::warn!("No steps to replay in {}", path.display());
        return Ok(());
    }

    rt.block_on(async {
        let mut last = tokio::time::Instant::now();
        while playback.is_running() {
            tokio::time::sleep(playback.interval()).await;
            let now = tokio::time::Instant::now();
            playback.advance(now - last, |step| {
                let nodes = step.resolved_nodes();
                let (report, _) = scene.render(&nodes, &step.edges);
                tracing::debug!(
                    entered = report.markers.entered,
                    exited = report.markers.exited,
                    links = scene.links.len(),
                    dangling = report.dangling_edges,
                    "step rendered"
                );
            });
            last = now;
        }
    });

    tracing::info!(steps = playback.log().len(), "replay finished");
    Ok(())
}
