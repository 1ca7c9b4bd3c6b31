mod app;
mod graph;
mod net;
mod render;
mod replay;
mod ui;
mod util;

use anyhow::Context;
use bevy::prelude::*;
use bevy_egui::EguiPlugin;

use app::resources::{NetRuntime, NetRx, NetTx, SimClient};
use app::TopoVizViewerPlugin;
use net::SimulatorClient;
use util::{args, config};

fn main() -> anyhow::Result<()> {
    let args = args::parse_args()?;
    let mut cfg = config::load_or_default();
    args.apply_to(&mut cfg);

    if let Some(path) = &args.replay {
        return replay::run(path, &cfg);
    }

    let initial_topology = match &args.import {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read topology {}", path.display()))?,
        ),
        None => None,
    };

    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("topoviz-net")
        .enable_all()
        .build()
        .context("failed to build network runtime")?;
    let (tx, rx) = crossbeam_channel::unbounded();
    let client = SimulatorClient::new(cfg.server_url.clone());

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "TopoViz".into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin)
        .insert_resource(NetRuntime(rt))
        .insert_resource(NetTx(tx))
        .insert_resource(NetRx(rx))
        .insert_resource(SimClient(client))
        .add_plugins(TopoVizViewerPlugin {
            cfg,
            initial_topology,
        })
        .run();

    Ok(())
}
