use bevy::prelude::Resource;
use crossbeam_channel::{Receiver, Sender};

use crate::net::{Incoming, SimulatorClient};

#[derive(Resource)]
pub struct NetRx(pub Receiver<Incoming>);

#[derive(Resource, Clone)]
pub struct NetTx(pub Sender<Incoming>);

/// Runtime the HTTP requests run on; the Bevy schedule never blocks on it.
#[derive(Resource)]
pub struct NetRuntime(pub tokio::runtime::Runtime);

#[derive(Resource, Clone)]
pub struct SimClient(pub SimulatorClient);
