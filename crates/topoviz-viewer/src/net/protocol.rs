use topoviz_core::Step;

use crate::net::SimulateError;

#[derive(Debug, Clone)]
pub struct Incoming {
    pub generation: u64,
    pub kind: IncomingKind,
}

#[derive(Debug, Clone)]
pub enum IncomingKind {
    TopologyAccepted,
    Steps(Option<Vec<Step>>),
    Failed(SimulateError),
}

impl Incoming {
    pub fn topology_accepted(generation: u64) -> Self {
        Self {
            generation,
            kind: IncomingKind::TopologyAccepted,
        }
    }

    pub fn steps(generation: u64, steps: Option<Vec<Step>>) -> Self {
        Self {
            generation,
            kind: IncomingKind::Steps(steps),
        }
    }

    pub fn failed(generation: u64, err: SimulateError) -> Self {
        Self {
            generation,
            kind: IncomingKind::Failed(err),
        }
    }
}
