//! Telemetry published by the planner

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{info, warn};
use nalgebra::DMatrix;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use crate::geom::Pose;

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// Destination of planner telemetry.
///
/// Delivery is the sink's business, the planner never waits on it.
pub trait TelemetrySink: Send + Sync {
    fn publish(&self, tm: Telemetry);
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Telemetry {
    /// Joint angles in degrees, wrapped into `[0, 360)`
    JointAngles {
        arm: String,
        angles_deg: HashMap<String, f64>,
    },

    /// Link end points, `(n + 1) x 3` with the base origin first
    JointPositions { arm: String, positions_mm: DMatrix<f64> },

    /// Target computed by a velocity tracking tick
    TrackingTarget(Pose),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Sends telemetry down a channel.
pub struct ChannelSink {
    sender: Mutex<Sender<Telemetry>>,
}

/// Writes telemetry to the log.
#[derive(Debug, Default)]
pub struct LogSink;

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ChannelSink {
    /// Create a new sink and the receiver its telemetry arrives on.
    pub fn new() -> (Self, Receiver<Telemetry>) {
        let (tx, rx) = channel();
        (
            Self {
                sender: Mutex::new(tx),
            },
            rx,
        )
    }
}

impl TelemetrySink for ChannelSink {
    fn publish(&self, tm: Telemetry) {
        match self.sender.lock() {
            Ok(s) => {
                // A dropped receiver just means nobody is listening
                s.send(tm).ok();
            }
            Err(_) => warn!("Telemetry sender is poisoned"),
        }
    }
}

impl TelemetrySink for LogSink {
    fn publish(&self, tm: Telemetry) {
        match serde_json::to_string(&tm) {
            Ok(s) => info!("TM: {}", s),
            Err(e) => warn!("Could not serialise telemetry: {}", e),
        }
    }
}
