//! # Velocity tracking
//!
//! Moves the active arm's end effector along a commanded velocity. A worker thread ticks at a
//! fixed period, integrating the velocity over one period from the current end effector
//! position and moving the arm to the result.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod input;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, error, info, trace, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::geom::Pose;
use crate::planner::{Planner, PlannerError, Telemetry};

pub use input::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingParams {
    /// Period of the tracking loop
    pub period_ms: u64,

    /// Input axis deadband
    pub threshold: f64,

    /// Scale from input axis value to velocity, in millimeters/second
    pub gain: f64,
}

/// The velocity tracking loop.
pub struct TrackingLoop {
    shared: Arc<Shared>,

    worker_jh: Mutex<Option<JoinHandle<()>>>,
}

struct Shared {
    planner: Arc<Planner>,

    params: TrackingParams,

    running: AtomicBool,

    /// Units: millimeters/second
    velocity_mms: RwLock<Vector3<f64>>,

    mapper: Mutex<VelocityMapper>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Could not start the tracking thread: {0}")]
    ThreadSpawnError(std::io::Error),

    #[error("The tracking thread panicked")]
    ThreadPanicked,

    #[error("A lock on the tracking state is poisoned")]
    PoisonError,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TrackingParams {
    fn default() -> Self {
        Self {
            period_ms: 250,
            threshold: 0.1,
            gain: 100.0,
        }
    }
}

impl TrackingLoop {
    pub fn new(planner: Arc<Planner>, params: TrackingParams) -> Self {
        let mapper = VelocityMapper::new(params.threshold, params.gain);

        Self {
            shared: Arc::new(Shared {
                planner,
                params,
                running: AtomicBool::new(false),
                velocity_mms: RwLock::new(Vector3::zeros()),
                mapper: Mutex::new(mapper),
            }),
            worker_jh: Mutex::new(None),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    pub fn velocity_mms(&self) -> Result<Vector3<f64>, TrackingError> {
        Ok(*self.shared.velocity_mms.read()?)
    }

    pub fn set_velocity_mms(&self, velocity_mms: Vector3<f64>) -> Result<(), TrackingError> {
        *self.shared.velocity_mms.write()? = velocity_mms;
        Ok(())
    }

    /// Start the loop. Returns `false` if it was already running.
    pub fn start(&self) -> Result<bool, TrackingError> {
        let mut worker_jh = self.worker_jh.lock()?;

        if self.shared.running.swap(true, Ordering::SeqCst) {
            debug!("Tracking already running");
            return Ok(false);
        }

        // A loop which stopped itself leaves its handle behind
        if let Some(jh) = worker_jh.take() {
            if jh.join().is_err() {
                warn!("Previous tracking thread panicked");
            }
        }

        let shared = self.shared.clone();
        let jh = thread::Builder::new()
            .name("tracking".into())
            .spawn(move || tracking_thread(shared))
            .map_err(|e| {
                self.shared.running.store(false, Ordering::SeqCst);
                TrackingError::ThreadSpawnError(e)
            })?;

        *worker_jh = Some(jh);

        info!("Tracking started");
        Ok(true)
    }

    /// Stop the loop, waiting for the current tick to finish.
    pub fn stop(&self) -> Result<(), TrackingError> {
        self.shared.running.store(false, Ordering::SeqCst);

        let jh = self.worker_jh.lock()?.take();

        if let Some(jh) = jh {
            jh.join().map_err(|_| TrackingError::ThreadPanicked)?;
            info!("Tracking stopped");
        }

        Ok(())
    }

    /// Handle an input event, starting or stopping the loop or updating the velocity.
    pub fn on_input(&self, id: &str, value: f32) -> Result<(), TrackingError> {
        let action = self.shared.mapper.lock()?.on_input(id, value);

        match action {
            InputAction::StartTracking => {
                self.start()?;
            }
            InputAction::StopTracking => self.stop()?,
            InputAction::Velocity(v) => self.set_velocity_mms(v)?,
            InputAction::None => (),
        }

        Ok(())
    }
}

impl Drop for TrackingLoop {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Could not stop tracking cleanly: {}", e);
        }
    }
}

impl<G> From<PoisonError<G>> for TrackingError {
    fn from(_: PoisonError<G>) -> Self {
        TrackingError::PoisonError
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn tracking_thread(shared: Arc<Shared>) {
    let period = Duration::from_millis(shared.params.period_ms);

    while shared.running.load(Ordering::SeqCst) {
        let tick_start = Instant::now();

        match tick(&shared, period.as_secs_f64()) {
            Ok(reached) => trace!("Tracking tick done, target reached: {}", reached),
            Err(PlannerError::SchedError(e)) => {
                error!("Tracking stopped by actuation: {}", e);
                shared.running.store(false, Ordering::SeqCst);
                break;
            }
            Err(e) => warn!("Tracking tick failed: {}", e),
        }

        if let Some(remaining) = period.checked_sub(tick_start.elapsed()) {
            thread::sleep(remaining);
        }
    }
}

/// Move the arm one period along the current velocity.
fn tick(shared: &Shared, period_s: f64) -> Result<bool, PlannerError> {
    let velocity_mms = *shared.velocity_mms.read()?;

    let current = shared.planner.current_position()?;
    let target = Pose::from_position(current.position_mm + velocity_mms * period_s);

    shared.planner.publish(Telemetry::TrackingTarget(target));
    shared.planner.move_to(&target)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chain::test::planar_chain;
    use crate::planner::{ChannelSink, PlannerParams};

    fn setup() -> (Arc<Planner>, std::sync::mpsc::Receiver<Telemetry>) {
        let (sink, rx) = ChannelSink::new();
        let planner = Arc::new(Planner::new(PlannerParams::default(), Arc::new(sink)));

        let mut chain = planar_chain();
        chain.set_positions_deg(&[0.0, 90.0, -90.0]).unwrap();
        planner.add_chain("planar", chain).unwrap();

        (planner, rx)
    }

    #[test]
    fn test_tick_integrates_velocity() {
        let (planner, rx) = setup();
        let tracking = TrackingLoop::new(planner.clone(), TrackingParams::default());
        tracking
            .set_velocity_mms(Vector3::new(0.0, 100.0, 0.0))
            .unwrap();

        assert!(tick(&tracking.shared, 0.1).unwrap());

        let expected = Pose::new(200.0, 110.0, 0.0);
        match rx.try_recv() {
            Ok(Telemetry::TrackingTarget(p)) => assert!(p.distance_to(&expected) < 1e-9),
            other => panic!("Expected a tracking target, got {:?}", other),
        }
        assert!(planner.current_position().unwrap().distance_to(&expected) <= 2.0);
    }

    #[test]
    fn test_start_stop() {
        let (planner, rx) = setup();
        let tracking = TrackingLoop::new(
            planner,
            TrackingParams {
                period_ms: 10,
                ..Default::default()
            },
        );

        assert!(tracking.start().unwrap());
        assert!(!tracking.start().unwrap());
        assert!(tracking.is_running());

        thread::sleep(Duration::from_millis(50));
        tracking.stop().unwrap();
        assert!(!tracking.is_running());

        // At least one tick published its target
        assert!(rx
            .try_iter()
            .any(|tm| matches!(tm, Telemetry::TrackingTarget(_))));

        // And it can be restarted
        assert!(tracking.start().unwrap());
        tracking.stop().unwrap();
    }

    #[test]
    fn test_input_drives_loop() {
        let (planner, _rx) = setup();
        let tracking = TrackingLoop::new(planner, TrackingParams::default());

        tracking.on_input("x", 0.5).unwrap();
        assert_eq!(tracking.velocity_mms().unwrap(), Vector3::new(50.0, 0.0, 0.0));

        tracking.on_input("0", 1.0).unwrap();
        assert!(tracking.is_running());
        tracking.on_input("1", 1.0).unwrap();
        assert!(!tracking.is_running());
    }
}
