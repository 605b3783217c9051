//! Actuator pacing

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::SchedError;
use crate::chain::{ActuatorMap, KinematicChain};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Pacing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacerParams {
    /// Longest single sleep while waiting for an actuator.
    ///
    /// Units: milliseconds
    pub poll_period_ms: u64,
}

/// Issues joint commands, waiting for each actuator's settle window to pass first.
///
/// The wait can be interrupted from another thread through the flag returned by
/// [`Pacer::interrupt_flag`], in which case the dispatch stops without commanding the remaining
/// joints.
#[derive(Debug, Clone)]
pub struct Pacer {
    poll_period: Duration,
    interrupt: Arc<AtomicBool>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for PacerParams {
    fn default() -> Self {
        Self { poll_period_ms: 1 }
    }
}

impl Default for Pacer {
    fn default() -> Self {
        Self::new(&PacerParams::default())
    }
}

impl Pacer {
    pub fn new(params: &PacerParams) -> Self {
        Self {
            poll_period: Duration::from_millis(params.poll_period_ms.max(1)),
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag which, once raised, interrupts any current or future wait.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupt.clone()
    }

    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::SeqCst);
    }

    /// Lower the interrupt flag so that dispatches can run again.
    pub fn reset(&self) {
        self.interrupt.store(false, Ordering::SeqCst);
    }

    /// Command every joint of the chain to its current position.
    ///
    /// Each joint's actuator (the one named by the joint's binding, or sharing the joint's name)
    /// is only commanded once `settle` has passed since its last activity. Joints without an
    /// actuator are skipped. Returns the number of commands issued.
    pub fn dispatch(
        &self,
        chain: &KinematicChain,
        actuators: &ActuatorMap,
        settle: Duration,
    ) -> Result<usize, SchedError> {
        let mut issued = 0;

        for joint in chain.joints() {
            let name = joint.actuator().unwrap_or_else(|| joint.name());

            let actuator = match actuators.get(name) {
                Some(a) => a,
                None => {
                    trace!("Joint {} has no actuator, not commanding it", joint.name());
                    continue;
                }
            };

            self.wait_until(name, actuator.last_activity() + settle)?;

            actuator.command_to(joint.position_deg());
            issued += 1;
        }

        debug!("Issued {} actuator commands", issued);

        Ok(issued)
    }

    /// Sleep until the deadline, in steps no longer than the poll period.
    fn wait_until(&self, actuator: &str, deadline: Instant) -> Result<(), SchedError> {
        loop {
            if self.interrupt.load(Ordering::SeqCst) {
                return Err(SchedError::Interrupted(actuator.to_string()));
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }

            thread::sleep(self.poll_period.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::chain::{Joint, KinematicChain};
    use crate::servo_sim::SimServo;
    use comms_if::eqpt::servo::Actuator;
    use std::collections::HashMap;

    fn setup() -> (KinematicChain, Arc<SimServo>, Arc<SimServo>, ActuatorMap) {
        let mut chain = KinematicChain::new();
        chain
            .add_joint(Joint::new("base", 0.0, 0.0, 10.0, 0.0).with_position_deg(30.0))
            .unwrap();
        chain
            .add_joint(
                Joint::new("elbow", 0.0, 0.0, 10.0, 0.0)
                    .with_actuator("elbow_servo")
                    .with_position_deg(-15.0),
            )
            .unwrap();
        chain
            .add_joint(Joint::new("hand", 0.0, 0.0, 10.0, 0.0))
            .unwrap();

        let base = Arc::new(SimServo::new("base", 60.0, (0.0, 180.0)));
        let elbow = Arc::new(SimServo::new("elbow_servo", 60.0, (0.0, 180.0)));

        let mut actuators: ActuatorMap = HashMap::new();
        actuators.insert("base".into(), base.clone());
        actuators.insert("elbow_servo".into(), elbow.clone());

        (chain, base, elbow, actuators)
    }

    #[test]
    fn test_waits_for_settle_window() {
        let (chain, base, elbow, actuators) = setup();
        let pacer = Pacer::default();

        let start = Instant::now();
        base.set_last_activity(start);
        elbow.set_last_activity(start);

        let issued = pacer
            .dispatch(&chain, &actuators, Duration::from_millis(50))
            .unwrap();
        assert_eq!(issued, 2);

        let (t_base, a_base) = base.commands()[0];
        assert!(t_base.duration_since(start) >= Duration::from_millis(50));
        assert_eq!(a_base, 30.0);

        let (t_elbow, a_elbow) = elbow.commands()[0];
        assert!(t_elbow >= t_base);
        assert!((a_elbow + 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_wait_when_settled() {
        let (chain, base, _, actuators) = setup();
        let pacer = Pacer::default();

        let start = Instant::now();
        base.set_last_activity(start);
        pacer.dispatch(&chain, &actuators, Duration::ZERO).unwrap();

        assert!(base.commands()[0].0.duration_since(start) < Duration::from_millis(50));
        assert_eq!(base.current_angle_deg(), 30.0);
    }

    #[test]
    fn test_interrupted_wait() {
        let (chain, base, elbow, actuators) = setup();
        let pacer = Pacer::default();
        base.set_last_activity(Instant::now());

        let flag = pacer.interrupt_flag();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            flag.store(true, Ordering::SeqCst);
        });

        let result = pacer.dispatch(&chain, &actuators, Duration::from_secs(10));
        handle.join().unwrap();

        assert!(matches!(result, Err(SchedError::Interrupted(ref n)) if n == "base"));
        assert!(base.commands().is_empty());
        assert!(elbow.commands().is_empty());

        pacer.reset();
        assert_eq!(
            pacer.dispatch(&chain, &actuators, Duration::ZERO).unwrap(),
            2
        );
    }
}
