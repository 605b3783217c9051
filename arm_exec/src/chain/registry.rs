//! Registry of named arms
//!
//! Each arm owns its chain behind a mutex plus a separate solve lock, so that a solve can hold
//! the arm for its whole duration while the chain itself is only locked for short reads and
//! commits. Actuator waits never hold the chain lock.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use comms_if::eqpt::servo::Actuator;

use super::{ChainError, KinematicChain};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Actuators of an arm, keyed by actuator name.
pub type ActuatorMap = HashMap<String, Arc<dyn Actuator>>;

/// A named arm: its chain, the actuators bound to it and the lock serialising solves.
pub struct Arm {
    name: String,
    chain: Mutex<KinematicChain>,
    solve_lock: Mutex<()>,
    actuators: RwLock<ActuatorMap>,
}

/// Shared handle to an arm.
pub type ArmHandle = Arc<Arm>;

/// All arms known to the planner, one of which is active.
#[derive(Default)]
pub struct ChainRegistry {
    arms: HashMap<String, ArmHandle>,
    active: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Arm {
    pub fn new(name: &str, chain: KinematicChain) -> ArmHandle {
        Arc::new(Self {
            name: name.to_string(),
            chain: Mutex::new(chain),
            solve_lock: Mutex::new(()),
            actuators: RwLock::new(HashMap::new()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lock the chain for a short read or update.
    pub fn lock_chain(&self) -> Result<MutexGuard<KinematicChain>, ChainError> {
        self.chain.lock().map_err(|_| ChainError::Poisoned)
    }

    /// Copy of the chain's current state.
    pub fn snapshot(&self) -> Result<KinematicChain, ChainError> {
        Ok(self.lock_chain()?.clone())
    }

    /// Replace the chain's state with the given one.
    pub fn commit(&self, chain: KinematicChain) -> Result<(), ChainError> {
        *self.lock_chain()? = chain;
        Ok(())
    }

    /// Take the arm's solve lock, held for the duration of a solve.
    pub fn begin_solve(&self) -> Result<MutexGuard<()>, ChainError> {
        self.solve_lock.lock().map_err(|_| ChainError::Poisoned)
    }

    /// Make the actuator available to the joint bound to its name.
    pub fn bind_actuator(&self, actuator: Arc<dyn Actuator>) -> Result<(), ChainError> {
        let mut actuators = self.actuators.write().map_err(|_| ChainError::Poisoned)?;
        debug!("Binding actuator {} to arm {}", actuator.name(), self.name);
        actuators.insert(actuator.name().to_string(), actuator);
        Ok(())
    }

    /// Copy of every bound actuator.
    pub fn actuators(&self) -> Result<ActuatorMap, ChainError> {
        let actuators = self.actuators.read().map_err(|_| ChainError::Poisoned)?;
        Ok(actuators.clone())
    }
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a chain under the given name and make it the active arm.
    ///
    /// An existing arm of the same name is replaced.
    pub fn add(&mut self, name: &str, chain: KinematicChain) -> ArmHandle {
        let arm = Arm::new(name, chain);

        if self.arms.insert(name.to_string(), arm.clone()).is_some() {
            info!("Replacing existing arm {}", name);
        }
        self.active = Some(name.to_string());

        arm
    }

    /// Make the named arm the active one.
    ///
    /// Selecting an unknown arm is logged and ignored, the previous arm stays active. Returns
    /// `true` if the selection changed to the named arm.
    pub fn select(&mut self, name: &str) -> bool {
        if self.arms.contains_key(name) {
            self.active = Some(name.to_string());
            true
        } else {
            info!("No arm named {}, keeping {:?} active", name, self.active);
            false
        }
    }

    pub fn active(&self) -> Option<ArmHandle> {
        self.active.as_ref().and_then(|n| self.arms.get(n)).cloned()
    }

    pub fn get(&self, name: &str) -> Option<ArmHandle> {
        self.arms.get(name).cloned()
    }
}
