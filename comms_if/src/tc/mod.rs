//! # Telecommand module
//!
//! This module provides telecommand functionality to the communications
//! interface.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod ik;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde_json::{self, Value};
use thiserror::Error;

// Internal
use crate::eqpt::servo::ServoEvent;
use ik::IkCmd;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Type tag of a servo feedback message.
const SERVO_EVENT_TYPE: &str = "ServoEvent";

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A telecommand, i.e. an instruction sent to the planner.
#[derive(Debug, Clone, PartialEq)]
pub enum Tc {
    /// A command to the inverse kinematics planner
    Ik(IkCmd),

    /// Position feedback from one of the actuators
    ServoEvent(ServoEvent),
}

/// Possible parsing errors.
#[derive(Debug, Error)]
pub enum TcParseError {
    #[error("TC contains invalid JSON: {0}")]
    InvalidJson(serde_json::Error),

    #[error("TC has an invalid type ({0})")]
    InvalidType(String),

    #[error("TC of type {0} has an invalid payload: {1}")]
    InvalidPayload(String, serde_json::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Tc {
    /// Parse a new TC from a JSON packet
    pub fn from_json(json_str: &str) -> Result<Self, TcParseError> {
        let val: Value = serde_json::from_str(json_str).map_err(TcParseError::InvalidJson)?;

        let tc_type = match val["type"].as_str() {
            Some(s) => s.to_string(),
            None => {
                return Err(TcParseError::InvalidType(String::from(
                    "Expected \"type\" to be a string",
                )))
            }
        };

        if tc_type == SERVO_EVENT_TYPE {
            return serde_json::from_value(val["payload"].clone())
                .map(Tc::ServoEvent)
                .map_err(|e| TcParseError::InvalidPayload(tc_type, e));
        }

        serde_json::from_value(val)
            .map(Tc::Ik)
            .map_err(|e| TcParseError::InvalidPayload(tc_type, e))
    }
}
