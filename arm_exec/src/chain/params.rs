//! Parameters describing an arm

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{ChainError, Joint, KinematicChain};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An arm as read from the parameter file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArmParams {
    pub name: String,

    /// Joints from the base to the tip.
    #[serde(default)]
    pub joints: Vec<JointParams>,
}

/// A single joint as read from the parameter file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JointParams {
    pub name: String,

    /// Units: millimeters
    pub d_mm: f64,

    /// Initial joint angle.
    ///
    /// Units: degrees
    pub theta_deg: f64,

    /// Units: millimeters
    pub r_mm: f64,

    /// Units: degrees
    pub alpha_deg: f64,

    /// Lower limit relative to the initial angle.
    ///
    /// Units: degrees
    pub min_deg: Option<f64>,

    /// Upper limit relative to the initial angle.
    ///
    /// Units: degrees
    pub max_deg: Option<f64>,

    /// Units: degrees/second
    pub velocity_limit_degs: Option<f64>,

    /// Units: degrees
    pub neutral_deg: Option<f64>,

    /// Name of the actuator driving this joint
    pub actuator: Option<String>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl JointParams {
    pub fn build(&self) -> Joint {
        let mut joint = Joint::new(
            &self.name,
            self.d_mm,
            self.theta_deg,
            self.r_mm,
            self.alpha_deg,
        );

        if let (Some(min), Some(max)) = (self.min_deg, self.max_deg) {
            joint = joint.with_limits_deg(min, max);
        }
        if let Some(v) = self.velocity_limit_degs {
            joint = joint.with_velocity_limit_degs(v);
        }
        if let Some(n) = self.neutral_deg {
            joint = joint.with_neutral_deg(n);
        }
        if let Some(ref a) = self.actuator {
            joint = joint.with_actuator(a);
        }

        joint
    }
}

impl ArmParams {
    /// Build the chain described by these parameters.
    pub fn build(&self) -> Result<KinematicChain, ChainError> {
        let mut chain = KinematicChain::new();

        for j in self.joints.iter() {
            chain.add_joint(j.build())?;
        }

        Ok(chain)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_build_from_toml() {
        let params: ArmParams = util::params::from_str(
            r#"
            name = "left"

            [[joints]]
            name = "omoplate"
            d_mm = 0.0
            theta_deg = 0.0
            r_mm = 40.0
            alpha_deg = 0.0
            min_deg = 10.0
            max_deg = 70.0
            velocity_limit_degs = 30.0
            actuator = "omoplate"

            [[joints]]
            name = "shoulder"
            d_mm = 77.9
            theta_deg = -90.0
            r_mm = 0.0
            alpha_deg = 90.0
            "#,
        )
        .unwrap();

        let chain = params.build().unwrap();
        assert_eq!(chain.len(), 2);

        let omoplate = chain.joint(0);
        assert_eq!(omoplate.actuator(), Some("omoplate"));
        assert_eq!(omoplate.velocity_limit_degs(), 30.0);
        assert_eq!(omoplate.range_deg().0.round(), 10.0);
        // Pulled into range from the initial angle
        assert!((omoplate.position_deg() - 10.0).abs() < 1e-9);

        assert!(chain.joint(1).actuator().is_none());
    }
}
