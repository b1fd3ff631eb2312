use std::time::Duration;

use anyhow::{Context, ensure};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use tracing::{debug, info};

use gherkin_fleet::{ControlParams, RobotConfig};
use gherkin_kinematics::angle::FULL_TURN;
use gherkin_kinematics::{JointLimits, RotationLimits};

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
const ENV_PREFIX: &str = "GHERKIN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub fleet: FleetSettings,
    pub arm: ArmSettings,
    pub base: BaseSettings,
    pub display: DisplaySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FleetSettings {
    pub robots: usize,
    pub goals: usize,
    /// Fixed seed for the goal generator; random when absent.
    pub seed: Option<u64>,
}

impl Default for FleetSettings {
    fn default() -> Self {
        FleetSettings {
            robots: 3,
            goals: 12,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArmSettings {
    pub link1: f64,
    pub link2: f64,
    pub step_ms: u64,
    pub tolerance: f64,
    pub gain: f64,
    pub enforce_joint_limits: bool,
}

impl Default for ArmSettings {
    fn default() -> Self {
        ArmSettings {
            link1: 75.0,
            link2: 50.0,
            step_ms: 33,
            tolerance: 0.25,
            gain: 10.0,
            enforce_joint_limits: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BaseSettings {
    pub fast_rate: i32,
    pub fine_rate: i32,
    pub step_ms: u64,
}

impl Default for BaseSettings {
    fn default() -> Self {
        BaseSettings {
            fast_rate: 5,
            fine_rate: 1,
            step_ms: 66,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub enabled: bool,
    /// Width in pixels of the panel given to each robot.
    pub robot_width: u32,
    pub height: u32,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            enabled: true,
            robot_width: 320,
            height: 360,
        }
    }
}

impl Settings {
    /// Load `config/default.toml` if present, then apply `GHERKIN__SECTION__KEY`
    /// environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        info!("Loading configuration from {}", DEFAULT_CONFIG_PATH);
        let settings: Settings = Config::builder()
            .add_source(File::new(DEFAULT_CONFIG_PATH, FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(Config::try_deserialize)
            .context("invalid configuration")?;
        settings.validate()?;
        debug!(?settings, "Configuration loaded");
        Ok(settings)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.fleet.robots > 0, "fleet.robots must be at least 1");
        ensure!(self.base.fine_rate == 1, "base.fine_rate must be 1 for the base to settle on every heading");
        ensure!(
            (1..FULL_TURN).contains(&self.base.fast_rate),
            "base.fast_rate must be between 1 and 359"
        );
        ensure!(
            self.arm.link1 + self.arm.link2 >= 1.0,
            "arm.link1 + arm.link2 must be at least 1 so goals have integer coordinates"
        );
        ensure!(self.arm.gain >= 1.0, "arm.gain must be at least 1");
        ensure!(self.arm.tolerance > 0.0, "arm.tolerance must be positive");
        ensure!(
            self.display.robot_width > 0 && self.display.height > 0,
            "display dimensions must be positive"
        );
        Ok(())
    }

    pub fn robot_config(&self) -> RobotConfig {
        let arm_step = Duration::from_millis(self.arm.step_ms);
        let joint_limits = self.arm.enforce_joint_limits.then(|| {
            let mut limits = JointLimits::default();
            if !arm_step.is_zero() {
                limits.dt = arm_step.as_secs_f64();
            }
            limits
        });
        RobotConfig {
            link1: self.arm.link1,
            link2: self.arm.link2,
            rotation: RotationLimits {
                fast_rate: self.base.fast_rate,
                fine_rate: self.base.fine_rate,
                step_duration: Duration::from_millis(self.base.step_ms),
            },
            control: ControlParams {
                tolerance: self.arm.tolerance,
                gain: self.arm.gain,
                arm_step,
                joint_limits,
            },
        }
    }
}
