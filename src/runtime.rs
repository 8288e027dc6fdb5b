// Fixed-rate loop with watchdog
// Note: the watchdog stops both sides when no command has arrived within the timeout,
// so a crashed teleop client cannot leave the robot driving on its last command

use std::time::{Duration, Instant};
use tokio::time::interval;
use tracing::{info, warn};

// local imports
use crate::config::{
    RuntimeConfig, TOPIC_CMD_DRIVE, TOPIC_ENCODERS, TOPIC_HEALTH, TOPIC_RT_LEFT, TOPIC_RT_RIGHT,
};
use crate::drive::{BridgePair, DifferentialDriveModel, Side};
use crate::messages::{DriveCommand, EncoderSample, RuntimeHealth};

pub struct Runtime {
    model: DifferentialDriveModel,
    latest_cmd: Option<DriveCommand>,
    cmd_received_at: Instant,
    cmd_timeout: Duration,
    threshold: f64,
    health: RuntimeHealth,
}

impl Runtime {
    pub fn new(model: DifferentialDriveModel, config: &RuntimeConfig) -> Self {
        Self {
            model,
            latest_cmd: None,
            cmd_received_at: Instant::now(),
            cmd_timeout: config.cmd_timeout,
            threshold: config.threshold,
            health: RuntimeHealth::CmdStale, // Start stale until first cmd
        }
    }

    pub fn health(&self) -> RuntimeHealth {
        self.health
    }

    /// Process incoming command
    ///
    /// Configuration is applied right away; motion replaces the held command
    /// and feeds the watchdog.
    pub fn on_command(&mut self, cmd: DriveCommand) -> crate::drive::Result<()> {
        info!("Received command: {:?}", &cmd);
        if !cmd.is_motion() {
            return cmd.apply(&self.model, self.threshold);
        }
        self.latest_cmd = Some(cmd);
        self.cmd_received_at = Instant::now();
        Ok(())
    }

    /// Apply the latest command, or stop if it has gone stale
    pub fn step(&mut self) -> crate::drive::Result<()> {
        let cmd_age = self.cmd_received_at.elapsed();

        match self.latest_cmd {
            Some(ref cmd) if cmd_age <= self.cmd_timeout => {
                self.health = RuntimeHealth::Ok;
                cmd.apply(&self.model, self.threshold)
            }
            Some(_) => {
                // Watchdog triggered - stop the robot
                if self.health != RuntimeHealth::CmdStale {
                    warn!("Command stale ({:?} old), stopping robot", cmd_age);
                }
                self.health = RuntimeHealth::CmdStale;
                self.model.stop()
            }
            None => {
                // No command ever received
                self.health = RuntimeHealth::CmdStale;
                self.model.stop()
            }
        }
    }
}

pub async fn run(config: RuntimeConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    info!("Opening Zenoh session...");
    let session = zenoh::open(zenoh::Config::default()).await?;

    info!("Setting up publishers and subscribers...");
    let cmd_subscriber = session.declare_subscriber(TOPIC_CMD_DRIVE).await?;
    let encoder_subscriber = session.declare_subscriber(TOPIC_ENCODERS).await?;
    let pub_left = session.declare_publisher(TOPIC_RT_LEFT).await?;
    let pub_right = session.declare_publisher(TOPIC_RT_RIGHT).await?;
    let pub_health = session.declare_publisher(TOPIC_HEALTH).await?;

    let BridgePair {
        left,
        right,
        mut rx,
    } = BridgePair::new();
    let left_encoder = left.bridge_encoder();
    let right_encoder = right.bridge_encoder();

    let model = DifferentialDriveModel::new(left, right, config.max_output);
    let mut runtime = Runtime::new(model, &config);
    let mut tick = interval(config.tick_period());

    info!(
        "Runtime started: {}Hz loop, {}ms watchdog timeout, max output {}",
        config.loop_hz,
        config.cmd_timeout.as_millis(),
        config.max_output
    );
    info!("Subscribed to: {}, {}", TOPIC_CMD_DRIVE, TOPIC_ENCODERS);
    info!(
        "Publishing to: {}, {}, {}",
        TOPIC_RT_LEFT, TOPIC_RT_RIGHT, TOPIC_HEALTH
    );

    loop {
        tick.tick().await;

        // 1. Drain all pending commands (non-blocking), keep latest
        while let Ok(Some(sample)) = cmd_subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<DriveCommand>(&payload) {
                Ok(cmd) => runtime.on_command(cmd)?,
                Err(e) => warn!("Failed to parse command: {}", e),
            }
        }

        // 2. Latest encoder counts
        while let Ok(Some(sample)) = encoder_subscriber.try_recv() {
            let payload = sample.payload().to_bytes();
            match serde_json::from_slice::<EncoderSample>(&payload) {
                Ok(counts) => {
                    left_encoder.update(counts.left);
                    right_encoder.update(counts.right);
                }
                Err(e) => warn!("Failed to parse encoder sample: {}", e),
            }
        }

        // 3. Drive the model (includes watchdog logic)
        runtime.step()?;

        // 4. Publish whatever the model sent to each side
        while let Ok(actuation) = rx.try_recv() {
            let actuation_json = serde_json::to_string(&actuation)?;
            match actuation.side {
                Side::Left => pub_left.put(actuation_json).await?,
                Side::Right => pub_right.put(actuation_json).await?,
            }
        }

        // 5. Publish health
        let health_json = serde_json::to_string(&runtime.health)?;
        pub_health.put(health_json).await?;
    }
}
