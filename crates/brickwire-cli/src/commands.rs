//! Command handlers for the Brickwire CLI

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use brickwire_core::{
    build_frame, encode_motor_run, from_wire_text, to_wire_text, Frame, MotorPort,
    OP_OUTPUT_TIME_SPEED,
};
use brickwire_link::{
    event_channel, ConnectBehavior, ConnectionManager, ConnectionState, HubDispatcher,
    LoopbackTransport, TransportEvent,
};

use crate::cli::{Cli, Commands};
use crate::config::AppConfig;
use crate::error::{CliError, Result};

/// Command dispatcher for handling CLI commands
pub struct CommandDispatcher;

impl CommandDispatcher {
    /// Execute a CLI command
    pub async fn execute(cli: Cli, config: AppConfig) -> Result<()> {
        match cli.command {
            Commands::Encode {
                port,
                seconds,
                ccw,
                speed,
            } => Self::handle_encode_command(&config, port, seconds, ccw, speed),
            Commands::Decode { text } => Self::handle_decode_command(&text),
            Commands::Simulate {
                port,
                seconds,
                refuse_connect,
            } => Self::handle_simulate_command(&config, port, seconds, refuse_connect).await,
        }
    }

    /// Handle the encode command
    fn handle_encode_command(
        config: &AppConfig,
        port: MotorPort,
        seconds: f64,
        ccw: bool,
        speed: Option<i32>,
    ) -> Result<()> {
        let speed = speed.unwrap_or(config.link.default_speed);
        let speed = if ccw { -speed } else { speed };
        let duration_ms = (seconds * 1000.0) as i64;

        let instruction = encode_motor_run(
            OP_OUTPUT_TIME_SPEED,
            port,
            duration_ms,
            speed,
            config.link.ramp_ms,
        );
        let frame = build_frame(0, &instruction)?;

        println!("instruction: {}", instruction);
        println!("frame:       {}", frame);
        println!("base64:      {}", to_wire_text(frame.as_bytes()));
        Ok(())
    }

    /// Handle the decode command
    fn handle_decode_command(text: &str) -> Result<()> {
        let bytes = from_wire_text(text)?;
        let frame = Frame::parse(&bytes)?;

        println!("length:      {}", frame.declared_len());
        println!("header:      {}", hex::encode(frame.header()));
        println!("address:     {}", frame.address());
        match frame.instruction().first() {
            Some(opcode) => println!("opcode:      0x{:02X}", opcode),
            None => println!("opcode:      (none)"),
        }
        println!("instruction: {}", hex::encode(frame.instruction()));
        Ok(())
    }

    /// Handle the simulate command
    async fn handle_simulate_command(
        config: &AppConfig,
        port: MotorPort,
        seconds: f64,
        refuse_connect: bool,
    ) -> Result<()> {
        let behavior = if refuse_connect {
            ConnectBehavior::Reject("simulated hub refused".to_string())
        } else {
            ConnectBehavior::Accept
        };

        let (event_tx, event_rx) = event_channel();
        let transport = Arc::new(
            LoopbackTransport::new(event_tx)
                .with_simulated_hub(config.simulated_hub.peer_id.as_str())
                .with_connect_behavior(behavior),
        );
        let (link, task) =
            ConnectionManager::spawn(transport.clone(), event_rx, config.link.clone());
        let dispatcher = HubDispatcher::new(Arc::clone(&link), &config.link);

        let state = Self::wait_for_outcome(&link, &transport, config).await?;
        info!("Link settled in {}", state);

        let beep = dispatcher.beep().await;
        let turn = dispatcher.turn_clockwise(port, seconds).await;
        let back = dispatcher.turn_counter_clockwise(port, seconds).await;

        if state != ConnectionState::Connected {
            warn!("Hub not connected, commands were dropped");
        }

        println!("link state:  {}", state);
        println!("beep:        {:?}", beep);
        println!("turn cw:     {:?}", turn);
        println!("turn ccw:    {:?}", back);
        for (i, message) in transport.sent_messages().iter().enumerate() {
            println!("sent[{}]:     {} ({})", i, message.message, message.encoding.as_str());
        }

        // Power the simulated hub off and let the link observe it
        let mut states = link.subscribe();
        transport.emit(TransportEvent::LinkLost {
            reason: "simulated hub powered off".to_string(),
        })?;
        let closed = matches!(
            tokio::time::timeout(
                Duration::from_millis(config.simulated_hub.connect_wait_ms),
                states.wait_for(|state| *state == ConnectionState::Disconnected),
            )
            .await,
            Ok(Ok(_))
        );
        if !closed {
            warn!("Link did not observe the hub going away");
        }
        println!("final state: {}", link.state().await);

        task.abort();
        Ok(())
    }

    /// Wait until the connect attempt has an outcome
    async fn wait_for_outcome(
        link: &ConnectionManager,
        transport: &LoopbackTransport,
        config: &AppConfig,
    ) -> Result<ConnectionState> {
        let deadline = config.link.scan_settle_delay()
            + Duration::from_millis(config.simulated_hub.connect_wait_ms);

        // Connecting can be coalesced away by a fast refusal, so a settled
        // Disconnected is recognised by the attempt count instead
        let mut states = link.subscribe();
        let settled = tokio::time::timeout(
            deadline,
            states.wait_for(|state| match state {
                ConnectionState::Connected => true,
                ConnectionState::Disconnected => transport.connect_calls() > 0,
                _ => false,
            }),
        )
        .await
        .map(|result| result.map(|state| *state));

        match settled {
            Ok(Ok(state)) => Ok(state),
            Ok(Err(_)) => Err(CliError::Simulation("link task ended".to_string())),
            Err(_) => Err(CliError::Simulation(format!(
                "link still {} after {:?}",
                link.state().await,
                deadline
            ))),
        }
    }
}
