//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

use brickwire_core::MotorPort;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the frame for a timed motor turn
    Encode {
        /// Motor port (A-D)
        #[arg(short, long, default_value = "A")]
        port: MotorPort,
        /// Run time in seconds
        #[arg(short, long, default_value_t = 1.0)]
        seconds: f64,
        /// Turn counter-clockwise
        #[arg(long)]
        ccw: bool,
        /// Override the configured speed
        #[arg(long)]
        speed: Option<i32>,
    },
    /// Decode a base64 frame and print its fields
    Decode {
        /// Wire text as sent to the hub
        text: String,
    },
    /// Run scan, connect and a command sequence against a simulated hub
    Simulate {
        /// Motor port (A-D)
        #[arg(short, long, default_value = "A")]
        port: MotorPort,
        /// Run time in seconds
        #[arg(short, long, default_value_t = 1.0)]
        seconds: f64,
        /// Make the simulated hub refuse the connection
        #[arg(long)]
        refuse_connect: bool,
    },
}
