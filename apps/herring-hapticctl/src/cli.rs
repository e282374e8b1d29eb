use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[command(name = "herring-hapticctl")]
#[command(about = "Drive the herring haptic engine and its sibling drivers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand, Clone)]
pub enum CliCommand {
    /// Stream a sample pattern through the TouchSense engine.
    Play {
        /// Engine config (JSON); defaults apply to missing fields.
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long, default_value_t = 0)]
        actuator: u8,

        /// Comma-separated force samples in -128..=127.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
        samples: Vec<i8>,

        /// Play the pattern this many times back to back.
        #[arg(long, default_value_t = 1)]
        repeat: u32,

        /// Ask for a graceful stop after the last write instead of letting
        /// the watchdog end playback.
        #[arg(long)]
        graceful_stop: bool,
    },
    /// Run the timed vibrator for a number of milliseconds.
    Buzz {
        #[arg(long)]
        millis: u64,

        /// Strength in percent.
        #[arg(long)]
        duty: Option<u32>,
    },
    /// Feed raw touch-key report bytes through the controller.
    Keys {
        /// Report bytes, e.g. `0x01,0x09`.
        #[arg(long, value_delimiter = ',', value_parser = parse_byte, required = true)]
        reports: Vec<u8>,

        #[arg(long)]
        backlight_off: bool,
    },
    /// Read or update the parameter store.
    Param {
        #[arg(long)]
        file: PathBuf,

        /// Numeric parameter index (4 switch_sel, 5 debug, 9 reboot mode).
        #[arg(long)]
        index: Option<i32>,

        /// New value; prints the store when omitted.
        #[arg(long, allow_hyphen_values = true)]
        value: Option<i32>,
    },
}

fn parse_byte(raw: &str) -> Result<u8, String> {
    let parsed = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => raw.parse::<u8>(),
    };
    parsed.map_err(|error| format!("invalid report byte '{raw}': {error}"))
}
