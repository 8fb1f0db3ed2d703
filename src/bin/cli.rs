//! tempokv CLI Client
//!
//! Command-line interface for interacting with tempokv.

use std::io::{BufReader, BufWriter};
use std::net::TcpStream;

use clap::{Parser, Subcommand};
use tempokv::protocol::{read_response, write_command, Command, Status};
use tempokv::{Result, TempoError};

/// tempokv CLI
#[derive(Parser, Debug)]
#[command(name = "tempokv-cli")]
#[command(about = "CLI for the tempokv time-versioned key-value store")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7791")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a value for (key, timestamp)
    Put {
        /// The key to write
        key: String,

        /// The version timestamp
        timestamp: i64,

        /// The value to store
        value: String,
    },

    /// Get the value of a key as of a timestamp
    Get {
        /// The key to read
        key: String,

        /// The query timestamp
        timestamp: i64,
    },

    /// Ping the server
    Ping,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let stream = TcpStream::connect(&args.server)
        .map_err(|e| TempoError::Network(format!("connect {}: {}", args.server, e)))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = BufWriter::new(stream);

    let command = match args.command {
        Commands::Put {
            key,
            timestamp,
            value,
        } => Command::Put {
            key,
            timestamp,
            value,
        },
        Commands::Get { key, timestamp } => Command::GetAsOf { key, timestamp },
        Commands::Ping => Command::Ping,
    };

    write_command(&mut writer, &command)?;
    let response = read_response(&mut reader)?;

    let payload_text = response
        .payload
        .as_deref()
        .map(|p| String::from_utf8_lossy(p).into_owned());

    match response.status {
        Status::Ok => match payload_text {
            Some(text) => println!("{}", text),
            None => println!("OK"),
        },
        Status::Absent => println!("(absent)"),
        Status::Busy => {
            eprintln!("busy: store lock wait timed out, retry");
            std::process::exit(2);
        }
        Status::BadRequest => {
            eprintln!("bad request: {}", payload_text.unwrap_or_default());
            std::process::exit(1);
        }
        Status::Error => {
            eprintln!("server error: {}", payload_text.unwrap_or_default());
            std::process::exit(1);
        }
    }

    Ok(())
}
