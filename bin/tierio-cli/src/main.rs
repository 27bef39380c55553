//! tierio CLI - Admin Command Line Interface
//!
//! Inspect storage node records as they travel on the wire and check
//! client configuration files.

use anyhow::{Context, Result, bail};
use bytes::BytesMut;
use clap::{Parser, Subcommand};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use tierio_common::{ClientConfig, DataNodeInfo};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "tierio-cli")]
#[command(about = "tierio Admin CLI")]
#[command(version)]
struct Args {
    /// Log level
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Storage node descriptor operations
    Node {
        #[command(subcommand)]
        action: NodeCommands,
    },
    /// Client configuration operations
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum NodeCommands {
    /// Decode a hex-encoded 20-byte node record
    Decode {
        /// Record as hex (40 characters)
        record: String,
    },
    /// Encode a node record from its fields
    Encode {
        #[arg(long, default_value = "0")]
        storage_type: i32,
        #[arg(long, default_value = "0")]
        storage_class: i32,
        #[arg(long, default_value = "0")]
        location_class: i32,
        /// IPv4 address
        #[arg(long)]
        ip: Ipv4Addr,
        #[arg(long)]
        port: u32,
    },
    /// Print the identity key for an endpoint
    Key {
        /// IPv4 address
        #[arg(long)]
        ip: Ipv4Addr,
        #[arg(long)]
        port: u32,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show the effective client configuration
    Show {
        /// Configuration file; defaults apply when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn decode_node(record: &str) -> Result<DataNodeInfo> {
    let raw = hex::decode(record.trim()).context("record is not valid hex")?;
    if raw.len() != DataNodeInfo::CSIZE {
        bail!(
            "record must be {} bytes, got {}",
            DataNodeInfo::CSIZE,
            raw.len()
        );
    }
    Ok(DataNodeInfo::from_buf(&mut raw.as_slice())?)
}

fn encode_node(info: &DataNodeInfo) -> String {
    let mut buf = BytesMut::with_capacity(DataNodeInfo::CSIZE);
    info.encode(&mut buf);
    hex::encode(&buf)
}

fn print_node(info: &DataNodeInfo) {
    println!("Storage type:   {}", info.storage_type());
    println!("Storage class:  {}", info.storage_class());
    println!("Location class: {}", info.location_class());
    println!("Address:        {}", Ipv4Addr::from(*info.ip_address()));
    println!("Port:           {}", info.port());
    println!("Key:            {:#018x}", info.key());
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| args.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match args.command {
        Commands::Node { action } => match action {
            NodeCommands::Decode { record } => {
                let info = decode_node(&record)?;
                debug!(%info, "decoded node record");
                print_node(&info);
            }
            NodeCommands::Encode {
                storage_type,
                storage_class,
                location_class,
                ip,
                port,
            } => {
                let info = DataNodeInfo::new(
                    storage_type,
                    storage_class,
                    location_class,
                    ip.octets(),
                    port,
                );
                println!("{}", encode_node(&info));
            }
            NodeCommands::Key { ip, port } => {
                println!("{:#018x}", DataNodeInfo::calc_key(&ip.octets(), port));
            }
        },
        Commands::Config { action } => match action {
            ConfigCommands::Show { file } => {
                let config = match file {
                    Some(path) => ClientConfig::load(&path)?,
                    None => ClientConfig::default(),
                };
                println!("Client Configuration");
                println!("====================");
                println!("Data timeout: {} ms", config.data_timeout_ms);
                println!("Wait bound:   {:?}", config.wait_bound);
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_decode_hex() {
        let info = DataNodeInfo::new(1, 2, 3, [10, 0, 0, 1], 8080);
        let record = encode_node(&info);
        assert_eq!(record, "0000000100000002000000030a00000100001f90");
        assert_eq!(decode_node(&record).unwrap(), info);
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(decode_node("zz").is_err());
        assert!(decode_node("00000001").is_err());
    }

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "tierio-cli",
            "node",
            "key",
            "--ip",
            "10.0.0.1",
            "--port",
            "8080",
        ])
        .unwrap();
        assert!(matches!(
            args.command,
            Commands::Node {
                action: NodeCommands::Key { port: 8080, .. }
            }
        ));
    }
}
