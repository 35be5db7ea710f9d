use std::time::Duration;

use clap::{Args, Subcommand};
use synbridge_core::config::{DEFAULT_HOST, DEFAULT_PORT};
use synbridge_core::BridgeConfig;
use synbridge_transport::UdpLink;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod routes;
pub mod run;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bridge and print every inbound publication.
    Run(RunArgs),
    /// Encode and send a single bus message to the peer.
    Send(SendArgs),
    /// Print the route table.
    Routes(RoutesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Routes(args) => routes::run(args, format),
        Command::Version(args) => version::run(args, format),
    }
}

/// Remote peer and local socket options shared by `run` and `send`.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Remote peer host name or address.
    #[arg(long, env = "SYNBRIDGE_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
    /// Remote peer UDP port.
    #[arg(long, env = "SYNBRIDGE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// Local address to bind.
    #[arg(long, env = "SYNBRIDGE_BIND", default_value = UdpLink::DEFAULT_LOCAL_ADDR)]
    pub bind: String,
    /// Receive timeout; bounds shutdown latency (e.g. 1s, 250ms).
    #[arg(long, default_value = "1s")]
    pub recv_timeout: String,
}

impl LinkArgs {
    pub fn to_config(&self) -> CliResult<BridgeConfig> {
        Ok(BridgeConfig {
            local_addr: self.bind.clone(),
            recv_timeout: parse_duration(&self.recv_timeout)?,
            ..BridgeConfig::new(self.host.clone(), self.port)
        })
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Read `{"topic": ..., "message": ...}` JSON lines from stdin and
    /// publish them on the bus.
    #[arg(long)]
    pub stdin: bool,
    /// Exit after printing N publications.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Outbound bus topic (see `synbridge routes`).
    pub topic: String,
    /// Bus message as JSON, e.g. '{"kind":"joy","axes":[0.5],"buttons":[1]}'.
    #[arg(long)]
    pub json: String,
}

#[derive(Args, Debug, Default)]
pub struct RoutesArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    if millis {
        Ok(Duration::from_millis(value))
    } else {
        Ok(Duration::from_secs(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
        assert!(parse_duration("").is_err());
    }

    #[test]
    fn link_args_build_config() {
        let args = LinkArgs {
            host: "127.0.0.1".into(),
            port: 9000,
            bind: "127.0.0.1:0".into(),
            recv_timeout: "250ms".into(),
        };
        let config = args.to_config().unwrap();
        assert_eq!(config.remote_port, 9000);
        assert_eq!(config.local_addr, "127.0.0.1:0");
        assert_eq!(config.recv_timeout, Duration::from_millis(250));
    }
}
