use std::io::BufRead;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::Deserialize;
use synbridge_core::{
    Bridge, Bus, Direction, LocalBus, ShutdownSignal, CLOCK_OFFSET_TOPIC, ROUTES,
};
use synbridge_msgs::BusMessage;
use tracing::{info, warn};

use crate::cmd::RunArgs;
use crate::exit::{bridge_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_publication, OutputFormat};

const PRINT_POLL: Duration = Duration::from_millis(100);

/// One line of `--stdin` input.
#[derive(Debug, Deserialize)]
struct StdinMessage {
    topic: String,
    message: BusMessage,
}

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let config = args.link.to_config()?;
    let bus = Arc::new(LocalBus::new());

    let (tx, rx) = mpsc::channel();
    for topic in inbound_topics() {
        subscribe_printer(bus.as_ref(), topic, tx.clone());
    }
    drop(tx);

    let mut bridge = Bridge::new(config, bus.clone());
    bridge
        .start()
        .map_err(|err| bridge_error("bridge start failed", err))?;
    let signal = bridge.shutdown_signal();
    install_ctrlc_handler(signal.clone())?;

    if args.stdin {
        spawn_stdin_reader(bus)?;
    }

    let mut printed = 0usize;
    while !signal.is_triggered() {
        let (topic, message) = match rx.recv_timeout(PRINT_POLL) {
            Ok(publication) => publication,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        };
        print_publication(topic, &message, format);
        printed = printed.saturating_add(1);

        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    bridge
        .shutdown()
        .map_err(|err| bridge_error("bridge shutdown failed", err))?;
    Ok(SUCCESS)
}

fn inbound_topics() -> impl Iterator<Item = &'static str> {
    ROUTES
        .iter()
        .filter(|route| route.direction() == Direction::Inbound)
        .map(|route| route.topic)
        .chain(std::iter::once(CLOCK_OFFSET_TOPIC))
}

fn subscribe_printer(bus: &dyn Bus, topic: &'static str, tx: Sender<(&'static str, BusMessage)>) {
    bus.subscribe(
        topic,
        Arc::new(move |message: &BusMessage| {
            let _ = tx.send((topic, message.clone()));
        }),
    );
}

fn spawn_stdin_reader(bus: Arc<LocalBus>) -> CliResult<()> {
    thread::Builder::new()
        .name("synbridge-stdin".to_string())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!(error = %err, "stdin read failed");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<StdinMessage>(&line) {
                    Ok(input) => bus.publish(&input.topic, input.message),
                    Err(err) => warn!(error = %err, "skipping invalid stdin line"),
                }
            }
            info!("stdin closed");
        })
        .map(|_| ())
        .map_err(|err| CliError::new(INTERNAL, format!("stdin reader spawn failed: {err}")))
}

fn install_ctrlc_handler(signal: ShutdownSignal) -> CliResult<()> {
    ctrlc::set_handler(move || signal.trigger()).map_err(|err| {
        CliError::new(INTERNAL, format!("signal handler setup failed: {err}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inbound_topics_include_clock_offset() {
        let topics: Vec<_> = inbound_topics().collect();
        assert_eq!(
            topics,
            vec!["out/actuators", "out/status", "out/uptime", "out/clock_offset"]
        );
    }

    #[test]
    fn stdin_line_parses_into_bus_message() {
        let line = r#"{"topic":"in/joy","message":{"kind":"joy","axes":[0.5],"buttons":[1]}}"#;
        let input: StdinMessage = serde_json::from_str(line).unwrap();
        assert_eq!(input.topic, "in/joy");
        assert_eq!(input.message.kind(), "joy");
    }
}
