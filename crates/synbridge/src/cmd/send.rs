use std::sync::Arc;

use synbridge_core::{LocalBus, Link, SystemWallClock};
use synbridge_msgs::BusMessage;

use crate::cmd::SendArgs;
use crate::exit::{bridge_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let message = parse_message(&args.json)?;
    let config = args.link.to_config()?;

    let link = Link::open(&config, Arc::new(LocalBus::new()), Arc::new(SystemWallClock))
        .map_err(|err| bridge_error("link setup failed", err))?;
    link.forward(&args.topic, &message)
        .map_err(|err| bridge_error("send failed", err))?;

    Ok(SUCCESS)
}

fn parse_message(json: &str) -> CliResult<BusMessage> {
    serde_json::from_str(json)
        .map_err(|err| CliError::new(USAGE, format!("--json is not a bus message: {err}")))
}

#[cfg(test)]
mod tests {
    use synbridge_msgs::Joy;

    use super::*;

    #[test]
    fn parses_tagged_message() {
        let message = parse_message(r#"{"kind":"joy","axes":[0.25]}"#).unwrap();
        assert_eq!(
            message,
            BusMessage::Joy(Joy {
                axes: vec![0.25],
                buttons: vec![],
            })
        );
    }

    #[test]
    fn rejects_unknown_kind() {
        let err = parse_message(r#"{"kind":"lidar"}"#).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
