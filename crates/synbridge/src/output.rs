use std::io::IsTerminal;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use synbridge_msgs::BusMessage;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct PublicationOutput<'a> {
    topic: &'a str,
    kind: &'a str,
    message: &'a BusMessage,
    timestamp: String,
}

pub fn print_publication(topic: &str, message: &BusMessage, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = PublicationOutput {
                topic,
                kind: message.kind(),
                message,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TOPIC", "KIND", "MESSAGE"])
                .add_row(vec![
                    topic.to_string(),
                    message.kind().to_string(),
                    message_json(message),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "topic={} kind={} message={}",
                topic,
                message.kind(),
                message_json(message)
            );
        }
        OutputFormat::Raw => {
            println!("{}", message_json(message));
        }
    }
}

/// One row of `synbridge routes`.
#[derive(Debug, Serialize)]
pub struct RouteRow {
    pub topic: &'static str,
    pub direction: &'static str,
    pub tag: u16,
    pub tag_name: &'static str,
    pub kind: &'static str,
}

pub fn print_routes(rows: &[RouteRow], format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            println!(
                "{}",
                serde_json::to_string(rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["TOPIC", "DIRECTION", "TAG", "KIND"]);
            for row in rows {
                table.add_row(vec![
                    row.topic.to_string(),
                    row.direction.to_string(),
                    format!("{} ({})", row.tag, row.tag_name),
                    row.kind.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!(
                    "{:<18} {:<8} tag={} ({}) kind={}",
                    row.topic, row.direction, row.tag, row.tag_name, row.kind
                );
            }
        }
    }
}

fn message_json(message: &BusMessage) -> String {
    serde_json::to_string(message).unwrap_or_else(|_| "{}".to_string())
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
