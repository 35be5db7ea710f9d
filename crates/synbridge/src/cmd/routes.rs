use synbridge_core::{Direction, Router, CLOCK_OFFSET_TOPIC, ROUTES};
use synbridge_frame::{tag_name, UPTIME};

use crate::cmd::RoutesArgs;
use crate::exit::{bridge_error, CliResult, SUCCESS};
use crate::output::{print_routes, OutputFormat, RouteRow};

pub fn run(_args: RoutesArgs, format: OutputFormat) -> CliResult<i32> {
    let router = Router::new(ROUTES).map_err(|err| bridge_error("invalid routes", err.into()))?;
    print_routes(&route_rows(&router), format);
    Ok(SUCCESS)
}

fn route_rows(router: &Router) -> Vec<RouteRow> {
    let mut rows: Vec<RouteRow> = router
        .routes()
        .iter()
        .map(|route| RouteRow {
            topic: route.topic,
            direction: direction_label(route.direction()),
            tag: route.tag,
            tag_name: tag_name(route.tag),
            kind: route.kind,
        })
        .collect();
    rows.push(RouteRow {
        topic: CLOCK_OFFSET_TOPIC,
        direction: direction_label(Direction::Inbound),
        tag: UPTIME,
        tag_name: tag_name(UPTIME),
        kind: "time",
    });
    rows
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Outbound => "outbound",
        Direction::Inbound => "inbound",
    }
}
