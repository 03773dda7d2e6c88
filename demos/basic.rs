use std::time::Duration;

use pretty_log_sink::{attrs, Attr, Handler, HandlerOptions, Level, Logger};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Filter {
    field: &'static str,
    values: Vec<u32>,
}

#[derive(Debug, thiserror::Error)]
#[error("failed to bind port 8000")]
struct BindError(#[source] std::io::Error);

fn main() -> std::io::Result<()> {
    let options = HandlerOptions::from_env().unwrap_or_default().with_level(Level::Debug);
    let log = Logger::new(Handler::stdout(options));

    log.info("Server started", attrs!["port" => 8000, "environment" => "DEV"])?;

    let request_log = log.with(attrs!["service" => "api"]).with_group("request");
    request_log.debug("incoming", attrs!["id" => 42, "path" => "/users"])?;
    request_log.info(
        "query",
        vec![
            Attr::new("sql", "SELECT *\nFROM users\nWHERE id = $1"),
            Attr::list("ids", vec![42]),
            Attr::list("roles", vec!["admin", "ops"]),
            Attr::json("filter", Filter { field: "age", values: vec![18, 65] }),
            Attr::new("took", Duration::from_millis(12)),
        ],
    )?;

    let err = BindError(std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"));
    log.log_error(&err, "shutting down", attrs!["retry" => false])?;
    Ok(())
}
