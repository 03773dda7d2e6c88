use std::time::Duration;

use pretty_log_sink::context;
use pretty_log_sink::init::init_tracing;
use pretty_log_sink::{Attr, HandlerOptions, Level};
use tracing::{error, info, info_span, warn, Instrument};

#[tokio::main]
async fn main() {
    init_tracing(HandlerOptions::default().with_level(Level::Debug)).expect("install subscriber");

    info!("starting service");

    let request = async {
        info!(user_id = 42u64, "authenticating");
        tokio::time::sleep(Duration::from_millis(10)).await;
        warn!(attempts = 3u64, "slow upstream");
        error!(reason = "invalid password", "authentication failed");
    };

    context::scope(
        [Attr::new("request_id", "7f3a")],
        request.instrument(info_span!("request", method = "POST", path = "/login")),
    )
    .await;
}
