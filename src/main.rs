use anyhow::Result;
use dns_block_blackhole::Dispatcher;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<ExitCode> {
    let code = Dispatcher::default()
        .on_constructed(|command| tracing_init(command.debug()))
        .dispatch(std::env::args_os())?;
    Ok(ExitCode::from(code))
}

fn tracing_init(debug: bool) {
    let default_filter = if debug {
        "dns_block_blackhole=debug,tower_http=debug"
    } else {
        "dns_block_blackhole=info"
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
