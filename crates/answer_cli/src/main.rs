mod app;
mod config;
mod effects;
mod logging;
mod render;

use answer_logging::{answer_error, answer_info};
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = config::Args::parse();
    let file = config::load_config(args.config.as_deref())?;
    let resolved = config::resolve(&args, file);

    logging::initialize(resolved.log, resolved.log_level);
    answer_info!("answer_cli starting against {}", resolved.client.base_url);

    app::run_app(resolved).inspect_err(|err| answer_error!("session failed: {err:#}"))
}
