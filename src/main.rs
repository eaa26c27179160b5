use tracing_subscriber::{fmt, EnvFilter};
use tracing::info;

fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let cfg = stoop::config::Config::from_env();

    // Startup banner at info level so something always prints at default verbosity
    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    info!(
        target: "stoop",
        "stoop starting: RUST_LOG='{}', api_url={}, idp={}, state_dir='{}'",
        rust_log,
        cfg.api_url,
        if cfg.idp_url.is_some() { "configured" } else { "none" },
        cfg.state_dir.display()
    );

    stoop::console::run(cfg)
}
