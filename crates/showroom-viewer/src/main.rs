//! Showroom - native viewer entry point

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use anyhow::Result;
    use clap::Parser;
    use std::path::PathBuf;
    use tracing::level_filters::LevelFilter;
    use tracing::{info, Level};
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    use showroom_viewer::{load_config, ViewerOptions};

    #[derive(Parser, Debug)]
    #[command(name = "showroom")]
    #[command(about = "3D vehicle viewer with automatic framing and live recoloring")]
    #[command(version)]
    struct Args {
        /// Route to open, e.g. /cars/1
        route: Option<String>,

        /// Path to configuration file
        #[arg(short, long, default_value = "showroom.toml")]
        config: PathBuf,

        /// Catalog file (TOML or the site's data.json)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Log level (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "info")]
        log_level: String,
    }

    fn parse_level(level: &str) -> Level {
        match level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    pub fn main() -> Result<()> {
        let args = Args::parse();

        // RUST_LOG directives refine --log-level
        let filter = EnvFilter::builder()
            .with_default_directive(LevelFilter::from_level(parse_level(&args.log_level)).into())
            .from_env_lossy();
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;

        info!("Showroom v{}", env!("CARGO_PKG_VERSION"));

        let mut config = load_config(&args.config)?;
        if let Some(catalog) = args.catalog {
            config.catalog.path = Some(catalog);
        }

        let catalog = config.load_catalog()?;
        info!(vehicles = catalog.len(), assets = %config.assets.root, "Configuration loaded");

        let mut options = ViewerOptions::new(config, catalog);
        if let Some(route) = args.route {
            options.route = Some(route);
        }

        showroom_viewer::run(options);
        Ok(())
    }

}
