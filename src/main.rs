use clap::Parser;
use log::{debug, info};

use clevernote::{App, Cli, Config, FileStore};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }

    info!("Using data directory {}", config.data_dir.display());
    let store = FileStore::new(config.data_dir.clone());
    let app = App::new(store, config, cli.verbose);

    if let Err(e) = app.run(cli.command).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
