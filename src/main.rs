use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;
mod spreadsheet;
mod storage;
mod templates;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = config_path_from_args(std::env::args().skip(1))?;
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker threads default to the number of CPU cores
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let state = Arc::new(config::AppState::new(&cfg)?);
    let listener = server::create_reusable_listener(addr)?;

    logger::log_server_start(&listener.local_addr()?, &cfg);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    let active_connections = Arc::new(AtomicUsize::new(0));
    server::run(
        listener,
        state,
        active_connections,
        Arc::clone(&signals.shutdown),
    )
    .await?;

    logger::log_info("Server stopped");
    Ok(())
}

/// `--config <path>` or `--config=<path>` (file name without extension);
/// defaults to `config`
fn config_path_from_args(mut args: impl Iterator<Item = String>) -> Result<String, String> {
    let mut path = config::DEFAULT_CONFIG_PATH.to_string();
    while let Some(arg) = args.next() {
        if arg == "--config" {
            path = args
                .next()
                .ok_or_else(|| "--config requires a path".to_string())?;
        } else if let Some(value) = arg.strip_prefix("--config=") {
            path = value.to_string();
        } else {
            return Err(format!("unknown argument: {arg}"));
        }
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> impl Iterator<Item = String> {
        list.iter().map(ToString::to_string).collect::<Vec<_>>().into_iter()
    }

    #[test]
    fn test_config_path_from_args() {
        assert_eq!(config_path_from_args(args(&[])).unwrap(), "config");
        assert_eq!(
            config_path_from_args(args(&["--config", "/etc/webdemo"])).unwrap(),
            "/etc/webdemo"
        );
        assert_eq!(
            config_path_from_args(args(&["--config=local"])).unwrap(),
            "local"
        );
        assert!(config_path_from_args(args(&["--config"])).is_err());
        assert!(config_path_from_args(args(&["--verbose"])).is_err());
    }
}
