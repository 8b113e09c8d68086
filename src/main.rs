use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use warung_kopi::action;
use warung_kopi::config::{self, AppState, Config};
use warung_kopi::logger;
use warung_kopi::server::{self, SignalHandler};

/// Warung kopi action group service
///
/// Runs the HTTP action service unless a subcommand is given.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<CliCommand>,

    /// Config file path, extension optional (default: config.{toml,json,yaml})
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    fn config_path(&self) -> Cow<'_, str> {
        self.config
            .as_deref()
            .map_or(Cow::Borrowed(config::DEFAULT_CONFIG_PATH), Path::to_string_lossy)
    }
}

#[derive(Debug, Subcommand)]
enum CliCommand {
    /// Answer one action event and print the envelope to stdout
    Invoke {
        /// Event file; stdin when omitted or `-`
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config_path())?;

    match cli.command {
        Some(CliCommand::Invoke { file }) => {
            logger::init_stderr(&cfg)?;
            run_invoke(&cfg, file.as_deref())
        }
        None => {
            logger::init(&cfg)?;

            let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
            runtime_builder.enable_all();
            if let Some(workers) = cfg.server.workers {
                runtime_builder.worker_threads(workers);
            }
            let runtime = runtime_builder.build()?;

            runtime.block_on(async_main(cfg))
        }
    }
}

/// Answer a single event read from `source` (stdin for `None` or `-`)
fn run_invoke(cfg: &Config, source: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match source.filter(|path| *path != Path::new("-")) {
        Some(path) => std::fs::read(path)
            .map_err(|e| format!("Failed to read event file '{}': {e}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            buf
        }
    };

    let envelope = action::handle_event(&raw, &cfg.envelope_options())
        .map_err(|e| format!("Invalid event JSON: {e}"))?;

    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::bind_listener(addr, cfg.performance.backlog)?;

    let state = Arc::new(AppState::new(&cfg));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let signals = Arc::new(SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    logger::log_server_start(&addr, &cfg);

    // Connection tasks are spawned with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            active_connections,
            Arc::clone(&signals.shutdown),
        ))
        .await?;

    logger::log_info("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_default() {
        let cli = Cli::try_parse_from(["warung-kopi"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.config_path(), "config");
    }

    #[test]
    fn test_parse_config_forms() {
        let cli = Cli::try_parse_from(["warung-kopi", "--config=/etc/kopi.toml"]).unwrap();
        assert_eq!(cli.config_path(), "/etc/kopi.toml");

        let cli = Cli::try_parse_from(["warung-kopi", "invoke", "-c", "dev"]).unwrap();
        assert_eq!(cli.config_path(), "dev");

        assert!(Cli::try_parse_from(["warung-kopi", "-c"]).is_err());
    }

    #[test]
    fn test_parse_invoke() {
        let cli = Cli::try_parse_from(["warung-kopi", "invoke"]).unwrap();
        assert!(matches!(cli.command, Some(CliCommand::Invoke { file: None })));

        let cli = Cli::try_parse_from(["warung-kopi", "invoke", "event.json"]).unwrap();
        match cli.command {
            Some(CliCommand::Invoke { file }) => assert_eq!(file, Some(PathBuf::from("event.json"))),
            None => panic!("expected invoke"),
        }
    }

    #[test]
    fn test_parse_rejects_extra_arguments() {
        assert!(Cli::try_parse_from(["warung-kopi", "serve"]).is_err());
        assert!(Cli::try_parse_from(["warung-kopi", "invoke", "-", "a.json"]).is_err());
        assert!(Cli::try_parse_from(["warung-kopi", "invoke", "a.json", "b.json"]).is_err());
    }

    #[test]
    fn test_run_invoke_from_file() {
        let path = std::env::temp_dir().join(format!("kopi-event-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"sessionId":"s-1","actionGroup":"coffee","apiPath":"/menu","httpMethod":"GET","parameters":[]}"#,
        )
        .unwrap();
        let cfg = Config::load_from("does-not-exist/kopi-config").unwrap();

        let result = run_invoke(&cfg, Some(&path));
        std::fs::remove_file(&path).ok();
        assert!(result.is_ok());
    }

    #[test]
    fn test_run_invoke_missing_file() {
        let cfg = Config::load_from("does-not-exist/kopi-config").unwrap();
        assert!(run_invoke(&cfg, Some(Path::new("does-not-exist/event.json"))).is_err());
    }
}
