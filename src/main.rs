use clap::Parser;
use screenstack::core::config::{self, CliOverrides};
use simplelog::{ConfigBuilder, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "screenstack", about = "Window and panel navigation demo")]
struct Args {
    /// Config file to use instead of ~/.screenstack/config.toml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Force-complete transitions stalled for this long (0 disables)
    #[arg(short, long)]
    timeout_ms: Option<u64>,

    /// Log level: off, error, warn, info, debug, trace
    #[arg(short, long)]
    log_level: Option<String>,

    /// Finish every transition immediately
    #[arg(long)]
    no_animate: bool,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let loaded = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    };
    let file_config = match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            transition_timeout_ms: args.timeout_ms,
            log_level: args.log_level,
            no_animate: args.no_animate,
        },
    );

    // File logger: the terminal belongs to the UI
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(resolved.log_level, log_config, log_file);
    }

    log::info!(
        "screenstack starting: {} window(s), {} panel(s), watchdog {:?}",
        resolved.windows.len(),
        resolved.panels.len(),
        resolved.transition_timeout
    );

    screenstack::tui::run(resolved)
}
