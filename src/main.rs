use clap::Parser;
use lexnav::core::config::{self, CliOverrides, LexnavConfig};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lexnav", about = "Browse dictionary and encyclopedia volumes")]
struct Args {
    /// Headword to open, optionally with a `#section`
    word: String,

    /// Directory holding volume files
    #[arg(short, long)]
    library: Option<PathBuf>,

    /// Volume searched first
    #[arg(short, long)]
    volume: Option<String>,

    /// Section to scroll to in the first article
    #[arg(short, long)]
    section: Option<String>,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Logging depends on the config, so its outcome is logged once the logger is up.
    let loaded = config::load_config();
    let fallback = LexnavConfig::default();
    let file_config = match &loaded {
        Ok((c, _)) => c,
        Err(_) => &fallback,
    };
    let resolved = config::resolve(
        file_config,
        &CliOverrides {
            library: args.library.as_deref(),
            volume: args.volume.as_deref(),
        },
    );

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();
    let level = resolved
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::Info);
    if let Ok(log_file) = File::create(&resolved.log_file) {
        let _ = WriteLogger::init(level, log_config, log_file);
    }

    match &loaded {
        Ok((_, origin)) => log::info!("Config: {}", origin),
        Err(e) => {
            eprintln!("Ignoring config file: {e}");
            log::warn!("Ignoring config file: {}", e);
        }
    }

    log::info!(
        "lexnav starting up with library {}",
        resolved.library_path.display()
    );

    lexnav::cli::run(resolved, &args.word, args.section).await
}
