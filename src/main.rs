use clap::Parser;
use ideabot::ProviderKind;
use ideabot::core::config::{self, CliOverrides, ResolvedConfig};
use ideabot::core::pipeline::Pipeline;
use log::{error, info};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "ideabot",
    about = "Generates one idea, posts it to Telegram and remembers it"
)]
struct Args {
    /// LLM provider to use
    #[arg(short, long, value_enum)]
    provider: Option<ProviderKind>,

    /// Model name passed to the provider
    #[arg(short, long)]
    model: Option<String>,

    /// Config file (defaults to ~/.ideabot/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print stored ideas and exit without calling any API
    #[arg(long)]
    list_ideas: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let file_config = match config::load_config(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ideabot: {e}");
            return ExitCode::FAILURE;
        }
    };

    let cli = CliOverrides {
        provider: args.provider,
        model: args.model,
    };
    let resolved = match config::resolve(&file_config, &cli) {
        Ok(resolved) => resolved,
        Err(e) => {
            eprintln!("ideabot: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&resolved.log_file);
    info!(
        "{} starting with provider {:?}, model {}, db {}",
        resolved.project_name,
        resolved.provider,
        resolved.model,
        resolved.db_path.display()
    );
    match args.config.clone().or_else(config::config_path) {
        Some(path) if path.exists() => info!("Config from {}", path.display()),
        _ => info!("No config file, using defaults and environment"),
    }

    match run(&resolved, args.list_ideas).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Run aborted: {}", e);
            eprintln!("ideabot: {e}");
            ExitCode::FAILURE
        }
    }
}

/// File logger, truncated on every run.
fn init_logging(path: &Path) {
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    match File::create(path) {
        Ok(log_file) => {
            let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
        }
        Err(e) => eprintln!("ideabot: cannot open log file {}: {e}", path.display()),
    }
}

async fn run(config: &ResolvedConfig, list_ideas: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = config.build_store()?;

    if list_ideas {
        for record in store.records()? {
            println!("{}\t{}", record.id, record.text);
        }
        return Ok(());
    }

    let settings = config.pipeline_settings()?;
    let provider = config.build_provider()?;
    let messenger = config.build_messenger()?;

    let outcome = Pipeline::new(provider.as_ref(), &store, &messenger, &settings)
        .run()
        .await?;

    info!("Run finished at {:?}: {:?}", outcome.stage(), outcome);
    Ok(())
}
