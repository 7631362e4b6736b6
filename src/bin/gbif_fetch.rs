use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use gbif_media_fetch::app::App;
use gbif_media_fetch::config::{ConfigLoader, RunConfig};
use gbif_media_fetch::download::HttpMediaClient;
use gbif_media_fetch::error::GbifError;
use gbif_media_fetch::output::{ConsoleProgress, JsonOutput, OutputMode, print_summary};

#[derive(Parser)]
#[command(name = "gbif-fetch")]
#[command(about = "Download the images referenced by a GBIF Darwin Core archive")]
#[command(version)]
struct Cli {
    #[arg(help = "Path to the GBIF Darwin Core download (.zip)")]
    archive: Utf8PathBuf,

    #[arg(long, help = "Directory that receives the species folder (default: current directory)")]
    output_dir: Option<Utf8PathBuf>,

    #[arg(long, help = "JSON config file (default: ./gbif-fetch.json, then the user config dir)")]
    config: Option<String>,

    #[arg(long, help = "HTTP timeout per asset, in seconds")]
    timeout: Option<u64>,

    #[arg(
        long,
        short = 'y',
        help = "Continue without asking when the archive spans several species"
    )]
    yes: bool,

    #[arg(long, help = "Print the run summary as JSON")]
    json: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{report:?}");
            let code = report
                .downcast_ref::<GbifError>()
                .map(GbifError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn run() -> miette::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Interactive
    };

    let resolved = ConfigLoader::resolve(cli.config.as_deref())?;
    let mut config = RunConfig::new(cli.archive, resolved);
    if let Some(output_dir) = cli.output_dir {
        config.output_root = output_dir;
    }
    if let Some(timeout) = cli.timeout {
        config.set_timeout(timeout)?;
    }
    config.assume_yes = cli.yes;

    let client = HttpMediaClient::new(&config.http)?;
    let app = App::new(config, client);
    let mut prompt = output_mode.prompt();

    let outcome = match output_mode {
        OutputMode::Json => {
            let outcome = app.run(&mut prompt, &JsonOutput)?;
            JsonOutput::print_outcome(&outcome).into_diagnostic()?;
            outcome
        }
        OutputMode::Interactive => {
            let progress = ConsoleProgress::new();
            let outcome = app.run(&mut prompt, &progress)?;
            print_summary(&outcome).into_diagnostic()?;
            outcome
        }
    };

    Ok(ExitCode::from(outcome.exit_code()))
}
