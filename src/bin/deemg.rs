//! CLI for DeeMG-AI - couple image generation.

use clap::{Args, Parser, Subcommand, ValueEnum};
use deemg::image::intake;
use deemg::{
    Config, GeminiModel, GenerationAdapter, GenerationKind, ImageProvider, ImageSlot, ResultView,
    WorkflowController, DOWNLOAD_FILENAME, LOCATIONS,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "deemg")]
#[command(about = "Your AI-powered couple image generator (powered by Google Gemini)")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an image from two photos
    Generate(GenerateArgs),

    /// List the locations available for the location mode
    Locations,

    /// List the generation modes
    Modes,

    /// Check that the API key and model are usable
    Check(CheckArgs),
}

#[derive(Args)]
struct GenerateArgs {
    /// Your photo
    #[arg(long)]
    first: PathBuf,

    /// Your partner's photo
    #[arg(long)]
    second: PathBuf,

    /// What to create
    #[arg(short, long, value_enum)]
    mode: ModeArg,

    /// Location for the location mode (see `deemg locations`)
    #[arg(short, long)]
    location: Option<String>,

    /// Output file path
    #[arg(short, long, default_value = DOWNLOAD_FILENAME)]
    output: PathBuf,

    /// Model to use (overrides DEEMG_MODEL)
    #[arg(long, value_enum)]
    model: Option<ModelArg>,
}

#[derive(Args)]
struct CheckArgs {
    /// Model to check (overrides DEEMG_MODEL)
    #[arg(long, value_enum)]
    model: Option<ModelArg>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Wedding,
    Baby,
    Location,
}

impl From<ModeArg> for GenerationKind {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Wedding => GenerationKind::Wedding,
            ModeArg::Baby => GenerationKind::Baby,
            ModeArg::Location => GenerationKind::Location,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModelArg {
    Flash,
    Pro,
}

impl From<ModelArg> for GeminiModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Flash => GeminiModel::NanoBanana,
            ModelArg::Pro => GeminiModel::NanoBananaPro,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => {
            generate(args, cli.json).await?;
        }
        Commands::Locations => {
            list_locations(cli.json)?;
        }
        Commands::Modes => {
            list_modes(cli.json)?;
        }
        Commands::Check(args) => {
            check(args).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("deemg=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(model: Option<ModelArg>) -> anyhow::Result<Config> {
    let config = Config::from_env()?;
    Ok(match model {
        Some(m) => config.with_model(m.into()),
        None => config,
    })
}

async fn generate(args: GenerateArgs, json_output: bool) -> anyhow::Result<()> {
    // Fail before touching any input when the credential is missing
    let config = load_config(args.model)?;
    let adapter = GenerationAdapter::new(config.provider()?);
    let mut workflow = WorkflowController::new();

    for (slot, path) in [(ImageSlot::First, &args.first), (ImageSlot::Second, &args.second)] {
        workflow.accept_intake(slot, intake::load(path).await);
        if workflow.state().image(slot).is_none() {
            anyhow::bail!("could not read {} ({})", slot.label(), path.display());
        }
    }

    let kind = GenerationKind::from(args.mode);
    workflow.select_kind(kind)?;
    match (&args.location, kind) {
        (Some(location), GenerationKind::Location) => workflow.select_location(location)?,
        (None, GenerationKind::Location) => {
            anyhow::bail!("--location is required for the location mode (see `deemg locations`)")
        }
        (Some(_), _) => tracing::warn!("--location is ignored for the {kind} mode"),
        (None, _) => {}
    }

    if let Some(headline) = ResultView::Pending.headline() {
        eprintln!("{headline}");
    }
    workflow.generate(&adapter).await?;

    match workflow.view() {
        ResultView::Succeeded { image } => {
            image.save(&args.output)?;
            if json_output {
                let result = serde_json::json!({
                    "success": true,
                    "mode": kind.to_string(),
                    "location": workflow.state().location(),
                    "output": args.output.display().to_string(),
                    "size_bytes": image.size(),
                    "format": image.format.extension(),
                    "model": image.metadata.model,
                    "duration_ms": image.metadata.duration_ms,
                });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                if let Some(headline) = workflow.view().headline() {
                    println!("{headline}");
                }
                println!("Saved {} ({} bytes)", args.output.display(), image.size());
                if let Some(duration) = image.metadata.duration_ms {
                    println!("Duration: {}ms", duration);
                }
            }
            Ok(())
        }
        ResultView::Failed { message } => {
            if json_output {
                let result = serde_json::json!({ "success": false, "error": message });
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else if let Some(headline) = workflow.view().headline() {
                eprintln!("{headline}");
            }
            anyhow::bail!("{message}")
        }
        ResultView::Idle | ResultView::Pending => {
            anyhow::bail!("generation did not settle")
        }
    }
}

async fn check(args: CheckArgs) -> anyhow::Result<()> {
    let config = load_config(args.model)?;
    let provider = config.provider()?;
    provider.health_check().await?;
    println!("{} is reachable with model {}", provider.name(), config.model.as_str());
    Ok(())
}

fn list_locations(json_output: bool) -> anyhow::Result<()> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(LOCATIONS)?);
    } else {
        println!("Available locations:\n");
        for location in LOCATIONS {
            println!("  {location}");
        }
    }
    Ok(())
}

fn list_modes(json_output: bool) -> anyhow::Result<()> {
    #[derive(serde::Serialize)]
    struct ModeInfo {
        mode: GenerationKind,
        label: &'static str,
        description: &'static str,
        needs_location: bool,
    }

    let modes: Vec<ModeInfo> = GenerationKind::ALL
        .into_iter()
        .map(|kind| ModeInfo {
            mode: kind,
            label: kind.label(),
            description: kind.description(),
            needs_location: kind == GenerationKind::Location,
        })
        .collect();

    if json_output {
        println!("{}", serde_json::to_string_pretty(&modes)?);
    } else {
        println!("Available modes:\n");
        for m in &modes {
            println!("  {} - {}", m.mode, m.label);
            println!("    {}", m.description);
        }
    }
    Ok(())
}
