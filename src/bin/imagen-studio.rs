//! Imagen Studio CLI
//!
//! One-shot generation plus an interactive session that stands in for the
//! single-page form: type a prompt, review the image, keep notes.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use imagen_studio::logging::{ansi_enabled, init_logging, LogFormat, LoggingConfig};
use imagen_studio::view::{render_form, render_json};
use imagen_studio::{GenerationController, ImagenClient, StudioConfig};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "imagen-studio", version, about = "Generate and review images from text prompts")]
struct Cli {
    /// API key (defaults to GEMINI_API_KEY, then API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Imagen model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Base URL of the Generative Language API
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Log level: trace, debug, info, warn, error, off
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Log format: text or json
    #[arg(long, global = true, default_value = "text")]
    log_format: String,

    /// Disable colored log output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a single image and print the resulting form
    Generate {
        /// Text description of the image
        prompt: String,

        /// Write the decoded image to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Review notes to attach
        #[arg(long)]
        notes: Option<String>,

        /// Print the state as JSON instead of the form
        #[arg(long)]
        json: bool,
    },
    /// Interactive session: each line is submitted as a prompt
    Session,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.parse::<LogFormat>()?,
        color: ansi_enabled(cli.no_color, std::io::stderr().is_terminal()),
    };
    init_logging(&logging)?;

    let config = build_config(&cli);
    let client = ImagenClient::new(&config)?;
    info!(model = client.model(), endpoint = client.endpoint(), "imagen studio starting");

    match cli.command {
        Command::Generate {
            prompt,
            output,
            notes,
            json,
        } => run_generate(client, &prompt, output.as_deref(), notes, json).await,
        Command::Session => run_session(client).await,
    }
}

/// Environment first, then CLI flags on top.
fn build_config(cli: &Cli) -> StudioConfig {
    let mut config = StudioConfig::from_env();
    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint = endpoint.clone();
    }
    if let Some(secs) = cli.timeout_secs {
        config.timeout = (secs > 0).then(|| std::time::Duration::from_secs(secs));
    }
    config
}

async fn run_generate(
    client: ImagenClient,
    prompt: &str,
    output: Option<&Path>,
    notes: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let controller = GenerationController::new(client);
    if let Some(notes) = notes {
        controller.set_review_notes(notes);
    }

    let outcome = controller.request_generation(prompt).await;
    let state = controller.snapshot();

    if json {
        println!("{}", render_json(&state)?);
    } else {
        println!("{}", render_form(&state));
    }

    let image = match outcome {
        Ok(image) => image,
        Err(_) => bail!(
            "{}",
            state.error.unwrap_or_else(|| "generation failed".to_string())
        ),
    };

    if let Some(path) = output {
        let written = image
            .save(path)
            .with_context(|| format!("failed to write image to {}", path.display()))?;
        eprintln!("Saved {} bytes to {}", written, path.display());
    }
    Ok(())
}

const SESSION_HELP: &str = "Type a prompt and press Enter to generate.
  :notes <text>   set review notes
  :save [path]    write the current image
  :show           render the form again
  :json           print the state as JSON
  :help           show this help
  :quit           leave the session";

async fn run_session(client: ImagenClient) -> anyhow::Result<()> {
    let controller = Arc::new(GenerationController::new(client));
    println!("{}\n\n{}", render_form(&controller.snapshot()), SESSION_HELP);

    let mut attempts = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let (command, rest) = match line.strip_prefix(':') {
            Some(cmd) => {
                let (name, arg) = cmd.split_once(' ').unwrap_or((cmd, ""));
                (Some(name.trim()), arg.trim())
            }
            None => (None, line.as_str()),
        };

        match command {
            Some("q" | "quit" | "exit") => break,
            Some("help") => println!("{}", SESSION_HELP),
            Some("show") => println!("{}", render_form(&controller.snapshot())),
            Some("json") => println!("{}", render_json(&controller.snapshot())?),
            Some("notes") => {
                controller.set_review_notes(rest);
                println!("Review notes updated.");
            }
            Some("save") => save_current(&controller, rest),
            Some(other) => println!("Unknown command ':{}'. Try :help.", other),
            None if line.is_empty() => println!("{}", render_form(&controller.snapshot())),
            None => submit(&controller, &mut attempts, line.clone()),
        }
    }

    debug!(outstanding = attempts.len(), "session input closed");
    while let Some(joined) = attempts.join_next().await {
        joined.context("generation task failed")?;
    }
    Ok(())
}

/// Begin an attempt right away and let the generator call run in the
/// background so notes stay editable meanwhile.
fn submit(
    controller: &Arc<GenerationController<ImagenClient>>,
    attempts: &mut JoinSet<()>,
    prompt: String,
) {
    if !controller.prompt_editable() {
        println!("A generation is already in progress; wait for it or edit notes.");
        return;
    }

    let ticket = match controller.begin_generation(&prompt) {
        Ok(ticket) => ticket,
        Err(_) => {
            println!("{}", render_form(&controller.snapshot()));
            return;
        }
    };

    let controller = Arc::clone(controller);
    attempts.spawn(async move {
        let _ = controller.complete(ticket).await;
        println!("{}", render_form(&controller.snapshot()));
    });
    println!("Generating...");
}

fn save_current(controller: &GenerationController<ImagenClient>, path: &str) {
    let state = controller.snapshot();
    let image = match state.final_image() {
        Some(image) => image,
        None => {
            println!("No image to save yet.");
            return;
        }
    };

    let path = if path.is_empty() {
        PathBuf::from(format!("imagen-{}.{}", state.attempt, image.file_extension()))
    } else {
        PathBuf::from(path)
    };

    match image.save(&path) {
        Ok(bytes) => println!("Saved {} bytes to {}", bytes, path.display()),
        Err(e) => println!("! Could not save image: {}", e),
    }
}
