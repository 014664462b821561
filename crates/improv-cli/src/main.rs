//! Improv CLI - Character art and voice generation
//!
//! Drives the Stable Diffusion WebUI and ElevenLabs from the episode
//! catalog, writing artifacts and generation logs under the project root.

mod config;
mod workspace;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Confirm, Password};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use improv::{
    GenerationMode, ImageSettingsOverride, PipelineError, Seed, SpeechSynthesizer,
    VoiceSettingsOverride,
};
use improv_pipeline::application::model_matches;
use improv_pipeline::{CharacterRequest, ElevenLabsClient, ElevenLabsConfig};

use config::Config;
use workspace::Workspace;

#[derive(Parser)]
#[command(name = "improv")]
#[command(about = "Internet Improv - character art and voice pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Project root (defaults to project_root in the config file)
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Catalog TOML to use instead of the embedded one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Log requests and file writes
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the image API and show the loaded model
    Status,

    /// Image model management
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },

    /// Print the prompt a character generation would send
    Prompt {
        character: String,
        #[arg(long, default_value = "standing_neutral")]
        pose: String,
        #[arg(long, default_value = "neutral")]
        expression: String,
        /// Extra fragment appended after the expression (repeatable)
        #[arg(long)]
        extra: Vec<String>,
    },

    /// Character asset generation
    Character {
        #[command(subcommand)]
        action: CharacterAction,
    },

    /// Episode shot generation
    Shot {
        #[command(subcommand)]
        action: ShotAction,
    },

    /// Dialogue audio generation
    Audio {
        #[command(subcommand)]
        action: AudioAction,
    },

    /// Voice listing, design and auditions
    Voice {
        #[command(subcommand)]
        action: VoiceAction,
    },

    /// Golden seed registry
    Seed {
        #[command(subcommand)]
        action: SeedAction,
    },

    /// Store the ElevenLabs API key
    Login {
        /// API key (will prompt if not provided)
        #[arg(short, long)]
        key: Option<String>,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum ModelAction {
    /// List checkpoints known to the image API
    List,
    /// Load a checkpoint
    Set { name: String },
}

#[derive(clap::Args)]
struct ImageFlags {
    /// Seed (-1 or "random" for random)
    #[arg(long, default_value = "random", allow_hyphen_values = true)]
    seed: Seed,
    #[arg(long)]
    sampler: Option<String>,
    #[arg(long)]
    steps: Option<u32>,
    #[arg(long)]
    cfg: Option<f32>,
    #[arg(long)]
    width: Option<u32>,
    #[arg(long)]
    height: Option<u32>,
    #[arg(long)]
    batch: Option<u32>,
    /// TOML file with image settings overrides
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl ImageFlags {
    /// File overrides first, flags on top
    fn overrides(&self, denoise: Option<f32>) -> Result<ImageSettingsOverride> {
        let from_file: ImageSettingsOverride = match &self.settings {
            Some(path) => read_toml(path)?,
            None => ImageSettingsOverride::default(),
        };

        let from_flags = ImageSettingsOverride {
            sampler_name: self.sampler.clone(),
            steps: self.steps,
            cfg_scale: self.cfg,
            width: self.width,
            height: self.height,
            batch_size: self.batch,
            denoising_strength: denoise,
            ..Default::default()
        };

        Ok(from_file.merge(&from_flags))
    }
}

#[derive(Subcommand)]
enum CharacterAction {
    /// List characters with their expressions and poses
    List,
    /// Generate character assets
    Generate {
        id: String,
        #[arg(long, default_value = "standing_neutral")]
        pose: String,
        #[arg(long, default_value = "neutral")]
        expression: String,
        /// txt2img or img2img
        #[arg(long, default_value = "txt2img")]
        mode: GenerationMode,
        /// img2img reference (defaults to characters/<id>/reference.png)
        #[arg(long)]
        reference: Option<PathBuf>,
        /// img2img denoising strength (0 keeps the reference, 1 ignores it)
        #[arg(long)]
        denoise: Option<f32>,
        /// Negative prompt replacing the default
        #[arg(long)]
        negative: Option<String>,
        #[arg(long)]
        extra: Vec<String>,
        /// Output directory (defaults to characters/<id>/poses)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Save the resulting seed with this description
        #[arg(long)]
        save_seed: Option<String>,
        #[command(flatten)]
        image: ImageFlags,
    },
}

#[derive(Subcommand)]
enum ShotAction {
    /// List the episode's shots
    List,
    /// Generate one shot
    Generate {
        shot: String,
        /// Replace the shared shot negative prompt
        #[arg(long)]
        negative: Option<String>,
        #[command(flatten)]
        image: ImageFlags,
    },
    /// Generate every shot of the episode
    All {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(clap::Args)]
struct VoiceFlags {
    #[arg(long)]
    stability: Option<f32>,
    #[arg(long)]
    similarity: Option<f32>,
    #[arg(long)]
    style: Option<f32>,
    /// TOML file with voice settings overrides
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl VoiceFlags {
    fn overrides(&self) -> Result<VoiceSettingsOverride> {
        let from_file: VoiceSettingsOverride = match &self.settings {
            Some(path) => read_toml(path)?,
            None => VoiceSettingsOverride::default(),
        };

        Ok(VoiceSettingsOverride {
            stability: self.stability.or(from_file.stability),
            similarity_boost: self.similarity.or(from_file.similarity_boost),
            style: self.style.or(from_file.style),
        })
    }
}

#[derive(Subcommand)]
enum AudioAction {
    /// List the episode's script
    List,
    /// Show voice casting and settings profiles
    Voices,
    /// Generate audio for one line
    Generate {
        line: String,
        #[command(flatten)]
        voice: VoiceFlags,
    },
    /// Generate audio for every line
    All {
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum VoiceAction {
    /// List voices on the ElevenLabs account
    List,
    /// Design candidate voices for a character
    Design { character: String },
    /// Design voices for every character with a brief
    DesignAll {
        #[arg(short, long)]
        yes: bool,
    },
    /// Read a test line with several candidate voices
    Audition {
        character: String,
        /// Candidate as NAME=VOICE_ID (repeatable; defaults to the catalog's list)
        #[arg(long = "voice", value_parser = parse_voice_pair)]
        voices: Vec<(String, String)>,
        /// Line to read (defaults to the catalog's audition line)
        #[arg(long)]
        line: Option<String>,
    },
}

#[derive(Subcommand)]
enum SeedAction {
    /// Show saved seeds
    List { character: Option<String> },
    /// Save a seed
    Save {
        character: String,
        #[arg(allow_hyphen_values = true)]
        seed: Seed,
        description: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let project = cli.project;
    let catalog = cli.catalog;

    match cli.command {
        Commands::Status => cmd_status(&open(project, catalog).await?).await,
        Commands::Model { action } => cmd_model(&open(project, catalog).await?, action).await,
        Commands::Prompt {
            character,
            pose,
            expression,
            extra,
        } => {
            let ws = open(project, catalog).await?;
            cmd_prompt(&ws, &character, &pose, &expression, &extra).await
        }
        Commands::Character { action } => {
            cmd_character(&open(project, catalog).await?, action).await
        }
        Commands::Shot { action } => cmd_shot(&open(project, catalog).await?, action).await,
        Commands::Audio { action } => cmd_audio(&open(project, catalog).await?, action).await,
        Commands::Voice { action } => cmd_voice(&open(project, catalog).await?, action).await,
        Commands::Seed { action } => cmd_seed(&open(project, catalog).await?, action).await,
        Commands::Login { key } => cmd_login(key).await,
        Commands::Config => cmd_config(project),
    }
}

async fn open(project: Option<PathBuf>, catalog: Option<PathBuf>) -> Result<Workspace> {
    Workspace::open(project, catalog).await
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info,improv=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ============================================
// Command Implementations
// ============================================

async fn cmd_status(ws: &Workspace) -> Result<()> {
    let images = ws.image_service().await?;
    print!("Image API {}... ", ws.config.image_api_url);

    let status = images.status().await?;
    if !status.reachable {
        println!("{}", "unreachable".red());
        bail!("Start the WebUI with --api and try again");
    }

    println!("{}", "OK".green());
    println!(
        "  Model: {}",
        status.model.as_deref().unwrap_or("Unknown").cyan()
    );
    println!("  Project: {:?}", ws.layout.root());
    println!(
        "  Episode: {} {}",
        ws.episode().cyan(),
        ws.catalog.episode().title.dimmed()
    );

    Ok(())
}

async fn cmd_model(ws: &Workspace, action: ModelAction) -> Result<()> {
    let images = ws.image_service().await?;

    match action {
        ModelAction::List => {
            let current = images.status().await?.model.unwrap_or_default();
            let models = images.list_models().await?;

            if models.is_empty() {
                println!("No models found.");
                return Ok(());
            }

            println!("{}", "Models:".bold());
            for model in models {
                let marker = if model_matches(&current, &model.title) {
                    " (loaded)".green().to_string()
                } else {
                    String::new()
                };
                println!("  {}{}", model.title.cyan(), marker);
            }
        }

        ModelAction::Set { name } => {
            print!("Switching to {}... ", name);
            images.set_model(&name).await?;
            println!("{}", "done".green());
        }
    }

    Ok(())
}

async fn cmd_prompt(
    ws: &Workspace,
    character: &str,
    pose: &str,
    expression: &str,
    extra: &[String],
) -> Result<()> {
    let images = ws.image_service().await?;
    let prompt = images.preview_prompt(character, expression, pose, extra)?;

    // Clean stdout for piping
    println!("{}", prompt);
    Ok(())
}

async fn cmd_character(ws: &Workspace, action: CharacterAction) -> Result<()> {
    let images = ws.image_service().await?;

    match action {
        CharacterAction::List => {
            println!("{}", "Characters:".bold());
            for template in images.templates().iter() {
                println!("  {}", template.id.cyan().bold());
                println!(
                    "    expressions: {}",
                    template.expression_keys().collect::<Vec<_>>().join(", ").dimmed()
                );
                println!(
                    "    poses: {}",
                    template.pose_keys().collect::<Vec<_>>().join(", ").dimmed()
                );
            }
        }

        CharacterAction::Generate {
            id,
            pose,
            expression,
            mode,
            reference,
            denoise,
            negative,
            extra,
            out,
            save_seed,
            image,
        } => {
            let request = CharacterRequest {
                character: id.clone(),
                expression,
                pose,
                extra,
                mode,
                reference,
                seed: image.seed,
                negative_prompt: negative,
                overrides: image.overrides(denoise)?,
                output_dir: out,
            };

            println!(
                "Generating {} ({}, {} / {})...",
                id.cyan().bold(),
                mode,
                request.pose,
                request.expression
            );

            let outcome = images.generate_character(&request).await.map_err(report)?;
            print_files(&outcome.files);
            print_seed(outcome.seed);

            if let Some(description) = save_seed {
                match outcome.seed {
                    Some(seed) => {
                        ws.seed_service()
                            .save(&id, Seed(seed), &description)
                            .await?;
                        println!("{} Seed {} saved for {}", "✓".green(), seed, id);
                    }
                    None => println!("{} No seed reported; nothing saved", "!".yellow()),
                }
            }
        }
    }

    Ok(())
}

async fn cmd_shot(ws: &Workspace, action: ShotAction) -> Result<()> {
    match action {
        ShotAction::List => {
            println!("{} {}", "Shots for episode".bold(), ws.episode().cyan());
            for shot in ws.catalog.shots() {
                println!(
                    "  {} {} - {} / {}",
                    shot.id.cyan(),
                    shot.character,
                    shot.expression.dimmed(),
                    shot.pose.dimmed()
                );
            }
        }

        ShotAction::Generate {
            shot,
            negative,
            image,
        } => {
            let images = ws.image_service().await?;
            let spec = ws.catalog.shot(&shot)?;

            println!("Generating {} ({})...", spec.id.cyan().bold(), spec.character);
            let outcome = images
                .generate_shot(
                    ws.episode(),
                    spec,
                    image.seed,
                    negative.as_deref(),
                    &image.overrides(None)?,
                )
                .await
                .map_err(report)?;
            print_files(&outcome.files);
            print_seed(outcome.seed);
        }

        ShotAction::All { yes } => {
            let shots = ws.catalog.shots();
            if !confirm(yes, &format!("Generate all {} shots?", shots.len()))? {
                return Ok(());
            }

            let images = ws.image_service().await?;
            let mut failed = Vec::new();

            for (i, spec) in shots.iter().enumerate() {
                println!(
                    "\n[{}/{}] {}",
                    i + 1,
                    shots.len(),
                    spec.id.cyan().bold()
                );
                match images
                    .generate_shot(
                        ws.episode(),
                        spec,
                        Seed::RANDOM,
                        None,
                        &ImageSettingsOverride::default(),
                    )
                    .await
                {
                    Ok(outcome) => {
                        print_files(&outcome.files);
                        print_seed(outcome.seed);
                    }
                    Err(e) => {
                        print_error(&e);
                        failed.push(spec.id.clone());
                    }
                }
            }

            summarize(shots.len(), &failed)?;
        }
    }

    Ok(())
}

async fn cmd_audio(ws: &Workspace, action: AudioAction) -> Result<()> {
    match action {
        AudioAction::List => {
            println!("{} {}", "Script for episode".bold(), ws.episode().cyan());
            for line in ws.catalog.lines() {
                println!(
                    "  {} [{}] {}",
                    line.id.cyan(),
                    line.character,
                    truncate_string(&line.text, 60).dimmed()
                );
            }
        }

        AudioAction::Voices => {
            println!("{}", "Casting:".bold());
            for template in ws.catalog.characters() {
                let voice = ws.catalog.voice_id(&template.id).unwrap_or("-");
                let settings = ws.catalog.voice_settings(&template.id);
                println!(
                    "  {} {} stability={} similarity={} style={}",
                    template.id.cyan(),
                    voice.dimmed(),
                    settings.stability,
                    settings.similarity_boost,
                    settings.style
                );
            }
        }

        AudioAction::Generate { line, voice } => {
            let voices = ws.voice_service()?;
            let spec = ws.catalog.line(&line)?;

            println!("Generating {} ({})...", spec.id.cyan().bold(), spec.character);
            println!("  {}", spec.text.dimmed());
            let outcome = voices
                .generate_line(ws.episode(), spec, &voice.overrides()?)
                .await
                .map_err(report)?;
            println!(
                "  {} {} (stability={}, style={})",
                "Saved:".green(),
                outcome.file.display(),
                outcome.settings.stability,
                outcome.settings.style
            );
        }

        AudioAction::All { yes } => {
            let lines = ws.catalog.lines();
            let voices = ws.voice_service()?;
            if !confirm(yes, &format!("Generate audio for all {} lines?", lines.len()))? {
                return Ok(());
            }

            let mut failed = Vec::new();
            for (i, spec) in lines.iter().enumerate() {
                println!("\n[{}/{}] {}", i + 1, lines.len(), spec.id.cyan().bold());
                match voices
                    .generate_line(ws.episode(), spec, &VoiceSettingsOverride::default())
                    .await
                {
                    Ok(outcome) => println!("  {} {}", "Saved:".green(), outcome.file.display()),
                    Err(e) => {
                        print_error(&e);
                        failed.push(spec.id.clone());
                    }
                }
            }

            summarize(lines.len(), &failed)?;
        }
    }

    Ok(())
}

async fn cmd_voice(ws: &Workspace, action: VoiceAction) -> Result<()> {
    let voices = ws.voice_service()?;

    match action {
        VoiceAction::List => {
            let available = voices.list_voices().await?;
            if available.is_empty() {
                println!("No voices found.");
                return Ok(());
            }

            println!("{}", "Voices:".bold());
            for voice in available {
                println!("  {} {}", voice.voice_id.dimmed(), voice.name.cyan());
            }
        }

        VoiceAction::Design { character } => {
            let brief = ws.catalog.design_brief(&character)?;
            design_one(ws, &voices, &brief).await.map_err(report)?;
            println!("\nListen to the previews and put the chosen voice id in the catalog.");
        }

        VoiceAction::DesignAll { yes } => {
            let characters = ws.catalog.design_characters();
            if !confirm(
                yes,
                &format!("Design voices for {} characters?", characters.len()),
            )? {
                return Ok(());
            }

            let mut failed = Vec::new();
            for character in &characters {
                let result = match ws.catalog.design_brief(character) {
                    Ok(brief) => design_one(ws, &voices, &brief).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = result {
                    print_error(&e);
                    failed.push(character.clone());
                }
            }

            summarize(characters.len(), &failed)?;
        }

        VoiceAction::Audition {
            character,
            voices: candidates,
            line,
        } => {
            let audition = ws.catalog.audition(&character);
            let candidates = if candidates.is_empty() {
                audition
                    .map(|a| {
                        a.voices
                            .iter()
                            .map(|(name, id)| (name.clone(), id.clone()))
                            .collect::<Vec<_>>()
                    })
                    .unwrap_or_default()
            } else {
                candidates
            };
            if candidates.is_empty() {
                bail!("No candidate voices for '{}'. Pass --voice NAME=ID", character);
            }

            let line = line
                .or_else(|| audition.map(|a| a.line.clone()))
                .context("No audition line. Pass --line TEXT")?;

            println!("Auditioning {} voices for {}...", candidates.len(), character.cyan());
            let takes = voices
                .audition(ws.episode(), &character, &line, &candidates)
                .await;

            let mut failed = Vec::new();
            for take in &takes {
                match &take.result {
                    Ok(path) => println!("  {} {} {}", "✓".green(), take.name.cyan(), path.display()),
                    Err(e) => {
                        println!("  {} {} {}", "✗".red(), take.name.cyan(), e);
                        failed.push(take.name.clone());
                    }
                }
            }

            summarize(takes.len(), &failed)?;
        }
    }

    Ok(())
}

async fn design_one(
    ws: &Workspace,
    voices: &workspace::Voices,
    brief: &improv::VoiceDesignBrief,
) -> Result<(), PipelineError> {
    println!("\nDesigning voice for {}...", brief.character.cyan().bold());
    println!("  {}", truncate_string(brief.description.trim(), 100).dimmed());

    let designed = voices.design_voice(ws.episode(), brief).await?;
    for (i, preview) in designed.iter().enumerate() {
        println!("  Preview {}: {}", i, preview.audio.display());
        println!("    Voice ID: {}", preview.voice_id.cyan());
    }
    Ok(())
}

async fn cmd_seed(ws: &Workspace, action: SeedAction) -> Result<()> {
    let seeds = ws.seed_service();

    match action {
        SeedAction::List { character } => {
            let registries = match character {
                Some(character) => {
                    let registry = seeds.get(&character).await?;
                    vec![(character, registry)]
                }
                None => seeds.list_all().await?,
            };

            if registries.iter().all(|(_, r)| r.is_empty()) {
                println!("No saved seeds.");
                return Ok(());
            }

            for (character, registry) in registries {
                println!("{}", character.cyan().bold());
                for (seed, record) in registry.iter() {
                    println!(
                        "  {} {} {}",
                        seed,
                        record.description,
                        record.saved_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
                    );
                }
            }
        }

        SeedAction::Save {
            character,
            seed,
            description,
        } => {
            let registry = seeds.save(&character, seed, &description).await?;
            println!(
                "{} Seed {} saved for {} ({} total)",
                "✓".green(),
                seed,
                character.cyan(),
                registry.len()
            );
        }
    }

    Ok(())
}

async fn cmd_login(key: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    let api_key = match key {
        Some(k) => k,
        None => Password::new()
            .with_prompt("ElevenLabs API Key")
            .interact()
            .context("Failed to read API key")?,
    };

    // Test the key
    let client = ElevenLabsClient::new(
        ElevenLabsConfig::new(api_key.clone())?
            .with_base_url(&config.speech_api_url)
            .with_timeout(config.speech_timeout()),
    )?;
    print!("Testing key... ");

    match client.list_voices().await {
        Ok(voices) => println!("{} ({} voices)", "OK".green(), voices.len()),
        Err(e) => {
            println!("{}", "Failed".red());
            bail!("Could not reach ElevenLabs with this key: {}", e);
        }
    }

    config.set_api_key(api_key);
    config.save()?;

    println!("{} API key saved to {:?}", "✓".green(), Config::config_path()?);
    Ok(())
}

fn cmd_config(project: Option<PathBuf>) -> Result<()> {
    let config = Config::load()?;
    let root = project.unwrap_or_else(|| config.project_root.clone());
    let env_file = improv_pipeline::ProjectLayout::new(&root).env_file();
    let key = config::resolve_api_key(
        std::env::var(improv_pipeline::adapters::elevenlabs::API_KEY_ENV).ok(),
        &env_file,
        config.api_key.as_deref(),
    );

    println!("{}", "Configuration:".bold());
    println!("  Path: {:?}", Config::config_path()?);
    println!("  Project root: {:?}", root);
    println!("  Image API: {} (timeout {}s)", config.image_api_url, config.image_timeout_secs);
    println!(
        "  Speech API: {} (timeout {}s)",
        config.speech_api_url, config.speech_timeout_secs
    );
    println!("  TTS model: {}", config.tts_model);
    println!(
        "  API Key: {}",
        if key.is_ok() { "Set".green() } else { "Not set".red() }
    );

    Ok(())
}

// ============================================
// Helpers
// ============================================

fn read_toml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    toml::from_str(&content).with_context(|| format!("Invalid settings in {:?}", path))
}

fn parse_voice_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, id)) if !name.trim().is_empty() && !id.trim().is_empty() => {
            Ok((name.trim().to_string(), id.trim().to_string()))
        }
        _ => Err(format!("expected NAME=VOICE_ID, got '{}'", raw)),
    }
}

fn confirm(yes: bool, question: &str) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Confirm::new()
        .with_prompt(question)
        .default(false)
        .interact()
        .context("Failed to read confirmation")
}

/// Show files that made it to disk before a partial failure, then pass it on
fn report(err: PipelineError) -> anyhow::Error {
    if !err.written_paths().is_empty() {
        eprintln!("{}", "Partially written:".yellow());
        print_files(err.written_paths());
    }
    err.into()
}

fn print_error(err: &PipelineError) {
    println!("  {} {}", "Error:".red(), err);
    if !err.written_paths().is_empty() {
        print_files(err.written_paths());
    }
}

fn print_files(files: &[PathBuf]) {
    for file in files {
        println!("  {} {}", "Saved:".green(), file.display());
    }
}

fn print_seed(seed: Option<i64>) {
    match seed {
        Some(seed) => println!("  Seed: {}", seed.to_string().cyan()),
        None => println!("  Seed: {}", "unknown".dimmed()),
    }
}

fn summarize(total: usize, failed: &[String]) -> Result<()> {
    let ok = total - failed.len();
    println!(
        "\n{} {}/{} succeeded",
        if failed.is_empty() { "✓".green() } else { "!".yellow() },
        ok,
        total
    );
    if !failed.is_empty() {
        bail!("Failed: {}", failed.join(", "));
    }
    Ok(())
}

/// Truncate string safely for UTF-8 (by char count, not bytes)
fn truncate_string(s: &str, max_chars: usize) -> String {
    let chars: Vec<char> = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        format!("{}...", chars.into_iter().collect::<String>())
    } else {
        s.to_string()
    }
}
