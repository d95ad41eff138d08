mod cli;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use elevate::config::ElevateConfig;
use elevate::store::types::{AiSettingsUpdate, UserProfileUpdate};

#[derive(Parser)]
#[command(name = "elevate", version, about = "Habit and task tracker with an AI coach")]
struct Cli {
    /// Config file (default: ~/.elevate/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage recurring habits
    Habit {
        #[command(subcommand)]
        action: HabitAction,
    },
    /// Manage one-off tasks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Manage what the coach remembers about you
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },
    /// Assistant settings and user profile
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Talk to the coach (interactive without a message)
    #[command(args_conflicts_with_subcommands = true)]
    Chat {
        #[command(subcommand)]
        action: Option<ChatAction>,
        /// Send one message and exit
        message: Option<String>,
    },
    /// Read text aloud (defaults to the last assistant message)
    Speak { text: Option<String> },
    /// Daily progress, recent activity, and streaks
    Stats {
        #[arg(long)]
        date: Option<String>,
    },
    /// Write a JSON backup
    Export {
        /// Output file, or `-` for stdout
        #[arg(long, short)]
        output: Option<String>,
    },
    /// Restore from a JSON backup
    Import { file: PathBuf },
    /// Delete all data (asks for confirmation)
    Reset,
    /// Database diagnostics
    Doctor,
}

#[derive(Subcommand)]
enum HabitAction {
    Add {
        name: String,
        #[arg(long, default_value = "General")]
        category: String,
        #[arg(long, default_value = "⭐")]
        icon: String,
    },
    List {
        #[arg(long)]
        date: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    Delete { id: String },
    /// Flip completion for a day (default today)
    Toggle {
        id: String,
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    Add {
        name: String,
        /// YYYY-MM-DD (default today)
        #[arg(long)]
        date: Option<String>,
    },
    List {
        #[arg(long)]
        date: Option<String>,
        /// Every task regardless of date
        #[arg(long, conflicts_with = "date")]
        all: bool,
    },
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },
    Delete { id: String },
    Toggle { id: String },
}

#[derive(Subcommand)]
enum MemoryAction {
    Add { content: String },
    List,
    Update { id: String, content: String },
    Delete { id: String },
}

#[derive(Subcommand)]
enum SettingsAction {
    Show,
    /// Update assistant settings
    Ai(AiArgs),
    /// Update the user profile
    Profile(ProfileArgs),
    /// List suggested personas, models, and voices
    Options,
    /// Set an avatar from a file or generate the assistant's
    Avatar {
        #[arg(long, conflicts_with = "generate")]
        file: Option<PathBuf>,
        #[arg(long)]
        generate: bool,
        /// Apply to the user profile instead of the assistant
        #[arg(long)]
        profile: bool,
    },
}

#[derive(Args)]
struct AiArgs {
    #[arg(long)]
    api_key: Option<String>,
    #[arg(long)]
    name: Option<String>,
    #[arg(long)]
    persona: Option<String>,
    #[arg(long)]
    behavior: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    voice: Option<String>,
}

#[derive(Args)]
struct ProfileArgs {
    #[arg(long)]
    name: Option<String>,
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    dob: Option<String>,
    #[arg(long)]
    about: Option<String>,
    #[arg(long)]
    goals: Option<String>,
}

#[derive(Subcommand)]
enum ChatAction {
    /// Print the transcript
    History,
    /// Forget the transcript and start over
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => ElevateConfig::load_from(path)?,
        None => ElevateConfig::load()?,
    };

    // stderr keeps stdout clean for `export -`.
    let filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Habit { action } => match action {
            HabitAction::Add { name, category, icon } => {
                cli::habit::add(&config, &name, &category, &icon)?
            }
            HabitAction::List { date } => cli::habit::list(&config, date.as_deref())?,
            HabitAction::Update { id, name, category, icon } => {
                cli::habit::update(&config, &id, name, category, icon)?
            }
            HabitAction::Delete { id } => cli::habit::delete(&config, &id)?,
            HabitAction::Toggle { id, date } => cli::habit::toggle(&config, &id, date.as_deref())?,
        },
        Command::Task { action } => match action {
            TaskAction::Add { name, date } => cli::task::add(&config, &name, date.as_deref())?,
            TaskAction::List { date, all } => cli::task::list(&config, date.as_deref(), all)?,
            TaskAction::Update { id, name, date } => cli::task::update(&config, &id, name, date)?,
            TaskAction::Delete { id } => cli::task::delete(&config, &id)?,
            TaskAction::Toggle { id } => cli::task::toggle(&config, &id)?,
        },
        Command::Memory { action } => match action {
            MemoryAction::Add { content } => cli::memory::add(&config, &content)?,
            MemoryAction::List => cli::memory::list(&config)?,
            MemoryAction::Update { id, content } => cli::memory::update(&config, &id, &content)?,
            MemoryAction::Delete { id } => cli::memory::delete(&config, &id)?,
        },
        Command::Settings { action } => match action {
            SettingsAction::Show => cli::settings::show(&config)?,
            SettingsAction::Ai(args) => cli::settings::update_ai(
                &config,
                AiSettingsUpdate {
                    api_key: args.api_key,
                    name: args.name,
                    persona: args.persona,
                    behavior: args.behavior,
                    model: args.model,
                    voice: args.voice,
                    avatar: None,
                },
            )?,
            SettingsAction::Profile(args) => cli::settings::update_profile(
                &config,
                UserProfileUpdate {
                    name: args.name,
                    dob: args.dob,
                    about: args.about,
                    goals: args.goals,
                    avatar: None,
                },
            )?,
            SettingsAction::Options => cli::settings::options()?,
            SettingsAction::Avatar { file, generate, profile } => {
                cli::settings::avatar(&config, file.as_deref(), generate, profile).await?
            }
        },
        Command::Chat { action, message } => match action {
            Some(ChatAction::History) => cli::chat::history(&config)?,
            Some(ChatAction::Clear) => cli::chat::clear(&config)?,
            None => cli::chat::chat(&config, message.as_deref()).await?,
        },
        Command::Speak { text } => cli::speak::speak(&config, text.as_deref()).await?,
        Command::Stats { date } => cli::stats::stats(&config, date.as_deref())?,
        Command::Export { output } => cli::export::export(&config, output.as_deref())?,
        Command::Import { file } => cli::import::import(&config, &file)?,
        Command::Reset => cli::reset::reset(&config)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
