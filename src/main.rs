// Deep-Research: Main Entry Point
// Interactive research run, or the scripted demo

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use deep_research::{
    Credentials, DialogueOutcome, DialogueTurnOutput, FileSessionStore, MemorySessionStore,
    ResearchService, ResponseSource, ScriptedResponses, SessionStore, Settings, SystemMonitor,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

const DEMO_IDEA: &str =
    "An AI-powered personal fitness coach app that creates personalized workout plans";

const DEMO_ANSWERS: [&str; 3] = [
    "The target market is health-conscious adults aged 25-45 who want to work out at home or in the gym but cannot afford a personal trainer.",
    "A freemium subscription: basic plans are free, premium adds adaptive programs, nutrition guidance and progress analytics for a monthly fee.",
    "AI personalization that adapts every workout to the user's progress, plus real-time form feedback through the phone camera.",
];

/// Deep-Research - guarded requirements dialogue and multi-agent business research
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Name of the user the research is for
    #[arg(long, global = true)]
    user: Option<String>,

    /// Maximum results per search request
    #[arg(long, global = true, value_name = "N")]
    max_results: Option<u32>,

    /// Directory for saved reports
    #[arg(long, global = true, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Directory for conversation sessions
    #[arg(long, global = true, value_name = "DIR")]
    session_dir: Option<PathBuf>,

    /// Keep sessions in memory only
    #[arg(long, global = true)]
    in_memory_sessions: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Clone, Copy)]
enum Commands {
    /// Read the idea and answers from stdin (default)
    Run,

    /// Research a fixed example idea with scripted answers
    Demo,
}

/// Answers typed at the terminal
struct StdinResponses {
    lines: Lines<BufReader<Stdin>>,
}

impl StdinResponses {
    fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    async fn prompt(&mut self, label: &str) -> Option<String> {
        print!("{}", label);
        let _ = std::io::stdout().flush();
        match self.lines.next_line().await {
            Ok(Some(line)) => Some(line.trim().to_string()),
            Ok(None) => None,
            Err(e) => {
                log::error!("Failed to read stdin: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl ResponseSource for StdinResponses {
    async fn next_response(&mut self, turn: &DialogueTurnOutput) -> Option<String> {
        println!("\nQuestion {}: {}", turn.question_number, turn.question);
        self.prompt("Your response: ").await.filter(|r| !r.is_empty())
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn apply_flags(mut settings: Settings, cli: &Cli) -> Settings {
    if let Some(user) = &cli.user {
        settings.user_name = user.clone();
    }
    if let Some(max_results) = cli.max_results {
        settings.max_results = max_results.max(1);
    }
    if let Some(dir) = &cli.output_dir {
        settings.researches_dir = dir.clone();
    }
    if let Some(dir) = &cli.session_dir {
        settings.session_dir = dir.clone();
    }
    settings
}

fn print_outcome(outcome: &DialogueOutcome) {
    match outcome {
        DialogueOutcome::Confirmed { summary, turns } => {
            if let Some(last) = turns.last() {
                println!("\nQuestion {}: {}", last.question_number, last.question);
            }
            if !summary.trim().is_empty() {
                println!("\nRequirements Summary: {}", summary);
            }
            println!("\nRequirements gathering completed!");
        }
        DialogueOutcome::Aborted { reason } => println!("Guardrail triggered: {}", reason),
        DialogueOutcome::Abandoned { .. } => println!("\nRequirements gathering stopped."),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();
    init_logging(cli.verbose);

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let settings = apply_flags(Settings::load()?, &cli);
    let store: Arc<dyn SessionStore> = if cli.in_memory_sessions {
        Arc::new(MemorySessionStore::new())
    } else {
        Arc::new(FileSessionStore::new(settings.session_dir.clone()).await?)
    };
    let service = ResearchService::from_credentials(settings, &credentials, store)?;

    let outcome = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => {
            let mut responses = StdinResponses::new();
            let Some(idea) = responses.prompt("Idea: ").await.filter(|i| !i.is_empty()) else {
                println!("❌ No research requirements found. Exiting.");
                return Ok(());
            };
            service.gather_requirements(&idea, &mut responses).await
        }
        Commands::Demo => {
            println!("Idea: {}", DEMO_IDEA);
            let mut responses = ScriptedResponses::new(DEMO_ANSWERS);
            service.gather_requirements(DEMO_IDEA, &mut responses).await
        }
    };

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            println!("❌ No research requirements found. Exiting.");
            return Ok(());
        }
    };
    print_outcome(&outcome);

    let Some(requirements) = outcome.summary() else {
        println!("❌ No research requirements found. Exiting.");
        return Ok(());
    };

    let preferences = service.preferences();
    let topic: String = requirements.chars().take(100).collect();
    println!("🚀 Starting Deep Research AI System...");
    println!("👤 User: {}", preferences.name);
    println!("📊 Max results per search: {}", preferences.max_results);
    println!("🎯 Research Topic: {}...", topic);
    println!("{}", "-".repeat(80));

    let monitor = Arc::new(SystemMonitor::new());
    match service
        .execute_research_plan(requirements, preferences, monitor.clone())
        .await?
    {
        Some(report) => {
            println!("\nFinal result: {}", report.report());
            match &report.saved_to {
                Some(path) => println!("\n✅ Research saved to: {}", path.display()),
                None => println!("\n❌ Error saving research file"),
            }
            if !report.run.skipped_steps.is_empty() {
                println!("⚠️  Skipped steps: {}", report.run.skipped_steps.join(", "));
            }
            let stats = monitor.stats();
            println!(
                "📊 {} agents used, {} handoffs, tools: {:?}",
                stats.active_agents.len(),
                stats.handoffs,
                stats.tool_usage
            );
        }
        None => println!("❌ No research requirements found. Exiting."),
    }

    Ok(())
}
