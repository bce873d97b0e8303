use std::io;
use std::process;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, shells};
use deskbot::commands::ask::{self, AskArgs};
use deskbot::commands::catalog::{self, CatalogArgs};
use deskbot::commands::chat::{self, ChatArgs};
use deskbot::commands::config::{self, ConfigArgs};
use deskbot::logging;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("DESK_GIT_SHA"),
    ", built ",
    env!("DESK_BUILD_TS"),
    ")"
);

const ROOT_HELP_EXAMPLES: &str = "Examples:\n  deskbot chat\n  deskbot ask \"Quais são os códigos de erro do WhatsApp?\"\n  echo \"Como configuro o chatbot?\" | deskbot ask --json\n  deskbot catalog\n  deskbot config check --profile default\n  deskbot completion bash > ~/.local/share/bash-completion/completions/deskbot";

const ASK_HELP_EXAMPLES: &str = "Examples:\n  deskbot ask \"Oi\"\n  deskbot ask --provider fireworks --model accounts/fireworks/models/kimi-k2-instruct-0905 \"Oi\"\n  deskbot ask --dry-run \"Explain the recursion limit\"";

#[derive(Debug, Parser)]
#[command(
    name = "deskbot",
    version,
    long_version = LONG_VERSION,
    about = "Help-desk assistant with documentation lookup",
    after_help = ROOT_HELP_EXAMPLES
)]
struct Cli {
    /// Log resolved settings and each agent step to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Start an interactive help-desk conversation")]
    Chat(ChatArgs),
    #[command(about = "Answer a single question", after_help = ASK_HELP_EXAMPLES)]
    Ask(AskArgs),
    #[command(about = "List the documentation catalog")]
    Catalog(CatalogArgs),
    #[command(about = "Manage local config")]
    Config(ConfigArgs),
    #[command(about = "Generate shell completion script")]
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

fn print_completion(shell: CompletionShell) {
    let mut cmd = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut cmd, "deskbot", &mut io::stdout()),
        CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, "deskbot", &mut io::stdout()),
        CompletionShell::Fish => generate(shells::Fish, &mut cmd, "deskbot", &mut io::stdout()),
    }
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Chat(args) => chat::run(args),
        Commands::Ask(args) => ask::run(args),
        Commands::Catalog(args) => catalog::run(args),
        Commands::Config(args) => config::run(args),
        Commands::Completion { shell } => {
            print_completion(shell);
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("{err:#}");
        process::exit(1);
    }
}
