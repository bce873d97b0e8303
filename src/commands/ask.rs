use std::io::{self, IsTerminal, Read};

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;

use crate::commands::{ModelArgs, open_session};
use crate::config::{self, Settings};
use crate::rchain::provider::is_api_key_present;

#[derive(Debug, Args, Clone)]
pub struct AskArgs {
    #[command(flatten)]
    pub model: ModelArgs,
    /// Print the reply as JSON.
    #[arg(long)]
    pub json: bool,
    /// Print the resolved settings without calling the provider.
    #[arg(long)]
    pub dry_run: bool,
    /// Question to ask; read from stdin when omitted.
    pub question: Option<String>,
}

#[derive(Debug, Serialize)]
struct DryRun<'a> {
    dry_run: bool,
    question: &'a str,
    api_key_present: bool,
    catalog_documents: usize,
    settings: &'a Settings,
}

pub fn run(args: AskArgs) -> Result<()> {
    let question = read_question(args.question.as_deref())?;
    let settings = args.model.resolve()?;

    if args.dry_run {
        let options = settings.desk_options(config::load_documents()?)?;
        let report = DryRun {
            dry_run: true,
            question: &question,
            api_key_present: is_api_key_present(settings.provider),
            catalog_documents: options.catalog.len(),
            settings: &settings,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let mut session = open_session(&settings)?;
    let reply = session.respond(&question);
    if args.json {
        println!("{}", serde_json::to_string(&reply)?);
    } else {
        println!("{}", reply.text);
    }
    Ok(())
}

fn read_question(argument: Option<&str>) -> Result<String> {
    if let Some(question) = argument.map(str::trim).filter(|value| !value.is_empty()) {
        return Ok(question.to_string());
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        bail!("No question provided. Pass it as an argument or through stdin.");
    }
    let mut buffer = String::new();
    stdin
        .lock()
        .read_to_string(&mut buffer)
        .context("Failed to read question from stdin")?;
    let question = buffer.trim();
    if question.is_empty() {
        bail!("No question provided. Pass it as an argument or through stdin.");
    }
    Ok(question.to_string())
}
