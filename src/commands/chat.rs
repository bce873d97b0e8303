use std::io::{self, BufRead, IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;

use crate::commands::{ModelArgs, open_session};

const EXIT_WORDS: &[&str] = &["sair", "exit", "quit"];
const RESET_COMMAND: &str = "/limpar";

#[derive(Debug, Args, Clone)]
pub struct ChatArgs {
    #[command(flatten)]
    pub model: ModelArgs,
}

/// What the REPL should do with one input line.
#[derive(Debug, PartialEq, Eq)]
enum LineAction<'a> {
    Exit,
    Skip,
    Reset,
    Ask(&'a str),
}

fn classify(line: &str) -> LineAction<'_> {
    let line = line.trim();
    if line.is_empty() {
        LineAction::Skip
    } else if EXIT_WORDS.contains(&line.to_lowercase().as_str()) {
        LineAction::Exit
    } else if line.eq_ignore_ascii_case(RESET_COMMAND) {
        LineAction::Reset
    } else {
        LineAction::Ask(line)
    }
}

struct Labels {
    color: bool,
}

impl Labels {
    fn user(&self) -> String {
        if self.color {
            "Você:".bold().green().to_string()
        } else {
            "Você:".to_string()
        }
    }

    fn assistant(&self) -> String {
        if self.color {
            "Assistente:".bold().cyan().to_string()
        } else {
            "Assistente:".to_string()
        }
    }
}

pub fn run(args: ChatArgs) -> Result<()> {
    let settings = args.model.resolve()?;
    let mut session = open_session(&settings)?;

    let stdout = io::stdout();
    let labels = Labels {
        color: stdout.is_terminal(),
    };
    let mut out = stdout.lock();
    let rule = "=".repeat(60);
    writeln!(out, "\n{rule}\nHELP DESK\n{rule}")?;
    writeln!(out, "Digite 'sair' para encerrar ou '{RESET_COMMAND}' para recomeçar.")?;
    writeln!(out, "{}", "-".repeat(60))?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        write!(out, "\n{} ", labels.user())?;
        out.flush()?;

        line.clear();
        let read = input
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        if read == 0 {
            writeln!(out, "\nEncerrando.")?;
            break;
        }

        match classify(&line) {
            LineAction::Skip => continue,
            LineAction::Exit => {
                writeln!(out, "\nEncerrando.")?;
                break;
            }
            LineAction::Reset => {
                session.reset();
                writeln!(out, "{} Conversa reiniciada.", labels.assistant())?;
            }
            LineAction::Ask(message) => {
                writeln!(out, "{} ...pensando...", labels.assistant())?;
                out.flush()?;
                let language = session.detect_language(message);
                let native_reply = session.answer(message);
                if session.needs_translation(&language) {
                    writeln!(
                        out,
                        "{} ...traduzindo para '{}'...",
                        labels.assistant(),
                        language
                    )?;
                    out.flush()?;
                }
                let reply = session.localize(native_reply, language);
                writeln!(out, "{} {}", labels.assistant(), reply.text)?;
            }
        }
    }
    Ok(())
}
