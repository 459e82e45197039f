//! Interactive `chat` command

use anyhow::Result;
use clap::Args;
use console::style;
use dialoguer::{theme::ColorfulTheme, Input};
use std::path::PathBuf;

use super::shared::{build_engine, fetch_snapshot, http_client, spinner, RepoArgs};
use crate::domain::{ConversationTurn, RepoSnapshot};
use crate::engine::{ChatReply, Engine};
use crate::render::{render_transcript, write_markdown};
use crate::session::Session;

#[derive(Args, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub repo: RepoArgs,

    /// Ask a single question and exit
    #[arg(short, long, value_name = "TEXT")]
    pub question: Option<String>,

    /// Save the conversation as Markdown when the session ends
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,
}

const HELP: &str = "Commands: /suggest [text], /clear, /save <file>, /quit";

pub async fn run(args: ChatArgs) -> Result<()> {
    let config = args.repo.config.load()?;
    let http = http_client()?;
    let engine = build_engine(&config, &http)?;
    let snapshot = fetch_snapshot(&config, &args.repo, &http).await?;

    let mut session = Session::new(args.repo.token.clone());
    session.set_repo(&args.repo.request()?.display_name());

    if let Some(question) = &args.question {
        ask(&engine, &snapshot, &mut session, question).await?;
    } else {
        eprintln!(
            "{} {} ({} files analyzed). {HELP}",
            style("Chatting about").bold(),
            style(&snapshot.name).cyan(),
            snapshot.total_files_analyzed()
        );
        interactive(&engine, &snapshot, &mut session).await?;
    }

    if let Some(path) = &args.save {
        save(&snapshot, &session, path)?;
    }
    Ok(())
}

async fn interactive(engine: &Engine, snapshot: &RepoSnapshot, session: &mut Session) -> Result<()> {
    let theme = ColorfulTheme::default();
    loop {
        let line: String = Input::with_theme(&theme)
            .with_prompt("You")
            .allow_empty(true)
            .interact_text()?;
        let line = line.trim();

        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            ("", _) => continue,
            ("/quit" | "/exit", _) => break,
            ("/clear", _) => {
                session.clear();
                eprintln!("{}", style("Conversation cleared.").dim());
            }
            ("/suggest", partial) => {
                for suggestion in session.suggestions(partial) {
                    eprintln!("  {}", style(suggestion).dim());
                }
            }
            ("/save", path) if !path.is_empty() => save(snapshot, session, &PathBuf::from(path))?,
            (cmd, _) if cmd.starts_with('/') => eprintln!("{HELP}"),
            _ => {
                if let Err(err) = ask(engine, snapshot, session, line).await {
                    eprintln!("{} {err:#}", style("error:").red().bold());
                }
            }
        }
    }
    Ok(())
}

async fn ask(engine: &Engine, snapshot: &RepoSnapshot, session: &mut Session, question: &str) -> Result<()> {
    session.record_query(question);

    let bar = spinner("Thinking");
    let result = engine.converse(snapshot, question, session.history()).await;
    bar.finish_and_clear();
    let reply = result?;

    print_reply(&reply);
    session.push_turn(ConversationTurn::user(question));
    let mut turn = ConversationTurn::assistant(reply.answer);
    turn.diagram = reply.diagram;
    turn.follow_ups = reply.follow_ups;
    session.push_turn(turn);
    Ok(())
}

fn print_reply(reply: &ChatReply) {
    println!("\n{}\n", reply.answer);
    if let Some(diagram) = &reply.diagram {
        println!("```mermaid\n{}\n```\n", diagram.code);
    }
    if !reply.follow_ups.is_empty() {
        eprintln!("{}", style("Follow-up ideas:").bold());
        for question in &reply.follow_ups {
            eprintln!("  - {question}");
        }
    }
}

fn save(snapshot: &RepoSnapshot, session: &Session, path: &std::path::Path) -> Result<()> {
    write_markdown(path, &render_transcript(&snapshot.name, session.history()))?;
    eprintln!("{} conversation saved to {}", style("✓").green(), path.display());
    Ok(())
}
