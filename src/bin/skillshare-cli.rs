use clap::{Parser, Subcommand};
use serde::Serialize;
use skillshare_sdk::{GlossaryEntry, PollResult, SkillShareClient};

#[derive(Parser)]
#[command(name = "skillshare-cli")]
#[command(about = "Command-line client for the skill-sharing talk board", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all talks
    Talks,
    /// Show one talk with its comments
    Show { title: String },
    /// Propose a talk (replaces an existing one with the same title)
    Propose {
        title: String,
        #[arg(short, long)]
        presenter: String,
        #[arg(short, long)]
        summary: String,
    },
    /// Comment on a talk
    Comment {
        title: String,
        #[arg(short, long)]
        author: String,
        #[arg(short, long)]
        message: String,
    },
    /// Delete a talk
    Delete { title: String },
    /// Print the talk list every time it changes
    Watch {
        /// Seconds the server may hold each poll open
        #[arg(short, long, default_value_t = 90)]
        wait: u64,
    },
    /// List the glossary
    Words,
    /// Add or replace a glossary entry
    AddWord {
        word_pair: String,
        #[arg(short, long)]
        local: String,
        #[arg(short, long)]
        foreign: String,
    },
    /// Remove a glossary entry
    DeleteWord { word_pair: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = SkillShareClient::new(&cli.url)?;

    match cli.command {
        Commands::Talks => print_json(&client.talks().await?)?,
        Commands::Show { title } => match client.talk(&title).await? {
            Some(talk) => print_json(&talk)?,
            None => eprintln!("Error: no talk '{}'", title),
        },
        Commands::Propose {
            title,
            presenter,
            summary,
        } => {
            client.put_talk(&title, &presenter, &summary).await?;
            println!("Proposed '{}'", title);
        }
        Commands::Comment {
            title,
            author,
            message,
        } => {
            client.add_comment(&title, &author, &message).await?;
            println!("Comment added to '{}'", title);
        }
        Commands::Delete { title } => {
            client.delete_talk(&title).await?;
            println!("Deleted '{}'", title);
        }
        Commands::Watch { wait } => watch(&client, wait).await?,
        Commands::Words => print_json(&client.glossary().await?)?,
        Commands::AddWord {
            word_pair,
            local,
            foreign,
        } => {
            let entry = GlossaryEntry {
                word_pair,
                local,
                foreign,
            };
            print_json(&client.put_word(&entry).await?)?;
        }
        Commands::DeleteWord { word_pair } => print_json(&client.delete_word(&word_pair).await?)?,
    }

    Ok(())
}

/// Long-poll loop: the first request is unconditional, every later one
/// carries the last tag and waits for a change.
async fn watch(client: &SkillShareClient, wait: u64) -> Result<(), Box<dyn std::error::Error>> {
    let mut tag: Option<String> = None;
    loop {
        let wait_hint = tag.as_ref().map(|_| wait);
        match client.poll_talks(tag.as_deref(), wait_hint).await {
            Ok(PollResult::Changed { talks, tag: next }) => {
                print_json(&talks)?;
                tag = next;
            }
            Ok(PollResult::NotModified) => {}
            Err(e) => {
                eprintln!("Error: {}", e);
                tokio::time::sleep(std::time::Duration::from_millis(500)).await;
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
