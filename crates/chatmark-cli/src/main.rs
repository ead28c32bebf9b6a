use anyhow::{Context, Result, bail};
use chatmark_config::Config;
use chatmark_engine::{
    DisplayMode, DisplayToken, Pipeline, PipelineContext, StaticEmojiRegistry,
    StaticMemberDirectory, WireToken,
};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::io::{self, Read};
use std::path::PathBuf;

/// Chat markdown pipelines from the command line.
#[derive(Parser)]
#[command(name = "chatmark")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file (default: ~/.config/chatmark/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Known member, as ID=NAME. Repeatable.
    #[arg(long = "member", global = true, value_name = "ID=NAME", value_parser = parse_member)]
    members: Vec<(String, String)>,

    /// Member whose mentions use the legacy shape. Repeatable.
    #[arg(long = "legacy", global = true, value_name = "ID")]
    legacy: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Receive path: print the encoded display text
    Render {
        #[command(flatten)]
        input: Input,
        /// Single-line preview layout
        #[arg(long)]
        preview: bool,
        /// Print text and tokens as JSON
        #[arg(long)]
        json: bool,
    },
    /// Send path: print the sanitized text that would be stored
    Send {
        #[command(flatten)]
        input: Input,
    },
    /// Print the plain-text projection
    Plain {
        #[command(flatten)]
        input: Input,
    },
    /// Print the outgoing display text and tokens as JSON
    Tokens {
        #[command(flatten)]
        input: Input,
    },
    /// Print a stored message as clipboard text
    Copy {
        #[command(flatten)]
        input: Input,
    },
    /// Print a stored message as composer text for editing
    Edit {
        #[command(flatten)]
        input: Input,
    },
}

#[derive(Args)]
struct Input {
    /// Message file (default: stdin)
    file: Option<PathBuf>,
}

impl Input {
    fn read(&self) -> Result<String> {
        match &self.file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display())),
            None => {
                let mut text = String::new();
                io::stdin()
                    .read_to_string(&mut text)
                    .context("Failed to read stdin")?;
                Ok(text)
            }
        }
    }
}

#[derive(Serialize)]
struct TokenDump {
    text: String,
    tokens: Vec<WireToken>,
}

impl TokenDump {
    fn new(text: String, tokens: Vec<DisplayToken>) -> Self {
        Self {
            text,
            tokens: tokens.into_iter().map(WireToken::from).collect(),
        }
    }
}

fn parse_member(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((id, name)) if !id.is_empty() => Ok((id.to_string(), name.to_string())),
        _ => Err(format!("expected ID=NAME, got {raw:?}")),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let path = match path {
        Some(path) => Config::expand_path(path).unwrap_or_else(|| path.clone()),
        None => Config::config_path(),
    };
    log::debug!("Config path: {}", path.display());
    match Config::load_from_path(&path)? {
        Some(config) => Ok(config),
        None if path != Config::config_path() => {
            bail!("Config file {} does not exist", path.display())
        }
        None => Ok(Config::default()),
    }
}

struct Session {
    pipeline: Pipeline,
    members: StaticMemberDirectory,
    emoji: StaticEmojiRegistry,
}

impl Session {
    fn new(cli: &Cli, config: &Config) -> Result<Self> {
        let mut members = StaticMemberDirectory::new();
        for (id, name) in &cli.members {
            members.insert(id, name);
        }
        for id in &cli.legacy {
            members.insert_legacy(id);
        }
        Ok(Self {
            pipeline: Pipeline::new(config.pipeline_config()?),
            members,
            emoji: config.emoji_registry(),
        })
    }

    fn ctx(&self) -> PipelineContext<'_> {
        PipelineContext::new(&self.members, &self.emoji)
    }

    fn run(&self, command: &Command) -> Result<String> {
        Ok(match command {
            Command::Render {
                input,
                preview,
                json,
            } => {
                let mode = if *preview {
                    DisplayMode::Preview
                } else {
                    DisplayMode::Message
                };
                let rendered = self
                    .pipeline
                    .render_for_display(&input.read()?, mode, self.ctx());
                if *json {
                    serde_json::to_string_pretty(&TokenDump::new(rendered.text, rendered.tokens))?
                } else {
                    rendered.text
                }
            }
            Command::Send { input } => self.pipeline.sanitize_for_send(&input.read()?, self.ctx())?,
            Command::Plain { input } => self.pipeline.to_plain_text(&input.read()?),
            Command::Tokens { input } => {
                let outgoing = self.pipeline.prepare_outgoing(&input.read()?, self.ctx())?;
                let display = outgoing.display;
                serde_json::to_string_pretty(&TokenDump::new(display.text, display.tokens))?
            }
            Command::Copy { input } => self.pipeline.prepare_for_copy(&input.read()?, self.ctx()),
            Command::Edit { input } => self.pipeline.prepare_for_edit(&input.read()?, self.ctx()),
        })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    let session = Session::new(&cli, &config)?;
    println!("{}", session.run(&cli.command)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    const MEMBER: &str = "94dqka6etwq4xhsazq84dqfzap3ue9r7poq89aapcarg6a6wsaky";

    fn run_with(args: &[&str], message: &str) -> String {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("message.md");
        std::fs::write(&file, message).unwrap();

        let mut argv = vec!["chatmark"];
        argv.extend_from_slice(args);
        let file_arg = file.to_string_lossy().into_owned();
        argv.push(&file_arg);

        let cli = Cli::try_parse_from(argv).unwrap();
        let session = Session::new(&cli, &Config::default()).unwrap();
        session.run(&cli.command).unwrap()
    }

    #[test]
    fn render_encodes_blank_lines() {
        assert_eq!(run_with(&["render"], "a\n\nb"), "a⟶\nb");
    }

    #[test]
    fn render_preview() {
        assert_eq!(run_with(&["render", "--preview"], "a\n- b"), "a<br/>● b");
    }

    #[test]
    fn send_sanitizes() {
        assert_eq!(run_with(&["send"], "  hi\n>>> there"), "hi<br>> there");
    }

    #[test]
    fn plain_drops_link_targets() {
        assert_eq!(run_with(&["plain"], "[docs](https://x.io)"), "docs");
    }

    #[test]
    fn tokens_are_wire_json() {
        let out = run_with(&["tokens"], "**hi** :+1:");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["text"], "hi 👍\u{fe0f}");
        assert_eq!(value["tokens"][0]["type"], 4);
        assert_eq!(value["tokens"][1]["type"], 7);
        assert_eq!(value["tokens"][1]["content"], "+1");
    }

    #[test]
    fn members_and_legacy_flags_reach_the_pipeline() {
        let message = format!("[@old](mention://user/{MEMBER})");
        let member = format!("{MEMBER}=Nick");
        let out = run_with(&["tokens", "--member", &member], &message);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["text"], "@Nick");
        assert_eq!(value["tokens"][0]["memberId"], MEMBER);

        let out = run_with(&["tokens", "--member", &member, "--legacy", MEMBER], &message);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["text"], "@old");
    }

    #[test]
    fn copy_and_edit_restore_typed_text() {
        let stored = format!("[@Nick](mention://user/{MEMBER}) :+1:<br>:keet_party:");
        assert_eq!(
            run_with(&["copy"], &stored),
            "@Nick 👍\u{fe0f}<br>:keet_party:"
        );
        assert_eq!(run_with(&["edit"], &stored), "@Nick 👍\u{fe0f}\n:keet_party:");
    }

    #[test]
    fn member_flag_needs_an_id() {
        assert!(parse_member("=Nick").is_err());
        assert!(parse_member("nick").is_err());
        assert_eq!(
            parse_member("a=B=C"),
            Ok(("a".to_string(), "B=C".to_string()))
        );
    }

    #[test]
    fn missing_explicit_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn explicit_config_is_used() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "quote_depth = 2\n").unwrap();
        assert_eq!(load_config(Some(&path)).unwrap().quote_depth, 2);
    }
}
