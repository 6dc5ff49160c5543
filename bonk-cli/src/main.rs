mod command;
mod session_log;
mod ui;

use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bonk_core::gemini::{DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL};
use bonk_core::*;
use clap::Parser;
use tokio::io::AsyncBufReadExt;

use command::Command;
use session_log::SessionLogger;
use ui::Painter;

#[derive(Parser)]
#[command(name = "bonk", version, about = "Bonk GPT: vibe coder chat and meme factory")]
struct Args {
    /// Gemini API key (falls back to API_KEY, GEMINI_API_KEY, ... then ~/.bonk/config.json)
    #[arg(long, env = "BONK_API_KEY")]
    api_key: Option<String>,

    /// Chat model (default: gemini-3-pro-preview)
    #[arg(long)]
    model: Option<String>,

    /// Image model (default: gemini-2.5-flash-image)
    #[arg(long)]
    image_model: Option<String>,

    /// File that receives the latest generated HTML
    #[arg(long, default_value = "bonk-workspace.html")]
    workspace: PathBuf,

    /// Store the resolved API key in ~/.bonk/config.json
    #[arg(long)]
    save_key: bool,

    /// Delete all bonk data (~/.bonk/) and exit
    #[arg(long)]
    reset: bool,

    /// Run headlessly: send one prompt, print the reply, exit
    #[arg(short = 'p', long = "print")]
    print_prompt: Option<String>,

    /// Generate one image from this prompt and exit
    #[arg(long)]
    meme: Option<String>,

    /// Meme style: cartoon, 3d, pixel, oil, anime or free text
    #[arg(long)]
    style: Option<String>,

    /// Reference image (png, jpg, gif, webp) sent along with the meme prompt
    #[arg(long)]
    reference: Option<PathBuf>,

    /// Output path for the generated image (default: bonk-meme.<ext>)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // `--help`, `--version` and usage errors exit here, before bonk.log is truncated.
    let args = Args::parse();
    let data_dir = BonkConfig::data_dir();

    // File-based tracing (logs go to ~/.bonk/bonk.log)
    {
        let log_file = open_log(&data_dir)?;

        use tracing_subscriber::EnvFilter;
        let filter = EnvFilter::try_from_env("BONK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(log_file)
            .with_ansi(false)
            .init();
    }

    let painter = Painter::new(!args.no_color && std::io::stdout().is_terminal());

    if args.reset {
        return reset_data(&data_dir, &painter);
    }

    let mut config = BonkConfig::load().unwrap_or_default();
    let resolved = KeyChain::standard(args.api_key.clone(), Some(&config)).resolve();

    if args.save_key {
        match &resolved {
            Some(key) => {
                config.api_key = Some(key.key.clone());
                config.save()?;
                eprintln!(
                    "{}",
                    painter.notice(&format!(
                        "API key from {} saved to {}",
                        key.source,
                        BonkConfig::config_path().display()
                    ))
                );
            }
            None => eprintln!("{}", painter.error("No API key found to save.")),
        }
    }

    let model = args
        .model
        .clone()
        .or_else(|| config.model.clone())
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());
    let image_model = args
        .image_model
        .clone()
        .or_else(|| config.image_model.clone())
        .unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string());
    let style = MemeStyle::from(
        args.style
            .clone()
            .or_else(|| config.style.clone())
            .unwrap_or_default()
            .as_str(),
    );

    let client = resolved.as_ref().map(|key| {
        tracing::info!("Using API key from {}", key.source);
        GeminiClient::new(key.key.clone())
            .with_model(&model)
            .with_image_model(&image_model)
    });
    if client.is_none() {
        tracing::warn!("No API key found, running in demo mode");
    }

    let backend: Arc<dyn ChatBackend> = match &client {
        Some(c) => Arc::new(c.clone()),
        None => Arc::new(DemoBackend::new()),
    };
    let memes = MemeFactory::new(client);
    let mut logger = SessionLogger::new(&backend.label())?;

    if let Some(prompt) = args.meme.as_deref() {
        let reference = match &args.reference {
            Some(path) => Some(DataUrl::from_file(path)?),
            None => None,
        };
        let ok = run_meme(
            &memes,
            prompt,
            &style,
            reference,
            args.out.as_deref(),
            &painter,
            &mut logger,
        )
        .await?;
        if !ok {
            std::process::exit(1);
        }
        return Ok(());
    }

    let mut session = ChatSession::new(backend);

    if let Some(prompt) = args.print_prompt.as_deref() {
        return run_headless(&mut session, prompt, &args.workspace, &mut logger).await;
    }

    run_interactive(
        &mut session,
        &memes,
        style,
        &args.workspace,
        &painter,
        &mut logger,
    )
    .await
}

/// Fresh `bonk.log` for this run.
fn open_log(data_dir: &Path) -> std::io::Result<std::fs::File> {
    std::fs::create_dir_all(data_dir)?;
    std::fs::File::create(data_dir.join("bonk.log"))
}

fn reset_data(data_dir: &Path, painter: &Painter) -> anyhow::Result<()> {
    eprintln!();
    eprintln!("  {}", painter.bold(ui::BONK_ORANGE, "/ reset"));
    eprintln!();
    eprintln!(
        "  {}",
        painter.error("This will permanently delete all bonk data:")
    );
    eprintln!(
        "    {} {}",
        painter.notice("config, key, sessions, logs"),
        data_dir.display()
    );
    eprintln!();
    eprint!("  {} ", painter.paint(ui::BONK_ORANGE, "Are you sure? [y/N]"));
    std::io::stderr().flush()?;

    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    if answer.trim().eq_ignore_ascii_case("y") {
        if data_dir.exists() {
            std::fs::remove_dir_all(data_dir)?;
        }
        eprintln!("  {} All data removed.", painter.paint(ui::LICHEN, "Done."));
    } else {
        eprintln!("  {}", painter.notice("Aborted."));
    }
    eprintln!();
    Ok(())
}

/// Send one prompt, print the reply to stdout, exit non-zero on failure.
async fn run_headless(
    session: &mut ChatSession,
    prompt: &str,
    workspace_path: &Path,
    logger: &mut SessionLogger,
) -> anyhow::Result<()> {
    logger.log_user_input(prompt);
    let Some(turn) = session.submit(prompt).await else {
        anyhow::bail!("empty prompt");
    };
    logger.log_reply(&turn);

    println!("{}", turn.reply.narrative);
    for upgrade in &turn.reply.upgrades {
        println!("- {upgrade}");
    }
    if let Some(code) = &turn.reply.code {
        write_workspace(workspace_path, code)?;
        eprintln!("workspace → {}", workspace_path.display());
    }

    if turn.failed {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_interactive(
    session: &mut ChatSession,
    memes: &MemeFactory,
    mut style: MemeStyle,
    workspace_path: &Path,
    painter: &Painter,
    logger: &mut SessionLogger,
) -> anyhow::Result<()> {
    let status = if memes.is_demo() {
        "demo mode · add an API key to unlock full Vibe Coding".to_string()
    } else {
        format!("{} · /help for commands", session.backend_label())
    };
    println!("{}", painter.notice(&status));
    println!(
        "{}",
        painter.notice(&format!("session log → {}", logger.path().display()))
    );
    println!();
    for entry in session.entries() {
        println!("{}", painter.entry(entry));
    }

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        println!();
        print!("{}", painter.prompt());
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match command::parse(&line) {
            Some(Command::Exit) => break,
            Some(Command::Help) => println!("{}", command::help_text()),
            Some(Command::Clear) => {
                session.reset();
                logger.log_reset();
                for entry in session.entries() {
                    println!("{}", painter.entry(entry));
                }
            }
            Some(Command::Code) => match session.workspace() {
                Some(ws) => println!("{}", ws.code),
                None => println!("{}", painter.notice("Workspace is empty.")),
            },
            Some(Command::Style(None)) => println!(
                "{}",
                painter.notice(&format!(
                    "style: {style} (built-in: {})",
                    MemeStyle::NAMES.join(", ")
                ))
            ),
            Some(Command::Style(Some(name))) => {
                style = MemeStyle::from(name.as_str());
                println!("{}", painter.notice(&format!("style → {style}")));
            }
            Some(Command::Meme(prompt)) => {
                if let Err(e) = run_meme(memes, &prompt, &style, None, None, painter, logger).await
                {
                    println!("{}", painter.error(&format!("meme failed: {e}")));
                }
            }
            Some(Command::Unknown(msg)) => println!("{}", painter.error(&msg)),
            None => {
                if line.trim().is_empty() {
                    continue;
                }
                logger.log_user_input(&line);
                println!("{}", painter.notice("vibing..."));
                let Some(turn) = session.submit(&line).await else {
                    continue;
                };
                logger.log_reply(&turn);

                let written = match (&turn.reply.code, session.workspace()) {
                    (Some(code), Some(ws)) => match write_workspace(workspace_path, code) {
                        Ok(()) => Some((workspace_path, ws.revision)),
                        Err(e) => {
                            println!("{}", painter.error(&format!("workspace write failed: {e}")));
                            None
                        }
                    },
                    _ => None,
                };
                println!("{}", painter.turn(&turn, written));
            }
        }
    }
    Ok(())
}

/// Generate and save one image. Returns false when nothing came back.
async fn run_meme(
    memes: &MemeFactory,
    prompt: &str,
    style: &MemeStyle,
    reference: Option<DataUrl>,
    out: Option<&Path>,
    painter: &Painter,
    logger: &mut SessionLogger,
) -> anyhow::Result<bool> {
    eprintln!("{}", painter.notice(&format!("generating ({style})...")));
    let image = memes.generate(prompt, style, reference).await;

    let saved = match image {
        Some(MemeImage::Data(url)) => {
            let path = save_image(&url, out)?;
            println!("{}", painter.paint(ui::LICHEN, &format!("saved → {}", path.display())));
            Some(path)
        }
        Some(MemeImage::Url(link)) => {
            println!("{}", painter.notice("demo mode, no image generated:"));
            println!("{link}");
            None
        }
        None => {
            println!(
                "{}",
                painter.error("Image generation failed. Try a different prompt or check your API key.")
            );
            logger.log_meme(prompt, &style.to_string(), None);
            return Ok(false);
        }
    };
    let saved_str = saved.as_ref().map(|p| p.to_string_lossy().to_string());
    logger.log_meme(prompt, &style.to_string(), saved_str.as_deref());
    Ok(true)
}

fn write_workspace(path: &Path, code: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, code)
}

/// Decode a data URL to disk; defaults to `bonk-meme.<ext>` in the cwd.
fn save_image(url: &DataUrl, out: Option<&Path>) -> anyhow::Result<PathBuf> {
    let path = out
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(format!("bonk-meme.{}", url.extension())));
    let bytes = url.decode()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, bytes)?;
    Ok(path)
}
