use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use tftdle::assets::{AcceptAll, DirectoryResolver};
use tftdle::config::Config;
use tftdle::engine::candidate::Mode;
use tftdle::engine::lifecycle::{LifecycleSnapshot, LifecycleState, RoundLifecycle, SessionPhase};
use tftdle::engine::selector::{AssetResolver, RoundSelector};
use tftdle::engine::server::GameServer;
use tftdle::error::GameError;
use tftdle::{loader, metrics};

const HELP: &str = "Type a guess and press enter. Commands: :skip :restart :scores :quit";

fn title(mode: Mode) -> &'static str {
    match mode {
        Mode::Trait => "Guess The Trait!",
        Mode::Tactician => "Guess The Tactician!",
        Mode::Augment => "Guess The Augment!",
    }
}

fn print_high_scores(scores: &[u32]) {
    if scores.is_empty() {
        println!("High Scores: none yet");
        return;
    }
    println!("High Scores:");
    for (i, score) in scores.iter().enumerate() {
        println!("  {}. {score}", i + 1);
    }
}

/// Print whatever changed between two published states.
fn render(prev: &LifecycleSnapshot, next: &LifecycleSnapshot) {
    if next.state == LifecycleState::LoadFailed && prev.state != LifecycleState::LoadFailed {
        println!("Cannot load any {} image. Restart the program to try again.", next.mode);
        return;
    }

    let prev_round = prev.round.as_ref().map(|r| r.number);
    if let Some(round) = next.round.as_ref() {
        if Some(round.number) != prev_round && next.state == LifecycleState::Ready {
            println!();
            println!("[{}] {}", round.number, round.candidate.image_ref);
        }
    }

    let remaining = next.session.time_remaining_seconds;
    if next.session.phase == SessionPhase::Running
        && remaining != prev.session.time_remaining_seconds
        && (remaining % 10 == 0 || remaining <= 5)
    {
        println!("Timer: {remaining}");
    }

    if next.state == LifecycleState::Finished && prev.state != LifecycleState::Finished {
        println!();
        println!("Game Over! Your score: {}", next.session.running_score);
        print_high_scores(&next.high_scores);
        println!("Type :restart to play again.");
    }
}

async fn handle_line(server: &GameServer, line: &str) -> Result<(), GameError> {
    match line {
        ":skip" => server.skip().await,
        ":restart" => server.restart().await,
        ":scores" => {
            let snap = server.snapshot();
            println!("Score: {}", snap.session.running_score);
            print_high_scores(&snap.high_scores);
            Ok(())
        }
        guess => {
            let result = server.guess(guess).await?;
            if result.correct {
                let score = server.snapshot().session.running_score;
                println!("Correct! (+{}) Score: {score}", result.points_awarded);
            } else {
                println!("Incorrect, try again!");
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    metrics::register_metrics();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            return ExitCode::from(2);
        }
    };

    let source = match loader::load_source(config.mode, &config.data_path).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(
                "Failed to load candidates from {}: {e}",
                config.data_path.display()
            );
            return ExitCode::FAILURE;
        }
    };

    let resolver: Arc<dyn AssetResolver> = match &config.assets_dir {
        Some(dir) => Arc::new(DirectoryResolver::new(dir)),
        None => Arc::new(AcceptAll),
    };
    let selector = match config.seed {
        Some(seed) => RoundSelector::seeded(config.mode, resolver, seed),
        None => RoundSelector::new(config.mode, resolver),
    };
    let server = GameServer::spawn(
        RoundLifecycle::new(selector, config.session_seconds),
        source,
    );

    println!("TFTdle - {}", title(config.mode));
    println!("{HELP}");

    let mut updates = server.subscribe();
    let renderer = tokio::spawn(async move {
        let mut prev = updates.borrow_and_update().clone();
        while updates.changed().await.is_ok() {
            let next = updates.borrow_and_update().clone();
            render(&prev, &next);
            prev = next;
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!("Failed to read input: {e}");
                break;
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == ":quit" {
            break;
        }

        match handle_line(&server, line).await {
            Ok(()) => {}
            Err(GameError::InvalidTransition { state, .. }) => match state {
                LifecycleState::Finished => println!("Time is up. Type :restart to play again."),
                LifecycleState::Ready => println!("Hold on, next round incoming."),
                LifecycleState::Loading | LifecycleState::LoadFailed => {
                    println!("No round available.")
                }
            },
            Err(e) => {
                println!("{e}");
                if e == GameError::ServerClosed {
                    break;
                }
            }
        }
    }

    server.shutdown().await;
    let _ = renderer.await;

    if config.print_metrics {
        print!("{}", metrics::gather_metrics());
    }
    ExitCode::SUCCESS
}
