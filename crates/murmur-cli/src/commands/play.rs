use std::path::Path;
use std::sync::Arc;

use colored::Colorize;
use murmur_engine::{
    EngineConfig, EngineEvent, OfferedChoice, Phase, StoryEngine, TimeMode, time_provider,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{error, warn};

use super::SaveTarget;
use crate::presenter::Presenter;

/// Upper bound on choices taken by `--auto`, for stories that loop.
const MAX_AUTO_CHOICES: usize = 1000;

pub struct PlayOptions {
    pub compressed: bool,
    pub real_time: bool,
    pub speed: f64,
    pub pause_ms: u64,
    pub auto: bool,
}

/// One line typed by the player.
#[derive(Debug, PartialEq)]
enum Input {
    Empty,
    Quit,
    Reset,
    Help,
    Choice(String),
    NoSuchChoice(usize),
    Reply(String),
}

fn parse_input(line: &str, offered: &[OfferedChoice]) -> Input {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "/quit" | "/q" => Input::Quit,
        "/reset" => Input::Reset,
        "/help" | "/?" => Input::Help,
        _ => match line.parse::<usize>() {
            Ok(n) => match n.checked_sub(1).and_then(|idx| offered.get(idx)) {
                Some(choice) => Input::Choice(choice.id.clone()),
                None => Input::NoSuchChoice(n),
            },
            Err(_) => Input::Reply(line.to_string()),
        },
    }
}

/// Banner description of how waits are paced.
fn pace_label(mode: TimeMode, speed: f64, pause_ms: u64) -> String {
    match mode {
        TimeMode::Real if speed > 0.0 && (speed - 1.0).abs() > f64::EPSILON => format!("real time x{speed}"),
        TimeMode::Real => "real time".to_string(),
        TimeMode::Compressed => format!("compressed, {pause_ms} ms pauses"),
    }
}

pub fn run(target: &SaveTarget, story: &Path, opts: &PlayOptions) -> Result<(), String> {
    let graph = super::load_story(story)?;
    let settings = target.settings()?;

    let real = !opts.compressed && (opts.real_time || settings.use_real_time);
    let mode = if real {
        TimeMode::Real
    } else {
        TimeMode::Compressed
    };
    if settings.use_ai {
        warn!("text generation is enabled but no generation backend is available; free text will not be interpreted");
    }

    let presenter = Presenter::new(graph.protagonist(), settings.theme);
    let time = time_provider(mode, opts.speed, opts.pause_ms);
    let engine = Arc::new(StoryEngine::new(
        Arc::new(graph),
        target.manager(),
        time,
        EngineConfig::default(),
    ));

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("failed to start runtime: {e}"))?;

    if opts.auto {
        runtime.block_on(auto_play(engine, presenter))
    } else {
        let pace = pace_label(mode, opts.speed, opts.pause_ms);
        println!("  {} {}", "Playing".bold(), engine.graph().title());
        println!("  Pace: {pace} | Slot: {}", target.slot());
        println!("  Type /help for commands.\n");
        runtime.block_on(interactive(engine, presenter.interactive()))
    }
}

fn drain(events: &mut UnboundedReceiver<EngineEvent>, presenter: &mut Presenter) {
    while let Ok(event) = events.try_recv() {
        presenter.render(&event);
    }
}

/// Play unattended, always taking the first offered choice.
async fn auto_play(engine: Arc<StoryEngine>, mut presenter: Presenter) -> Result<(), String> {
    let mut events = engine.subscribe();
    engine.start().await.map_err(|e| e.to_string())?;

    for _ in 0..MAX_AUTO_CHOICES {
        drain(&mut events, &mut presenter);
        match engine.phase() {
            Phase::Ended => return Ok(()),
            Phase::AwaitingChoice => {
                let Some(choice) = engine.offered_choices().into_iter().next() else {
                    return Err("choices were expected but none are on offer".into());
                };
                engine
                    .make_choice(&choice.id)
                    .await
                    .map_err(|e| e.to_string())?;
            }
            _ => {
                println!("  {}", "The conversation stalled: no choices and no ending.".yellow());
                return Ok(());
            }
        }
    }
    Err(format!("story did not end within {MAX_AUTO_CHOICES} choices"))
}

/// Spawn an engine operation so playback keeps running while input is read.
fn spawn_op<F>(op: F)
where
    F: Future<Output = murmur_engine::EngineResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = op.await {
            error!(error = %e, "playback stopped");
            eprintln!("{}", format!("error: {e}").red());
        }
    });
}

async fn interactive(engine: Arc<StoryEngine>, mut presenter: Presenter) -> Result<(), String> {
    let mut events = engine.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let starter = Arc::clone(&engine);
    spawn_op(async move { starter.start().await });

    loop {
        tokio::select! {
            Some(event) = events.recv() => presenter.render(&event),
            line = lines.next_line() => {
                let Some(line) = line.map_err(|e| e.to_string())? else {
                    break;
                };
                match parse_input(&line, presenter.choices()) {
                    Input::Empty => {}
                    Input::Quit => break,
                    Input::Help => {
                        println!("  <number>   pick a choice");
                        println!("  <text>     reply in your own words");
                        println!("  /reset     start the story over");
                        println!("  /quit      leave (progress is saved)");
                    }
                    Input::Reset => {
                        let e = Arc::clone(&engine);
                        spawn_op(async move { e.reset_game().await });
                    }
                    Input::Choice(id) => {
                        let e = Arc::clone(&engine);
                        spawn_op(async move { e.make_choice(&id).await });
                    }
                    Input::NoSuchChoice(n) => {
                        println!("  {}", format!("There is no choice {n}.").yellow());
                    }
                    Input::Reply(text) => {
                        if engine.phase() != Phase::AwaitingChoice {
                            println!("  {}", "Wait for a moment to reply.".dimmed());
                            continue;
                        }
                        let e = Arc::clone(&engine);
                        spawn_op(async move { e.submit_custom_response(&text).await });
                    }
                }
            }
        }
    }

    drain(&mut events, &mut presenter);
    Ok(())
}
