// src/main.rs

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use dotenvy::dotenv;
use exam_client::{
    api::{ExamApi, HttpExamApi},
    config::Config,
    error::AppError,
    lockdown::{GuardVerdict, LockdownHost, LockdownSession, SecurityGuard},
    models::question::AnswerValue,
    session::{AttemptStep, ExamAttempt, SubmitOutcome},
    storage::{AnswerCache, FileStore},
    ui::{HostSignal, KeyPress, Notice, Visibility},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenv().ok();

    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e.user_message());
            std::process::exit(1);
        }
    };

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "exam-client.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Err(e) = run(config).await {
        tracing::error!("Exam client stopped: {}", e);
        println!("Error: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(config: Config) -> Result<(), AppError> {
    let store = FileStore::open(&config.cache_dir)?;
    let cache = AnswerCache::new(Arc::new(store));

    // Bound local storage before anything else touches it.
    match cache.sweep() {
        Ok(0) => {}
        Ok(removed) => tracing::info!("Removed {} stale cached answer records", removed),
        Err(e) => tracing::warn!("Cache sweep failed: {}", e),
    }

    let api: Arc<dyn ExamApi> = Arc::new(HttpExamApi::from_config(&config)?);

    tracing::info!("Loading exam from {}", config.api_url);
    let mut attempt = ExamAttempt::begin(
        api.clone(),
        cache,
        Duration::from_millis(config.save_debounce_ms),
    )
    .await?;

    let host = Arc::new(ConsoleHost::default());
    let (mut lockdown, reaction) = LockdownSession::engage(
        &attempt.session().id,
        config.max_violations,
        api.clone(),
        host.clone(),
    );
    show_notices(&reaction.notices);
    let mut guard = SecurityGuard::new(api);

    let time_up = attempt.time_up();
    tokio::pin!(time_up);

    show_question(&attempt);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let mut clock_running = attempt.timer().is_some();

    loop {
        let line = tokio::select! {
            _ = &mut time_up, if clock_running => {
                clock_running = false;
                println!("Time is up.");
                if finish_and_report(&mut attempt).await {
                    break;
                }
                continue;
            }
            line = lines.next_line() => line?,
        };

        let Some(line) = line else { break };
        let Some(command) = Command::parse(&line) else {
            println!("Unknown command: {}", line.trim());
            continue;
        };

        match command {
            Command::Quit => break,
            Command::Answer(question_id, value) => {
                attempt.answer(&question_id, value);
                show_question(&attempt);
            }
            Command::Next => {
                let step = attempt.next().await;
                if handle_step(&attempt, step) {
                    break;
                }
            }
            Command::Previous => {
                let step = attempt.previous().await;
                if handle_step(&attempt, step) {
                    break;
                }
            }
            Command::Submit => {
                if finish_and_report(&mut attempt).await {
                    break;
                }
            }
            Command::Signal(signal) => {
                host.apply(&signal);
                if guard.on_signal(&signal) == GuardVerdict::Block {
                    println!("Blocked.");
                    continue;
                }
                if let HostSignal::KeyDown(key) = &signal {
                    if let Some(step) = attempt.handle_key(key).await {
                        if handle_step(&attempt, step) {
                            break;
                        }
                        continue;
                    }
                }
                let reaction = lockdown.handle(&signal).await;
                show_notices(&reaction.notices);
                if let Some(route) = reaction.route {
                    println!("-> {}", route.path());
                    break;
                }
                if lockdown.needs_fullscreen_prompt() {
                    println!("Please enter full screen mode to continue the exam.");
                }
            }
        }
    }

    show_notices(&lockdown.settle_reports().await);
    lockdown.release();
    guard.flush().await;
    Ok(())
}

/// Returns true when the runner should stop.
fn handle_step(attempt: &ExamAttempt, step: AttemptStep) -> bool {
    match step {
        AttemptStep::Moved(_) | AttemptStep::Stayed => {
            show_question(attempt);
            false
        }
        AttemptStep::Submitted(outcome) => report_outcome(outcome),
    }
}

async fn finish_and_report(attempt: &mut ExamAttempt) -> bool {
    let outcome = attempt.finish().await;
    report_outcome(outcome)
}

fn report_outcome(outcome: SubmitOutcome) -> bool {
    match outcome {
        SubmitOutcome::Submitted(route) => {
            println!("Exam submitted. -> {}", route.path());
            true
        }
        SubmitOutcome::AlreadySubmitted => {
            println!("Exam already submitted.");
            false
        }
        SubmitOutcome::Failed(message) => {
            println!("Submission failed: {} (type `submit` to retry)", message);
            false
        }
    }
}

fn show_question(attempt: &ExamAttempt) {
    let total = attempt.questions().len();
    let Some(question) = attempt.current_question() else {
        println!("This exam has no questions. Type `submit` to finish.");
        return;
    };

    if let Some(timer) = attempt.timer() {
        println!("Time left: {}", timer.formatted());
    }
    println!(
        "[{}/{}] ({}) {}",
        attempt.current_index() + 1,
        total,
        question.id,
        question.text
    );
    for option in &question.options {
        println!("  - {}", option);
    }
    match attempt.answers().get(&question.id) {
        Some(AnswerValue::Single(answer)) => println!("  answer: {}", answer),
        Some(AnswerValue::Multiple(answers)) => println!("  answer: {}", answers.join(", ")),
        None => {}
    }
}

fn show_notices(notices: &[Notice]) {
    for notice in notices {
        println!("[{:?}] {}", notice.level, notice.message);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Answer(String, AnswerValue),
    Next,
    Previous,
    Submit,
    Signal(HostSignal),
    Quit,
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.trim().splitn(3, ' ');
        let command = match parts.next()? {
            "answer" => {
                let question_id = parts.next()?.to_string();
                let raw = parts.next().unwrap_or("").trim();
                let value = if raw.contains(',') {
                    AnswerValue::Multiple(raw.split(',').map(|s| s.trim().to_string()).collect())
                } else {
                    AnswerValue::Single(raw.to_string())
                };
                Command::Answer(question_id, value)
            }
            "next" => Command::Next,
            "prev" => Command::Previous,
            "submit" => Command::Submit,
            "blur" => Command::Signal(HostSignal::VisibilityChanged(Visibility::Hidden)),
            "focus" => Command::Signal(HostSignal::VisibilityChanged(Visibility::Visible)),
            "fullscreen" => Command::Signal(HostSignal::FullscreenChanged {
                active: parts.next()? == "on",
            }),
            "rightclick" => Command::Signal(HostSignal::ContextMenu { x: 0, y: 0 }),
            "key" => Command::Signal(HostSignal::KeyDown(parse_key(parts.next()?))),
            "quit" => Command::Quit,
            _ => return None,
        };
        Some(command)
    }
}

/// `ctrl+c`, `meta+v`, `F12`, `ArrowRight`, ...
fn parse_key(combo: &str) -> KeyPress {
    let mut key = KeyPress::default();
    for part in combo.split('+') {
        match part.to_ascii_lowercase().as_str() {
            "ctrl" => key.ctrl = true,
            "meta" | "cmd" => key.meta = true,
            _ => key.key = part.to_string(),
        }
    }
    key
}

/// Full-screen state for a terminal, driven by the `fullscreen` command.
#[derive(Debug, Default)]
struct ConsoleHost {
    fullscreen: AtomicBool,
}

impl ConsoleHost {
    fn apply(&self, signal: &HostSignal) {
        if let HostSignal::FullscreenChanged { active } = signal {
            self.fullscreen.store(*active, Ordering::SeqCst);
        }
    }
}

impl LockdownHost for ConsoleHost {
    fn request_fullscreen(&self) -> Result<(), AppError> {
        self.fullscreen.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn exit_fullscreen(&self) {
        self.fullscreen.store(false, Ordering::SeqCst);
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen.load(Ordering::SeqCst)
    }

    fn attach_listeners(&self) {
        tracing::debug!("Console signals attached");
    }

    fn detach_listeners(&self) {
        tracing::debug!("Console signals detached");
    }
}
