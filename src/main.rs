//! Career Guide - interactive terminal consultation
//!
//! Walks the local user through the interview on stdin/stdout. Logs go to
//! stderr so they never interleave with the prompt.

use career_guide::auth::{consultation_roles, AuthSession};
use career_guide::config::{Credentials, GuideConfig};
use career_guide::generator::CounselorGenerator;
use career_guide::llm::{GeminiService, LoggingService};
use career_guide::runtime::{ConsultationHandle, HandleError};
use career_guide::state_machine::{SessionState, SessionView, MAX_QUESTIONS};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = GuideConfig::from_env();
    init_tracing(config.as_ref().is_ok_and(|c| c.log_json));
    let config = config?;

    let auth = AuthSession::new(config.user_id.clone(), config.role);
    auth.require(&consultation_roles())?;

    let provider = match &config.credentials {
        Credentials::Gateway(gateway) => GeminiService::via_gateway(gateway, &config.model)?,
        Credentials::ApiKey(key) => GeminiService::direct(key.clone(), &config.model)?,
    };
    tracing::info!(
        model = %config.model,
        gateway = config.uses_gateway(),
        user_id = %auth.user_id,
        role = %auth.role,
        "Counselor configured"
    );

    let mut generator = CounselorGenerator::new(LoggingService::new(Arc::new(provider)));
    if let Some(limit) = config.timeout {
        generator = generator.with_timeout(limit);
    }

    let handle = ConsultationHandle::spawn(generator);
    println!("Welcome to Career Guide. Answer {MAX_QUESTIONS} questions to get a personalized roadmap.");
    println!("Commands: /restart starts over, /quit exits.");

    run_cli(&handle).await?;
    println!("Goodbye!");
    Ok(())
}

fn init_tracing(json: bool) {
    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "career_guide=info".into());

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
    });
    let text_layer =
        (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

fn render(view: &SessionView) {
    match &view.state {
        SessionState::Welcome => {
            println!("\nPress Enter to start your career consultation.");
        }
        SessionState::Questioning {
            current_question,
            turn_index,
            error,
        } => {
            if let Some(notice) = error {
                println!("\n[!] {}", notice.message);
            }
            println!("\nQuestion {turn_index}/{MAX_QUESTIONS}: {current_question}");
        }
        SessionState::Thinking { .. } => println!("Thinking..."),
        SessionState::RoadmapReady { roadmap } => {
            println!("\n{roadmap}");
            println!("Type /restart to start a new consultation.");
        }
    }
}

async fn run_cli(handle: &ConsultationHandle) -> Result<(), Box<dyn std::error::Error>> {
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let view = handle.settled().await?;
        render(&view);

        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = input.next_line().await? else {
            break;
        };
        let line = line.trim();

        let outcome = match (line, &view.state) {
            ("/quit", _) => break,
            ("/restart", _) => handle.restart().await,
            (_, SessionState::Welcome) => handle.start().await,
            (_, SessionState::RoadmapReady { .. }) => continue,
            ("", _) => {
                println!("Please type an answer.");
                continue;
            }
            (answer, _) => {
                println!("Thinking...");
                handle.submit_answer(answer).await
            }
        };

        match outcome {
            Ok(()) => {}
            Err(HandleError::Rejected(e)) => println!("{e}"),
            Err(e @ HandleError::Closed) => return Err(e.into()),
        }
    }

    Ok(())
}
