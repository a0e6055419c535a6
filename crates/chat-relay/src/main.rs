//! A console front end that talks to the relay as a single conversation.

#[macro_use]
extern crate tracing;

use std::io::Write as _;
use std::pin::pin;
use std::process::ExitCode;
use std::time::Duration;

use chat_relay::Config;
use chat_relay::core::{ConversationId, InboundEvent, Signal};
use chat_relay::render::plain_text;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::select;
use tokio::sync::mpsc;

const BAR_CHAR: &str = "▎";
const TYPING_TEXT: &str = "💬 Typing...";

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };
    info!("starting with {config:?}");

    let (signal_tx, mut signal_rx) = mpsc::unbounded_channel();
    let relay = chat_relay::relay_builder(&config)
        .on_signal(move |signal| {
            signal_tx.send(signal).ok();
        })
        .build();

    let conversation_id = ConversationId(config.console_chat_id);
    let progress_style = ProgressStyle::with_template("{spinner} {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");

    let mut input = BufReader::new(io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line(&mut input).await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event =
            InboundEvent::from_text(conversation_id, config.console_chat_id, line);
        let mut reply_fut = pin!(relay.handle_event(event));
        let mut spinner: Option<ProgressBar> = None;

        let reply = loop {
            select! {
                reply = &mut reply_fut => break reply,
                Some(signal) = signal_rx.recv() => {
                    show_signal(signal, &mut spinner, &progress_style);
                }
            }
        };

        // Finish the spinner before printing anything else.
        if let Some(spinner) = spinner.take() {
            spinner.finish_and_clear();
        }
        while signal_rx.try_recv().is_ok() {}

        let Some(reply) = reply else {
            println!("{}(no reply)", BAR_CHAR.bright_black());
            continue;
        };
        if reply.quote {
            println!("{}↪ {}", BAR_CHAR.bright_black(), line.dimmed());
        }
        println!(
            "{}🤖 {}",
            BAR_CHAR.bright_cyan(),
            plain_text(&reply).bright_white()
        );
    }

    relay.shutdown();
    ExitCode::SUCCESS
}

fn show_signal(
    signal: Signal,
    spinner: &mut Option<ProgressBar>,
    style: &ProgressStyle,
) {
    let spinner = spinner.get_or_insert_with(|| {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style.clone());
        spinner.set_message(TYPING_TEXT);
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    });
    match signal {
        Signal::Typing(_) => {}
        Signal::ShowPlaceholder { text, .. } => spinner.set_message(text),
        Signal::DeletePlaceholder { .. } => spinner.set_message(TYPING_TEXT),
    }
}

async fn read_line<R>(input: &mut Lines<R>) -> Option<String>
where
    R: AsyncBufRead + Unpin,
{
    match input.next_line().await {
        Ok(line) => line,
        Err(err) => {
            error!("error reading input: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_line_keeps_buffered_input() {
        let mut input = BufReader::new(&b"first\nsecond\n\nlast"[..]).lines();
        assert_eq!(read_line(&mut input).await.as_deref(), Some("first"));
        assert_eq!(read_line(&mut input).await.as_deref(), Some("second"));
        assert_eq!(read_line(&mut input).await.as_deref(), Some(""));
        assert_eq!(read_line(&mut input).await.as_deref(), Some("last"));
        assert_eq!(read_line(&mut input).await, None);
    }
}
