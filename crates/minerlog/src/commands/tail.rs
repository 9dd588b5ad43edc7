//! `minerlog tail`: the interactive log console.
//!
//! Drives one [`LogStream`] from a single task. Transport events, the
//! reconnect timer, stdin commands and Ctrl-C are multiplexed with
//! `tokio::select!`, so every state change goes through `&mut LogStream`.

use std::path::PathBuf;

use tokio::io::{AsyncBufReadExt, BufReader};

use minerlog_api::WebSocketTransport;
use minerlog_core::{ConnectionStatus, LineFilter, LogStream, StreamEvent, count_visible};

use crate::cli::{GlobalOpts, TailArgs};
use crate::commands::console::{self, ConsoleCommand, HELP};
use crate::config::resolve;
use crate::error::CliError;
use crate::output::{Console, should_color};

pub async fn handle(args: TailArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = minerlog_config::load_config()?;
    let resolved = resolve(global, &cfg)?;
    let max_attempts = resolved.stream.reconnect.max_attempts;

    let mut session = Session {
        filter: LineFilter::new(args.filter.as_deref().unwrap_or_default()),
        export_dir: args.export_dir.unwrap_or(resolved.export_dir),
        console: Console::new(should_color(global.color)),
        shown: None,
        max_attempts,
    };

    let mut stream = LogStream::new(WebSocketTransport::new(), resolved.stream);
    session
        .console
        .notice(&format!("streaming {} ({HELP})", stream.endpoint()));
    if args.paused {
        stream.pause();
    }
    stream.start();
    session.note_status(&stream.status());

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            events = stream.next_events() => {
                for event in events {
                    session.render(event);
                }
            }
            line = input.next_line(), if stdin_open => match line? {
                Some(line) => match console::parse(&line) {
                    Ok(Some(command)) => {
                        if session.apply(command, &mut stream) == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(unknown) => session.console.warn(&unknown.to_string()),
                },
                None => {
                    // Keep streaming like `tail -f`; Ctrl-C still ends it.
                    tracing::debug!("stdin closed");
                    stdin_open = false;
                }
            },
            _ = &mut ctrl_c => break,
        }
    }

    stream.stop();
    session.note_status(&stream.status());

    if args.export_on_exit {
        let path = stream.export().save_to(&session.export_dir)?;
        session.console.notice(&format!(
            "exported {} lines to {}",
            stream.buffer().len(),
            path.display()
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Session {
    filter: LineFilter,
    export_dir: PathBuf,
    console: Console,
    /// Last status printed, to avoid repeating it.
    shown: Option<ConnectionStatus>,
    max_attempts: u32,
}

impl Session {
    fn render(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::StatusChanged(status) => self.note_status(&status),
            StreamEvent::LineAppended(line) => {
                if self.filter.matches(&line) {
                    println!("{line}");
                }
            }
            StreamEvent::RetryScheduled { attempt, delay } => self.console.warn(&format!(
                "reconnecting in {}s (attempt {attempt}/{})",
                delay.as_secs_f32(),
                self.max_attempts
            )),
            StreamEvent::RetriesExhausted { attempts } => self.console.error(&format!(
                "gave up after {attempts} reconnect attempts; type `start` to try again"
            )),
        }
    }

    fn note_status(&mut self, status: &ConnectionStatus) {
        if self.shown.as_ref() != Some(status) {
            self.console.status(status);
            self.shown = Some(status.clone());
        }
    }

    fn apply(&mut self, command: ConsoleCommand, stream: &mut LogStream<WebSocketTransport>) -> Flow {
        match command {
            ConsoleCommand::Start => stream.start(),
            ConsoleCommand::Stop => stream.stop(),
            ConsoleCommand::Restart => stream.restart(),
            ConsoleCommand::Pause => {
                stream.pause();
                self.console.notice("paused; new lines are dropped until `resume`");
            }
            ConsoleCommand::Resume => {
                stream.resume();
                self.console.notice("resumed");
            }
            ConsoleCommand::Filter(text) => {
                self.filter = LineFilter::new(&text);
                if self.filter.is_empty() {
                    self.console.notice("filter cleared");
                } else {
                    self.console.notice(&format!(
                        "filter '{}': {} of {} lines match",
                        self.filter.as_str(),
                        count_visible(stream.buffer(), &self.filter),
                        stream.buffer().len()
                    ));
                }
            }
            ConsoleCommand::Show => {
                for line in stream.visible(&self.filter) {
                    println!("{line}");
                }
            }
            ConsoleCommand::Export => {
                let export = stream.export();
                match export.save_to(&self.export_dir) {
                    Ok(path) => self.console.notice(&format!(
                        "exported {} lines to {}",
                        stream.buffer().len(),
                        path.display()
                    )),
                    Err(err) => self.console.error(&err.to_string()),
                }
            }
            ConsoleCommand::Status => self.print_status(stream),
            ConsoleCommand::Help => self.console.notice(HELP),
            ConsoleCommand::Quit => return Flow::Quit,
        }
        self.note_status(&stream.status());
        Flow::Continue
    }

    fn print_status(&self, stream: &LogStream<WebSocketTransport>) {
        let buffer = stream.buffer();
        let filter = if self.filter.is_empty() {
            "(none)".to_owned()
        } else {
            format!("'{}'", self.filter.as_str())
        };
        self.console.notice(&format!(
            "status: {}\nendpoint: {}\nlines: {}/{} ({} evicted, {} visible)\nfilter: {filter}\n\
             paused: {} ({} dropped)\nreconnect attempts: {}/{}",
            stream.status(),
            stream.endpoint(),
            buffer.len(),
            buffer.capacity(),
            buffer.evicted(),
            count_visible(buffer, &self.filter),
            stream.is_paused(),
            stream.discarded(),
            stream.attempts(),
            self.max_attempts,
        ));
    }
}
