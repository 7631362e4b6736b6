use std::io::{self, IsTerminal, StdinLock, Write};
use std::time::Duration;

use crossterm::style::{Color, Stylize};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use serde::Serialize;

use crate::app::{AbortReason, ProgressEvent, ProgressSink, RunOutcome, RunSummary};
use crate::download::AssetOutcome;
use crate::species::LinePrompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Interactive,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl Stream {
    pub fn writer(self) -> Box<dyn Write> {
        match self {
            Stream::Stdout => Box::new(io::stdout()),
            Stream::Stderr => Box::new(io::stderr()),
        }
    }

    pub fn is_terminal(self) -> bool {
        match self {
            Stream::Stdout => io::stdout().is_terminal(),
            Stream::Stderr => io::stderr().is_terminal(),
        }
    }
}

impl OutputMode {
    // stdout carries nothing but the JSON document in Json mode
    pub fn prompt_stream(self) -> Stream {
        match self {
            OutputMode::Interactive => Stream::Stdout,
            OutputMode::Json => Stream::Stderr,
        }
    }

    pub fn prompt(self) -> LinePrompt<StdinLock<'static>, Box<dyn Write>> {
        let stream = self.prompt_stream();
        LinePrompt::new(io::stdin().lock(), stream.writer(), stream.is_terminal())
    }
}

pub fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        text.with(color).to_string()
    } else {
        text.to_string()
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_outcome(outcome: &RunOutcome) -> io::Result<()> {
        Self::write_outcome(&mut io::stdout(), outcome)
    }

    pub fn write_outcome<W: Write>(out: &mut W, outcome: &RunOutcome) -> io::Result<()> {
        Self::write_json(out, outcome)
    }

    fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        out.write_all(json.as_bytes())?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}

pub struct ConsoleProgress {
    bar: ProgressBar,
    colored: bool,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        if let Ok(style) = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
        ) {
            bar.set_style(style.progress_chars("=>-"));
        }
        Self {
            bar,
            colored: Stream::Stderr.is_terminal(),
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for ConsoleProgress {
    fn event(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Stage(message) => println!("{message}"),
            ProgressEvent::DownloadStarted { total } => {
                self.bar.set_draw_target(ProgressDrawTarget::stderr());
                self.bar.set_length(total as u64);
                self.bar.set_position(0);
                self.bar.enable_steady_tick(Duration::from_millis(100));
            }
            ProgressEvent::AssetFinished { index, outcome } => {
                if let AssetOutcome::Failed(failure) = outcome {
                    let line = format!("ERROR: did not download [{index}]: {}", failure.url);
                    self.bar.suspend(|| {
                        eprintln!("{}", paint(&line, Color::Red, self.colored));
                    });
                }
                self.bar.inc(1);
            }
            ProgressEvent::DownloadFinished => self.bar.finish(),
        }
    }
}

pub fn print_summary(outcome: &RunOutcome) -> io::Result<()> {
    let colored = Stream::Stdout.is_terminal();
    write_summary(&mut io::stdout(), outcome, colored)
}

pub fn write_summary<W: Write>(out: &mut W, outcome: &RunOutcome, colored: bool) -> io::Result<()> {
    match outcome {
        RunOutcome::Completed(summary) => write_completed(out, summary, colored),
        RunOutcome::Aborted {
            reason: AbortReason::Declined,
        } => writeln!(
            out,
            "{}",
            paint("Aborted; extracted files removed.", Color::Yellow, colored)
        ),
        RunOutcome::Aborted {
            reason: AbortReason::InvalidAnswer(_),
        } => writeln!(
            out,
            "{}",
            paint(
                "The only acceptable inputs are 'y' or 'n', try again.",
                Color::Yellow,
                colored
            )
        ),
    }
}

fn write_completed<W: Write>(out: &mut W, summary: &RunSummary, colored: bool) -> io::Result<()> {
    let report = &summary.report;
    let heading = format!(
        "{} ({}): {} listed",
        summary.species.slug, summary.species.taxon_key, summary.multimedia_count
    );
    writeln!(out, "{}", paint(&heading, Color::Cyan, colored))?;
    let downloaded = format!("  downloaded: {}", report.downloaded);
    writeln!(out, "{}", paint(&downloaded, Color::Green, colored))?;
    writeln!(out, "  already present: {}", report.skipped)?;
    let failed = format!("  failed: {}", report.failed.len());
    if report.failed.is_empty() {
        writeln!(out, "{failed}")?;
    } else {
        writeln!(out, "{}", paint(&failed, Color::Red, colored))?;
    }
    if !summary.species.validated {
        writeln!(
            out,
            "{}",
            paint(
                "  note: archive spans several taxon keys; species taken from the first record",
                Color::Yellow,
                colored
            )
        )?;
    }
    writeln!(out, "  metadata: {}", summary.metadata_path)
}
