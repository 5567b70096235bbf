//! # CLI Module
//!
//! Command-line interface for the signature matcher.
//!
//! ## Usage
//! ```bash
//! # Compare two signature files once
//! sigmatch compare alice.png scanned.jpg
//!
//! # JSON output, keeping every stage image
//! sigmatch compare alice.png scanned.jpg --output json --save-stages ./stages
//!
//! # Interactive session: upload references, then compare against them
//! sigmatch session
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use console::{style, StyledObject, Term};
use indicatif::{ProgressBar, ProgressStyle};
use signature_matcher::core::decode::{is_accepted_upload, ACCEPTED_EXTENSIONS};
use signature_matcher::core::reporter::{
    format_score, similarity_bar, ComparisonReport, SimilarityTier, StageSection, StageSink, StageView,
};
use signature_matcher::core::session::{user_guidance, Session};
use signature_matcher::error::{ImageError, Result, SignatureMatchError};
use signature_matcher::events::{Event, EventChannel, PipelineEvent};
use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Signature Matcher - Compare handwritten signatures with SSIM
#[derive(Parser, Debug)]
#[command(name = "sigmatch")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a candidate signature against a reference signature
    Compare {
        /// Reference signature (stored under its file name)
        reference: PathBuf,

        /// Signature to check against the reference
        candidate: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "pretty")]
        output: OutputFormat,

        /// Write every stage image as PNG into this directory
        #[arg(long)]
        save_stages: Option<PathBuf>,
    },
    /// Interactive session: upload named signatures and compare against them
    Session {
        /// Write every stage image as PNG into this directory
        #[arg(long)]
        save_stages: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Run the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            reference,
            candidate,
            output,
            save_stages,
        } => run_compare(&reference, &candidate, output, save_stages),
        Commands::Session { save_stages } => run_session(save_stages),
    }
}

fn run_compare(
    reference: &Path,
    candidate: &Path,
    output: OutputFormat,
    save_stages: Option<PathBuf>,
) -> Result<()> {
    let term = Term::stderr();
    let pretty = matches!(output, OutputFormat::Pretty);

    if pretty {
        term.write_line(&format!(
            "{} {}",
            style("Signature Matcher").bold().cyan(),
            style(concat!("v", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
        term.write_line("").ok();
    }

    let (sender, receiver) = EventChannel::new();
    let mut session = Session::new().with_events(sender);

    let progress = if pretty {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    } else {
        None
    };

    let progress_clone = progress.clone();
    let event_thread = thread::spawn(move || {
        for event in receiver.iter() {
            let Some(ref pb) = progress_clone else {
                continue;
            };
            match event {
                Event::Pipeline(PipelineEvent::Started { reference }) => {
                    pb.set_message(format!("Comparing against '{}'", reference));
                }
                Event::Pipeline(PipelineEvent::StageCompleted { stage }) => {
                    pb.set_message(format!("{} done", stage));
                }
                Event::Pipeline(PipelineEvent::Completed { .. })
                | Event::Pipeline(PipelineEvent::Error { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let name = reference
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "reference".to_string());

    let mut display =
        StageDisplay::new(term.clone(), save_stages, pretty).with_progress(progress.clone());
    let outcome = compare_files(&mut session, &name, reference, candidate, &mut display);

    // Drop the session's sender so the event thread finishes
    drop(session);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let report = outcome?;
    match output {
        OutputFormat::Pretty => print_pretty_report(&term, &report),
        OutputFormat::Json => print_json_report(&report),
    }

    Ok(())
}

fn compare_files(
    session: &mut Session,
    name: &str,
    reference: &Path,
    candidate: &Path,
    display: &mut StageDisplay,
) -> Result<ComparisonReport> {
    let reference_bytes = read_upload(reference)?;
    let candidate_bytes = read_upload(candidate)?;

    session.upload(Some(name), Some(reference_bytes.as_slice()))?;
    session.compare(Some(name), Some(candidate_bytes.as_slice()), display)
}

fn run_session(save_stages: Option<PathBuf>) -> Result<()> {
    let term = Term::stdout();
    let mut session = Session::new();

    term.write_line(&format!(
        "{} {}",
        style("Signature Matcher").bold().cyan(),
        style("- type 'help' for commands").dim()
    ))
    .ok();

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to read command");
                break;
            }
        };

        match SessionCommand::parse(&line) {
            SessionCommand::Upload { name, path } => {
                let result = read_upload(Path::new(path))
                    .and_then(|bytes| session.upload(Some(name), Some(bytes.as_slice())));
                match result {
                    Ok(outcome) => {
                        term.write_line(&format!(
                            "{} {}",
                            style("✓").green().bold(),
                            outcome.message()
                        ))
                        .ok();
                    }
                    Err(e) => print_guidance(&term, &e),
                }
            }
            SessionCommand::Compare { name, path } => {
                let mut display = StageDisplay::new(term.clone(), save_stages.clone(), true);
                let result = if session.registry().is_empty() {
                    session.compare(Some(name), None, &mut display)
                } else {
                    read_upload(Path::new(path)).and_then(|bytes| {
                        session.compare(Some(name), Some(bytes.as_slice()), &mut display)
                    })
                };
                match result {
                    Ok(report) => print_pretty_report(&term, &report),
                    Err(e) => print_guidance(&term, &e),
                }
            }
            SessionCommand::List => print_names(&term, &session),
            SessionCommand::Help => print_help(&term),
            SessionCommand::Quit => break,
            SessionCommand::Empty => {}
            SessionCommand::Unknown(command) => {
                term.write_line(&format!(
                    "{} Unknown command '{}'. Type 'help' for commands.",
                    style("?").yellow(),
                    command
                ))
                .ok();
            }
        }
    }

    Ok(())
}

/// One line of input in the interactive session
#[derive(Debug, PartialEq, Eq)]
enum SessionCommand<'a> {
    Upload { name: &'a str, path: &'a str },
    Compare { name: &'a str, path: &'a str },
    List,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

impl<'a> SessionCommand<'a> {
    /// Parse `verb [name] [path]`. The path may contain spaces.
    fn parse(line: &'a str) -> Self {
        let mut parts = line.trim().splitn(3, char::is_whitespace);
        let verb = parts.next().unwrap_or("");
        let name = parts.next().unwrap_or("").trim();
        let path = parts.next().unwrap_or("").trim();

        match verb {
            "" => SessionCommand::Empty,
            "upload" => SessionCommand::Upload { name, path },
            "compare" => SessionCommand::Compare { name, path },
            "list" => SessionCommand::List,
            "help" => SessionCommand::Help,
            "quit" | "exit" => SessionCommand::Quit,
            other => SessionCommand::Unknown(other),
        }
    }
}

/// Read an upload from disk, rejecting unsupported file types.
///
/// An empty path returns no bytes so the session reports missing input.
fn read_upload(path: &Path) -> Result<Vec<u8>> {
    if path.as_os_str().is_empty() {
        return Ok(Vec::new());
    }
    if !is_accepted_upload(path) {
        return Err(ImageError::DecodeFailed {
            reason: format!(
                "{} is not a supported file type (expected {})",
                path.display(),
                ACCEPTED_EXTENSIONS.join(", ")
            ),
        }
        .into());
    }
    fs::read(path).map_err(|e| {
        SignatureMatchError::from(ImageError::Io {
            path: path.to_path_buf(),
            source: e,
        })
    })
}

/// Shows stage images as captions and optionally writes them as PNG files
struct StageDisplay {
    term: Term,
    save_dir: Option<PathBuf>,
    verbose: bool,
    /// Spinner sharing the terminal; hidden while a stage line is written
    progress: Option<ProgressBar>,
    shown: usize,
    last_section: Option<StageSection>,
}

impl StageDisplay {
    fn new(term: Term, save_dir: Option<PathBuf>, verbose: bool) -> Self {
        Self {
            term,
            save_dir,
            verbose,
            progress: None,
            shown: 0,
            last_section: None,
        }
    }

    fn with_progress(mut self, progress: Option<ProgressBar>) -> Self {
        self.progress = progress;
        self
    }

    fn write_line(&self, line: &str) {
        match &self.progress {
            Some(pb) => pb.suspend(|| self.term.write_line(line).ok()),
            None => self.term.write_line(line).ok(),
        };
    }

    fn save(&self, dir: &Path, view: &StageView) -> Option<PathBuf> {
        if let Err(e) = fs::create_dir_all(dir) {
            warn!(dir = %dir.display(), error = %e, "cannot create stage directory");
            return None;
        }
        let path = dir.join(stage_file_name(self.shown, view.caption));
        match view.image.save(&path) {
            Ok(()) => Some(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to save stage image");
                None
            }
        }
    }
}

impl StageSink for StageDisplay {
    fn show(&mut self, view: &StageView) {
        self.shown += 1;
        let saved = self.save_dir.as_deref().and_then(|dir| self.save(dir, view));

        if !self.verbose {
            return;
        }

        if self.last_section != Some(view.section) {
            if self.last_section.is_none() {
                self.write_line(&format!("{}", style("Stepwise Comparison:").bold().underlined()));
            }
            self.write_line(&format!("  {}", style(view.section).bold()));
            self.last_section = Some(view.section);
        }

        let location = saved
            .map(|p| format!(" -> {}", p.display()))
            .unwrap_or_default();
        self.write_line(&format!(
            "    {} {}{}",
            view.caption,
            style(format!("({}x{})", view.image.width(), view.image.height())).dim(),
            location
        ));
    }
}

/// `01-original-signature-1.png`
fn stage_file_name(index: usize, caption: &str) -> String {
    format!(
        "{:02}-{}.png",
        index,
        caption.to_lowercase().replace(' ', "-")
    )
}

fn tier_style(tier: SimilarityTier, text: String) -> StyledObject<String> {
    match tier {
        SimilarityTier::Good => style(text).green(),
        SimilarityTier::Medium => style(text).yellow(),
        SimilarityTier::Poor => style(text).red(),
    }
}

fn print_pretty_report(term: &Term, report: &ComparisonReport) {
    term.write_line("").ok();
    term.write_line(&format!("{} {}", style("Result:").bold(), report.message))
        .ok();
    term.write_line(&format!(
        "  {} {}",
        tier_style(
            report.tier,
            format!("Similarity: {}%", format_score(report.score))
        )
        .bold(),
        style(similarity_bar(report.score)).dim()
    ))
    .ok();
    term.write_line("").ok();
}

fn print_json_report(report: &ComparisonReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => warn!(error = %e, "failed to serialize report"),
    }
}

fn print_guidance(term: &Term, error: &SignatureMatchError) {
    let marker = if error.is_informational() {
        style("i").cyan()
    } else {
        style("✗").red()
    };
    term.write_line(&format!("{} {}", marker, user_guidance(error)))
        .ok();
}

fn print_names(term: &Term, session: &Session) {
    if session.registry().is_empty() {
        term.write_line("  No signatures uploaded yet.").ok();
        return;
    }
    for signature in session.registry().signatures() {
        term.write_line(&format!(
            "  {} {}",
            style(&signature.name).bold(),
            style(format!(
                "{}x{}, uploaded {}",
                signature.image.width(),
                signature.image.height(),
                signature.uploaded_at.format("%H:%M:%S")
            ))
            .dim()
        ))
        .ok();
    }
}

fn print_help(term: &Term) {
    for line in [
        "  upload <name> <path>   Store a reference signature under <name>",
        "  compare <name> <path>  Compare <path> against the signature <name>",
        "  list                   Show uploaded signatures",
        "  help                   Show this help",
        "  quit                   Leave the session",
    ] {
        term.write_line(line).ok();
    }
}
