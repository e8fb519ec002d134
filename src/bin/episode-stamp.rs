use std::{
    io::{self, Write as _},
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::FmtSubscriber;

use episode_stamp::{
    Document, ExportFormat, FormDefaults, Layer, LayerContent, PresetPrompt, RasterDocument,
    RunOutcome, StderrNotifier, TerminalPrompt,
};

const EXIT_REJECTED: u8 = 2;

#[derive(Parser, Debug)]
#[command(name = "episode-stamp", version)]
#[command(about = "Export numbered variants of a layered document", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,

    /// Verbose logging for this crate.
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one image per number, rewriting a text layer each time.
    Export(ExportArgs),
    /// List the layers of a document.
    Layers(LayersArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input document JSON.
    #[arg(long)]
    doc: PathBuf,

    /// First number (default 1).
    #[arg(long, allow_hyphen_values = true)]
    start: Option<String>,

    /// Last number, inclusive (default 10).
    #[arg(long, allow_hyphen_values = true)]
    end: Option<String>,

    /// Top-level text layer to rewrite (default: the first one).
    #[arg(long)]
    layer: Option<String>,

    /// Existing output directory (default: the desktop).
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// File name prefix placed before the number (default "episode_").
    #[arg(long)]
    base_name: Option<String>,

    /// Output format (default jpg).
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Use the values above as-is instead of asking interactively.
    #[arg(long)]
    no_prompt: bool,

    /// After a successful export, write the document (showing the last number) here.
    #[arg(long)]
    save_doc: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct LayersArgs {
    /// Input document JSON.
    #[arg(long)]
    doc: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Jpg,
    Png,
}

impl From<FormatChoice> for ExportFormat {
    fn from(c: FormatChoice) -> Self {
        match c {
            FormatChoice::Jpg => ExportFormat::Jpg,
            FormatChoice::Png => ExportFormat::Png,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let res = match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Layers(args) => cmd_layers(args),
    };
    match res {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(debug: bool) {
    let filter_directives = if debug {
        "info,episode_stamp=debug"
    } else {
        "info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter_directives));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<ExitCode> {
    let mut doc = RasterDocument::open(&args.doc)
        .with_context(|| format!("load document '{}'", args.doc.display()))?;

    let base = FormDefaults::default();
    let defaults = FormDefaults {
        start: args.start.unwrap_or(base.start),
        end: args.end.unwrap_or(base.end),
        layer_name: args.layer,
        export_path: args.out_dir.unwrap_or(base.export_path),
        base_name: args.base_name.unwrap_or(base.base_name),
        format: args.format.map(ExportFormat::from).unwrap_or(base.format),
    };

    let mut notifier = StderrNotifier;
    let outcome = if args.no_prompt {
        episode_stamp::run(&mut doc, &mut PresetPrompt::Defaults, &mut notifier, defaults)?
    } else {
        let mut prompt = TerminalPrompt::new(io::stdin().lock(), io::stderr());
        episode_stamp::run(&mut doc, &mut prompt, &mut notifier, defaults)?
    };

    match outcome {
        RunOutcome::Cancelled => Ok(ExitCode::SUCCESS),
        RunOutcome::Rejected(_) => Ok(ExitCode::from(EXIT_REJECTED)),
        RunOutcome::Exported(report) => {
            if let Some(path) = &args.save_doc {
                doc.into_document()
                    .save_json(path)
                    .with_context(|| format!("save document '{}'", path.display()))?;
                eprintln!("wrote {}", path.display());
            }
            eprintln!(
                "wrote {} file(s) to {}",
                report.written.len(),
                report.settings.export_path.display()
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_layers(args: LayersArgs) -> anyhow::Result<ExitCode> {
    let doc = Document::from_path(&args.doc)
        .with_context(|| format!("load document '{}'", args.doc.display()))?;

    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} ({}x{})",
        display_name(&args.doc),
        doc.canvas.width,
        doc.canvas.height
    )?;
    for (i, layer) in doc.layers.iter().enumerate() {
        write_layer(&mut out, Some(i), layer, 0)?;
    }
    Ok(ExitCode::SUCCESS)
}

fn write_layer(
    out: &mut impl io::Write,
    index: Option<usize>,
    layer: &Layer,
    depth: usize,
) -> io::Result<()> {
    let slot = index.map_or_else(|| "-".to_string(), |i| i.to_string());
    let visibility = if layer.visible { "visible" } else { "hidden" };
    let nested = if depth > 0 { "  (nested, not selectable)" } else { "" };
    writeln!(
        out,
        "{:indent$}{slot:>3}  {:<5}  {visibility:<7}  {}{nested}",
        "",
        layer.kind(),
        layer.name,
        indent = depth * 4
    )?;
    if let LayerContent::Group(g) = &layer.content {
        for child in &g.layers {
            write_layer(out, None, child, depth + 1)?;
        }
    }
    Ok(())
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
