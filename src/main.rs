//! forge – command-line report generator.
//!
//! Usage:
//!   forge <invoice|inspection> <input.json> [output.pdf] [--config layout.json]
//!         [--font-regular f.ttf] [--font-bold f.ttf] [--dump-layout layout.json]
//!
//! If `output.pdf` is omitted the PDF is written next to the input file, named
//! after the report (e.g. `invoice-inv-0042.pdf`).

use std::path::{Path, PathBuf};
use std::{env, fs, process};

use report_forge::service::{parse_template, ReportKind, ReportService};
use report_forge::{compute_document, FontFace, FontManager, LayoutConfig, ReportError};

#[derive(Default)]
struct Options {
    kind: Option<String>,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    font_regular: Option<PathBuf>,
    font_bold: Option<PathBuf>,
    dump_layout: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let opts = parse_args(&args);

    let kind = match opts.kind.as_deref().map(str::parse::<ReportKind>) {
        Some(Ok(kind)) => kind,
        Some(Err(e)) => fail(&args[0], &e.to_string()),
        None => fail(&args[0], "no report kind specified."),
    };
    let input = match opts.input.clone() {
        Some(p) => p,
        None => fail(&args[0], "no input file specified."),
    };

    if let Err(e) = run(kind, &input, &opts) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(kind: ReportKind, input: &Path, opts: &Options) -> Result<(), ReportError> {
    let config = match &opts.config {
        Some(path) => LayoutConfig::from_json(&fs::read_to_string(path)?)?,
        None => LayoutConfig::default(),
    };

    let mut fonts = FontManager::new();
    if let Some(path) = &opts.font_regular {
        fonts.load_font_file(FontFace::Regular, path)?;
    }
    if let Some(path) = &opts.font_bold {
        fonts.load_font_file(FontFace::Bold, path)?;
    }

    let body = fs::read(input)?;
    if let Some(path) = &opts.dump_layout {
        dump_layout(kind, &body, &config, &fonts, path)?;
    }

    let service = ReportService::new(fonts, config);
    let report = service.generate(kind, &body)?;

    // Default output: same directory as the input, named after the report.
    let output = opts.output.clone().unwrap_or_else(|| {
        input
            .parent()
            .map(|dir| dir.join(&report.filename))
            .unwrap_or_else(|| PathBuf::from(&report.filename))
    });
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&output, &report.pdf)?;

    eprintln!(
        "Wrote '{}' ({} bytes, {} page{})",
        output.display(),
        report.pdf.len(),
        report.page_count,
        if report.page_count == 1 { "" } else { "s" }
    );
    Ok(())
}

/// Write the laid-out draw operations as JSON, for inspecting pagination.
fn dump_layout(
    kind: ReportKind,
    body: &[u8],
    config: &LayoutConfig,
    fonts: &FontManager,
    path: &Path,
) -> Result<(), ReportError> {
    let template = parse_template(kind, body)?;
    let doc = compute_document(&template.blocks(config), &template.title(), config, fonts);
    fs::write(path, doc.to_json())?;
    Ok(())
}

fn parse_args(args: &[String]) -> Options {
    let mut opts = Options::default();
    let mut positional = 0usize;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| match iter.next() {
            Some(v) => PathBuf::from(v),
            None => fail(&args[0], &format!("{flag} needs a path.")),
        };
        match arg.as_str() {
            "--config" | "-c" => opts.config = Some(value("--config")),
            "--font-regular" => opts.font_regular = Some(value("--font-regular")),
            "--font-bold" => opts.font_bold = Some(value("--font-bold")),
            "--dump-layout" => opts.dump_layout = Some(value("--dump-layout")),
            "--help" | "-h" => {
                print_usage(&args[0]);
                process::exit(0);
            }
            other if other.starts_with('-') => fail(&args[0], &format!("unknown flag: {other}")),
            other => {
                match positional {
                    0 => opts.kind = Some(other.to_string()),
                    1 => opts.input = Some(PathBuf::from(other)),
                    2 => opts.output = Some(PathBuf::from(other)),
                    _ => fail(&args[0], &format!("unexpected argument: {other}")),
                }
                positional += 1;
            }
        }
    }
    opts
}

fn fail(prog: &str, message: &str) -> ! {
    eprintln!("Error: {message}");
    print_usage(prog);
    process::exit(1);
}

fn print_usage(prog: &str) {
    eprintln!("forge – paginated report generator (report-forge)");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {prog} <invoice|inspection> <input.json> [output.pdf] [flags]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <kind>         Report type: invoice or inspection");
    eprintln!("  <input.json>   Report record as JSON (every field optional)");
    eprintln!("  [output.pdf]   Output path  (default: report filename next to the input)");
    eprintln!();
    eprintln!("Flags:");
    eprintln!("  --config, -c     Layout configuration JSON (margins, thresholds, overflow policy)");
    eprintln!("  --font-regular   TrueType font for regular text (default: Helvetica)");
    eprintln!("  --font-bold      TrueType font for bold text (default: Helvetica-Bold)");
    eprintln!("  --dump-layout    Also write the laid-out draw operations as JSON");
    eprintln!("  --help           Print this message");
}
