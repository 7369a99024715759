//! Import template mockups and generate template/reference/metadata.
//!
//! Usage:
//!   import_template SOURCE [-o DIR] [--color HEX] [--tolerance N]
//!                   [--dilate N] [--offset N] [--label-font PATH] [--replace]
//!
//! SOURCE may be a single raster file or a directory; a directory imports
//! every raster beneath it, strictly sequentially.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use template_oxide::{AnalyzerConfig, TemplateAnalyzer};

const RASTER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff", "webp"];

struct ImportArgs {
    source: PathBuf,
    output: Option<PathBuf>,
    config: AnalyzerConfig,
}

impl ImportArgs {
    fn from_args() -> Result<Self, String> {
        let args: Vec<String> = std::env::args().collect();
        let mut source: Option<PathBuf> = None;
        let mut output: Option<PathBuf> = None;
        let mut config = AnalyzerConfig::default();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-o" | "--output" => {
                    i += 1;
                    output = Some(PathBuf::from(next_value(&args, i, "--output")?));
                },
                "--color" => {
                    i += 1;
                    config.placeholder_color = next_value(&args, i, "--color")?.to_string();
                },
                "--tolerance" => {
                    i += 1;
                    config.tolerance = parse_number(&args, i, "--tolerance")?;
                },
                "--dilate" => {
                    i += 1;
                    config.edge_dilation = parse_number(&args, i, "--dilate")?;
                },
                "--offset" => {
                    i += 1;
                    config.background_offset = parse_number(&args, i, "--offset")?;
                },
                "--label-font" => {
                    i += 1;
                    let path = PathBuf::from(next_value(&args, i, "--label-font")?);
                    config.label_font_paths = vec![path];
                },
                "-r" | "--replace" => {
                    config.replace = true;
                },
                "-h" | "--help" => {
                    print_usage();
                    std::process::exit(0);
                },
                "-V" | "--version" => {
                    println!("import_template {}", template_oxide::VERSION);
                    std::process::exit(0);
                },
                other if source.is_none() && !other.starts_with('-') => {
                    source = Some(PathBuf::from(other));
                },
                other => return Err(format!("unexpected argument: {}", other)),
            }
            i += 1;
        }

        let source = source.ok_or_else(|| "missing SOURCE argument".to_string())?;
        Ok(Self {
            source,
            output,
            config,
        })
    }
}

fn next_value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("{} requires a value", flag))
}

fn parse_number<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> Result<T, String> {
    next_value(args, i, flag)?
        .parse()
        .map_err(|_| format!("{} requires a number", flag))
}

fn print_usage() {
    println!(
        "Usage: import_template SOURCE [-o DIR] [--color HEX] [--tolerance N]\n\
         \x20                      [--dilate N] [--offset N] [--label-font PATH] [--replace]\n\
         \n\
         Import a mockup raster (or every raster under a directory) and write\n\
         template.png, reference.png and regions.json per source."
    );
}

fn collect_rasters(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&current) else { continue };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| RASTER_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false)
            {
                found.push(path);
            }
        }
    }
    found.sort();
    found
}

fn run(args: ImportArgs) -> template_oxide::Result<()> {
    let analyzer = TemplateAnalyzer::new(args.config);

    if args.source.is_dir() {
        let sources = collect_rasters(&args.source);
        if sources.is_empty() {
            eprintln!("No raster files found in {}", args.source.display());
            std::process::exit(1);
        }
        println!("Found {} file(s) to import", sources.len());
        let output = args.output.unwrap_or_else(|| args.source.clone());
        let reports = analyzer.import_batch(&sources, &output)?;
        for report in reports {
            println!("{}", report.metadata.display());
        }
    } else {
        let output = args
            .output
            .or_else(|| args.source.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        let report = analyzer.import_file(&args.source, &output)?;
        println!("{}", report.template.display());
        println!("{}", report.reference.display());
        println!("{}", report.metadata.display());
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args = match ImportArgs::from_args() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("import_template: error: {}", msg);
            print_usage();
            return ExitCode::from(2);
        },
    };

    if let Err(e) = run(args) {
        eprintln!("import_template: error: {}", e);
        return ExitCode::from(2);
    }
    ExitCode::SUCCESS
}
