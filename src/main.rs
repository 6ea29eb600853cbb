use clap::{Parser, Subcommand};
use simple_resize::imaging::{OutputKind, RustBackend};
use simple_resize::naming::SystemNames;
use simple_resize::types::InputFile;
use simple_resize::{config, output, process};
use std::collections::HashMap;
use std::path::PathBuf;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-resize")]
#[command(about = "Batch image resizer")]
#[command(long_about = "\
Batch image resizer

Resizes JPEG, PNG and WebP images and writes them as PNG, JPEG or WebP.
Directories given as inputs are searched recursively for images.

Target size:
  --width only           height follows the source aspect ratio
  --height only          width follows the source aspect ratio
  --width and --height   exact size; stretched, or center-cropped with --cover
                         (--no-cover overrides cover = true in config.toml)
  neither                scaled to a height of 100px

Outputs:
  file     image-<millis>-<random>.<ext> in --out-dir
  blob     <input name>.<ext> in --out-dir
  base64   one data: URI per image on stdout

Settings are read from config.toml in --config-dir, then overridden by flags.
Run 'simple-resize gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize images
    Resize(ResizeArgs),
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Image files or directories
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Center-crop to the target aspect ratio (needs --width and --height)
    #[arg(long, overrides_with = "no_cover")]
    cover: bool,

    /// Stretch to the target size, even if config.toml sets cover
    #[arg(long, overrides_with = "cover")]
    no_cover: bool,

    /// Output format: png, jpeg or webp
    #[arg(long)]
    format: Option<String>,

    /// Encoding quality in (0, 1]
    #[arg(long)]
    quality: Option<f32>,

    /// Output representation: file, base64 or blob
    #[arg(long)]
    output: Option<OutputKind>,

    /// Directory for file and blob outputs
    #[arg(long, default_value = "resized")]
    out_dir: PathBuf,

    /// Write a JSON report of every image to this path
    #[arg(long)]
    manifest: Option<PathBuf>,
}

impl ResizeArgs {
    /// Flags as a TOML overlay, holding only the values actually given.
    fn overlay(&self) -> toml::Value {
        let mut resize = toml::Table::new();
        if let Some(width) = self.width {
            resize.insert("width".into(), toml::Value::Integer(width.into()));
        }
        if let Some(height) = self.height {
            resize.insert("height".into(), toml::Value::Integer(height.into()));
        }
        if self.cover || self.no_cover {
            resize.insert("cover".into(), toml::Value::Boolean(self.cover));
        }

        let mut output = toml::Table::new();
        if let Some(format) = &self.format {
            output.insert("format".into(), toml::Value::String(format.clone()));
        }
        if let Some(quality) = self.quality {
            output.insert("quality".into(), toml::Value::Float(quality.into()));
        }
        if let Some(kind) = self.output {
            output.insert("kind".into(), toml::Value::String(kind.to_string()));
        }

        let mut root = toml::Table::new();
        root.insert("resize".into(), toml::Value::Table(resize));
        root.insert("output".into(), toml::Value::Table(output));
        toml::Value::Table(root)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Resize(args) => run_resize(&cli.config_dir, &args)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn run_resize(
    config_dir: &std::path::Path,
    args: &ResizeArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let file_layer = config::load_raw_config(config_dir)?;
    let layers = file_layer.into_iter().chain(std::iter::once(args.overlay()));
    let resize_config = config::resolve_config(config::stock_defaults_value(), layers)?;
    init_thread_pool(&resize_config.processing);

    let options = resize_config.to_options();
    log::debug!("Resize options: {:?}", options);

    let paths = process::collect_inputs(&args.inputs)?;
    let files = paths
        .iter()
        .map(|path| InputFile::read(path))
        .collect::<Result<Vec<_>, _>>()?;

    // Stdout carries the data URIs in base64 mode, so progress moves to stderr.
    let to_stderr = options.output == OutputKind::Base64;
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        let mut plans = HashMap::new();
        for event in rx {
            if to_stderr {
                output::eprint_process_event(&event);
            } else {
                output::print_process_event(&event);
            }
            if let process::ProcessEvent::ImageLoaded { index, plan, .. } = event {
                plans.insert(index, plan);
            }
        }
        plans
    });
    let results = process::resize_images(
        &RustBackend::new(),
        &files,
        &options,
        &SystemNames,
        Some(tx),
    );
    let plans = printer.join().map_err(|_| "progress printer panicked")?;
    let results = results.map_err(process::ProcessError::from)?;

    let reports = process::write_outputs(
        &files,
        results,
        &plans,
        &options.mime_type,
        &args.out_dir,
        &mut std::io::stdout().lock(),
    )?;
    output::print_summary(&reports);

    if let Some(manifest_path) = &args.manifest {
        let json = serde_json::to_string_pretty(&reports)?;
        std::fs::write(manifest_path, json)?;
    }

    process::check_complete(&reports)?;
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
