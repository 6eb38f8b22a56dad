use clap::Parser;
use std::path::Path;

use image_host::config::{FileConfig, Settings};
use image_host::error::AppError;
use image_host::plugin_loader::Plugin;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "image_host")]
struct Args {
    /// path to the image handed to the plugin
    #[arg(long)]
    input: String,

    /// path to save the decoded image to, format picked from the extension (e.g. out.png)
    #[arg(long)]
    output: Option<String>,

    /// path to write the plugin's raw `[width][height][pixels]` dump to
    #[arg(long)]
    raw_output: Option<String>,

    /// plugin name without extension (default red_plugin)
    #[arg(long)]
    plugin: Option<String>,

    /// directory with plugins (default target/debug)
    #[arg(long)]
    plugin_path: Option<String>,

    /// log filter used when RUST_LOG is unset (default info)
    #[arg(short, long)]
    log: Option<String>,

    /// optional TOML config file
    #[arg(long)]
    config: Option<String>,
}

fn main() -> Result<(), AppError> {
    let args = Args::parse();

    let file_config = match &args.config {
        Some(path) => FileConfig::load(Path::new(path))?,
        None => FileConfig::default(),
    };
    let settings = Settings::resolve(
        args.plugin.clone(),
        args.plugin_path.clone(),
        args.log.clone(),
        file_config,
    );

    init_tracing(&settings.log);

    let input = Path::new(&args.input);
    if !input.exists() {
        return Err(AppError::MissingInput(args.input.clone()));
    }

    let plugin_file = settings.plugin_file();
    if !plugin_file.exists() {
        return Err(AppError::MissingPlugin(plugin_file.display().to_string()));
    }

    // SAFETY:
    // - We only load from a path we constructed and checked exists.
    // - `Plugin::load` is unsafe because Rust can't verify that the library exports
    //   the buffer protocol symbols with the expected ABI and honours the ownership
    //   contract; an incompatible library is Undefined Behavior.
    let plugin = unsafe { Plugin::load(&plugin_file)? };
    let api = plugin.api();

    let info = api.info();
    tracing::info!(name = %info.name, extensions = ?info.extensions, plugin = %plugin_file.display(), "plugin loaded");

    if !info.supports(input) {
        tracing::warn!(input_file = %args.input, "input extension is not listed by the plugin");
    }

    let image = api.load(input)?;
    tracing::info!(
        width = image.width(),
        height = image.height(),
        channels = image.channels(),
        input_file = %args.input,
        "image loaded"
    );

    if let Some(raw_output) = &args.raw_output {
        api.save(Path::new(raw_output), &image)?;
        tracing::info!(output_file = %raw_output, "raw dump saved");
    }

    if let Some(output) = &args.output {
        image.to_dynamic_image()?.save(output)?;
        tracing::info!(output_file = %output, "output file saved");
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    fmt().with_env_filter(filter).init();
}
