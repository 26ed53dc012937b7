// Entrypoint for the CLI application.
// - Loads `.env` files, builds the configuration and validates arguments
//   before anything touches the network.
// - Returns `anyhow::Result` so any failure of the post exits non-zero.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use std::process;
use veg_poster::api::{HttpTransport, Publisher};
use veg_poster::config::Config;
use veg_poster::{caption, env, meta, ui};

#[derive(Parser, Debug)]
#[command(
    name = "veg-poster",
    version,
    about = "Post a publicly hosted garden photo to Instagram with a generated caption"
)]
struct Cli {
    /// Public URL of the image (e.g. https://cdn.example.com/tomato_harvest_nara.jpg)
    image_url: Option<String>,

    /// Read settings from this file instead of the default `.env` locations
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Print the caption preview and exit without posting
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// Ask for confirmation before posting
    #[arg(long, default_value_t = false)]
    confirm: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    env::load_all(cli.env_file.as_deref());

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let Some(image_url) = cli.image_url else {
        eprintln!("{}", Cli::command().render_usage());
        process::exit(1);
    };

    let metadata = meta::infer_now(&image_url, &config.default_location);
    log::debug!("inferred {:?}", metadata);
    let caption = caption::synthesize(&metadata);
    ui::print_preview(&caption);

    if cli.dry_run {
        println!("dry-run enabled; skipping publish.");
        return Ok(());
    }
    if cli.confirm && !ui::confirm_publish()? {
        println!("Cancelled.");
        return Ok(());
    }

    let transport = HttpTransport::new().context("Failed to build HTTP client")?;
    let publisher = Publisher::new(ui::SpinnerTransport::new(transport, "Publishing..."), &config);
    let published = publisher.post(&image_url, &caption)?;
    ui::print_published(&published);
    Ok(())
}
