use clap::{Parser, Subcommand};
use metacraft::config::{self, AppConfig};
use metacraft::contrast::Contrast;
use metacraft::form::{FormState, validate_all};
use metacraft::imaging::{OgImageParams, OgRenderer, OutputFormat, ResvgRenderer};
use metacraft::metadata::json_ld;
use metacraft::output;
use metacraft::preview::{SnippetEscaping, head_snippet};
use metacraft::query::{fields, from_query};
use metacraft::server::{self, AppState};
use metacraft::sync::{FileLocation, UrlSynchronizer};
use metacraft::types::MetaConfig;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "metacraft=info,tower_http=info";

#[derive(Parser)]
#[command(name = "metacraft")]
#[command(about = "SEO, Open Graph and Twitter meta tag composer")]
#[command(long_about = "\
SEO, Open Graph and Twitter meta tag composer

One set of values drives the <head> tags, the JSON-LD block and a rendered
Open Graph image. The values travel as a query string, so every command that
takes <QUERY> accepts the same thing the generator page puts in its address
bar (a bare query, ?query, or a full URL):

  title=Hello&description=Launch+notes&canonical=https://example.com/post
  &type=article&twitterCard=summary&author=Ana&ogImageText=Big+Launch
  &ogBg=%23112233&ogFg=%23fff&jsonldType=Article

Fields that are missing or empty take the [defaults] from config.toml.

Run 'metacraft gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Public base URL used in absolute links and image URLs
    #[arg(long, global = true, env = "METACRAFT_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the generator page and image endpoints
    Serve {
        /// Listen address, overriding server.bind
        #[arg(long)]
        bind: Option<String>,
    },
    /// Print the <head> snippet for a query
    Snippet {
        #[arg(default_value = "")]
        query: String,
        /// Interpolate field values without HTML escaping
        #[arg(long)]
        raw: bool,
    },
    /// Print the JSON-LD block for a query
    JsonLd {
        #[arg(default_value = "")]
        query: String,
    },
    /// Render the OG image for a query to a file
    Og {
        #[arg(default_value = "")]
        query: String,
        /// Output file; the extension picks the format (png, jpg, webp)
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate every field of a query and report the colour contrast
    Check {
        #[arg(default_value = "")]
        query: String,
    },
    /// Apply `key=value` edits from stdin, mirroring the URL into a file
    Edit {
        /// File that holds the current shareable URL
        #[arg(long)]
        location: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        config: config_path,
        base_url,
        command,
    } = Cli::parse();
    init_tracing();

    let load = move || -> Result<AppConfig, config::ConfigError> {
        let mut config = config::load_config(config_path.as_deref())?;
        config.override_base_url(base_url)?;
        Ok(config)
    };

    match command {
        Command::Serve { bind } => {
            let mut config = load()?;
            if let Some(bind) = bind {
                config.server.bind = bind;
                config.validate()?;
            }
            let renderer = ResvgRenderer::from_config(&config.image)?;
            output::print_serve_banner(
                &config.server.bind,
                &config.server.base_url,
                renderer.format(),
                renderer.dimensions(),
            );
            let state = Arc::new(AppState::new(config, Arc::new(renderer)));
            runtime()?.block_on(server::serve(state))?;
        }
        Command::Snippet { query, raw } => {
            let config = load()?;
            let values = from_query(&query, &config.defaults);
            let escaping = if raw {
                SnippetEscaping::Raw
            } else {
                config.snippet.escaping()
            };
            println!("{}", head_snippet(&values, &config.server.base_url, escaping));
        }
        Command::JsonLd { query } => {
            let config = load()?;
            let values = from_query(&query, &config.defaults);
            println!("{}", serde_json::to_string_pretty(&json_ld(&values))?);
        }
        Command::Og { query, output: path } => {
            let config = load()?;
            let values = from_query(&query, &config.defaults);
            render_og(&config, &values, &path)?;
        }
        Command::Check { query } => {
            let config = load()?;
            let values = from_query(&query, &config.defaults);
            let errors = validate_all(&values);
            let contrast = Contrast::between(&values.og_bg, &values.og_fg);
            output::print_check_report(&values, &errors, &contrast);
            if !errors.is_empty() {
                std::process::exit(1);
            }
        }
        Command::Edit { location } => {
            let config = load()?;
            runtime()?.block_on(edit_session(&config, &location))?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

fn render_og(
    config: &AppConfig,
    values: &MetaConfig,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let format = OutputFormat::from_path(path).unwrap_or(config.image.format);
    let renderer = ResvgRenderer::new(
        config.image.canvas(),
        config.image.text_style(),
        format,
        config.image.fonts_dir.as_deref(),
    )?;
    let params = OgImageParams::from_values(values);
    let image = renderer.render(&params)?;
    std::fs::write(path, &image.bytes)?;
    output::print_og_written(&params.title, path, &image);
    Ok(())
}

/// Read edits from stdin until EOF. Each line is one `key=value` pair (or
/// several joined with `&`); the URL in `location` is rewritten once the
/// input has been idle for `sync.debounce_ms`.
async fn edit_session(config: &AppConfig, location: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let initial = match FileLocation::read(location)? {
        Some(url) => from_query(&url, &config.defaults),
        None => config.defaults.clone(),
    };
    let mut state = FormState::new(initial);
    let writer = FileLocation::new(location, &config.server.base_url);
    let sync = UrlSynchronizer::spawn(writer, config.sync.debounce());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut edits = 0;
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let changes = fields(line);
        if changes.is_empty() {
            warn!(%line, "no recognised field in edit");
            continue;
        }
        for (field, value) in changes {
            state.edit(field, &value);
            for out in output::format_edit_event(field, &value, state.error(field)) {
                println!("{}", out);
            }
            edits += 1;
        }
        sync.notify(state.values());
    }

    sync.close().await;
    for out in output::format_edit_summary(location, edits) {
        println!("{}", out);
    }
    Ok(())
}
