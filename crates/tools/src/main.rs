use std::path::{Path, PathBuf};

use catalog::Catalog;
use clap::{Args, Parser, Subcommand};
use scene::{ViewConfig, ViewSession, calculate_view_params};
use serde::Serialize;
use tools::{FrameReport, ParamsReport, PickReport, load_view_config};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Star map viewport tools")]
struct Cli {
    /// JSON view config (surface size, drag sensitivity, pick tolerance, ...)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Surface width in pixels (overrides the config file)
    #[arg(long, global = true)]
    width: Option<f64>,

    /// Surface height in pixels (overrides the config file)
    #[arg(long, global = true)]
    height: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the initial view derived from a catalog
    Params {
        /// Catalog JSON, package directory, or HYG table (.csv / .csv.gz)
        catalog: PathBuf,
    },

    /// Set up a view and print what is on screen
    View {
        catalog: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        /// Number of stars to list
        #[arg(long, default_value_t = 20)]
        limit: usize,

        /// Include the coordinate grid
        #[arg(long)]
        grid: bool,

        /// Emphasize the named path and place its label
        #[arg(long)]
        highlight: Option<String>,
    },

    /// Find the star or path vertex nearest a pixel
    Pick {
        catalog: PathBuf,

        #[command(flatten)]
        view: ViewArgs,

        #[arg(long)]
        x: f64,

        #[arg(long)]
        y: f64,
    },

    /// Load any supported catalog source and write it as a JSON snapshot
    Convert { input: PathBuf, output: PathBuf },
}

#[derive(Args, Debug)]
struct ViewArgs {
    /// View center RA in degrees
    #[arg(long, allow_negative_numbers = true)]
    ra: Option<f64>,

    /// View center Dec in degrees
    #[arg(long, allow_negative_numbers = true)]
    dec: Option<f64>,

    /// Scale in degrees per pixel (clamped to the catalog's range)
    #[arg(long)]
    scale: Option<f64>,

    /// Wheel ticks to apply after positioning; positive zooms in
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    zoom_ticks: i32,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_view_config(path)?,
        None => ViewConfig::default(),
    };
    if let Some(w) = cli.width {
        config.surface_width = w;
    }
    if let Some(h) = cli.height {
        config.surface_height = h;
    }

    match cli.command {
        Command::Params { catalog } => cmd_params(&catalog, &config),
        Command::View {
            catalog,
            view,
            limit,
            grid,
            highlight,
        } => {
            config.show_graticule |= grid;
            cmd_view(&catalog, config, &view, limit, highlight.as_deref())
        }
        Command::Pick {
            catalog,
            view,
            x,
            y,
        } => cmd_pick(&catalog, config, &view, x, y),
        Command::Convert { input, output } => cmd_convert(&input, &output),
    }
}

fn load(path: &Path) -> Result<Catalog, Box<dyn std::error::Error>> {
    let catalog = formats::load_catalog(path)?;
    info!(
        path = %path.display(),
        stars = catalog.len(),
        paths = catalog.paths().len(),
        "catalog loaded"
    );
    Ok(catalog)
}

fn cmd_params(path: &Path, config: &ViewConfig) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load(path)?;
    let (w, h) = config.surface();
    let params = calculate_view_params(&catalog, w, h);
    print_json(&ParamsReport::new(&catalog, &params))
}

fn position(session: &mut ViewSession<'_>, view: &ViewArgs) {
    let vp = session.viewport_mut();
    if let Some(scale) = view.scale {
        vp.set_scale(scale);
    }
    if view.ra.is_some() || view.dec.is_some() {
        let ra = view.ra.unwrap_or(vp.center_ra());
        let dec = view.dec.unwrap_or(vp.center_dec());
        vp.set_center(ra, dec);
    }
    if view.zoom_ticks != 0 {
        vp.wheel(view.zoom_ticks);
    }
}

fn cmd_view(
    path: &Path,
    config: ViewConfig,
    view: &ViewArgs,
    limit: usize,
    highlight: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load(path)?;
    let mut session = ViewSession::new(&catalog, config);
    position(&mut session, view);
    if let Some(name) = highlight {
        if !session.highlight_path(name) {
            return Err(format!("no path named {name:?}").into());
        }
    }

    let frame = session.frame();
    print_json(&FrameReport::new(&catalog, session.viewport(), &frame, limit))
}

fn cmd_pick(
    path: &Path,
    config: ViewConfig,
    view: &ViewArgs,
    x: f64,
    y: f64,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load(path)?;
    let mut session = ViewSession::new(&catalog, config);
    position(&mut session, view);

    let hit = session.pick(x, y);
    print_json(&PickReport::new(&catalog, hit.as_ref()))
}

fn cmd_convert(input: &Path, output: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = load(input)?;
    formats::save_catalog_json(&catalog, output)?;
    info!(output = %output.display(), "catalog written");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
