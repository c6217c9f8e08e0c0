pub mod config;
pub mod data;
pub mod encode;
pub mod hover;
pub mod projection;
pub mod render;
pub mod scale;
pub mod server;
pub mod types;

use anyhow::Result;
use clap::{Parser, Subcommand};
use projection::Mercator;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the ICU map and borough trend chart to SVG
    Generate {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Serve the generated charts plus the hover query API
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate { config } => {
            let app_config = config::AppConfig::load_or_default(config)?;

            // the two pipelines share no state; one failing must not stop
            // the other, and a failed pipeline renders nothing at all
            let (map_result, trend_result) = rayon::join(
                || run_map_pipeline(&app_config),
                || run_trend_pipeline(&app_config),
            );
            if let Err(err) = map_result {
                println!("Failed on {:?}", err);
            }
            if let Err(err) = trend_result {
                println!("Failed on {:?}", err);
            }

            render::write_output(&app_config.output.dir, render::INDEX_FILE, &render::render_index())?;
            println!("Generation complete!");
        }
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_or_default(config)?;

            // rebuild the map marks so the hover API can hit-test them
            println!("Loading data for hover API...");
            let hospitals = data::load_hospitals(&app_config.input.hospitals_csv)?;
            let marks = encode::build_hospital_marks(
                &hospitals,
                &app_config.map,
                &map_projection(&app_config.map),
            );

            server::start_server(app_config, marks).await?;
        }
    }

    Ok(())
}

fn map_projection(map: &config::MapConfig) -> Mercator {
    Mercator::new(
        map.center,
        map.projection_scale,
        (map.inner_width() / 2.0, map.inner_height() / 2.0),
    )
}

fn run_map_pipeline(app_config: &config::AppConfig) -> Result<()> {
    let boroughs = data::load_boroughs(&app_config.input.boroughs_geojson)?;
    let hospitals = data::load_hospitals(&app_config.input.hospitals_csv)?;

    let projection = map_projection(&app_config.map);
    let marks = encode::build_hospital_marks(&hospitals, &app_config.map, &projection);
    println!("Encoded {} hospital circles", marks.len());

    let svg = render::render_map(&app_config.map, &boroughs, &marks, &projection);
    render::write_output(&app_config.output.dir, render::MAP_FILE, &svg)
}

fn run_trend_pipeline(app_config: &config::AppConfig) -> Result<()> {
    let rows = data::load_borough_weeks(&app_config.input.borough_weeks_csv)?;

    let svg = render::render_trend(&app_config.trend, &rows);
    render::write_output(&app_config.output.dir, render::TREND_FILE, &svg)
}
