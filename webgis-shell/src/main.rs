//! Line-driven front end of the boundary viewer.
//!
//! ```shell
//! cargo run -p webgis-shell -- [config.json]
//! ```
//!
//! Commands are read from stdin one per line (`help` lists them); the status line is printed
//! after every command once all the requests it caused have completed. Set `WEBGIS_MAP_KEY` to
//! pass the commercial map key without writing it into the config file.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use webgis::config::{ViewerConfig, MAP_KEY_ENV};
use webgis::platform::NativePlatformService;
use webgis::viewer::{ActiveSurface, Viewer, ViewerEvent};

mod command;

use command::Command;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = match std::env::args().nth(1) {
        Some(path) => ViewerConfig::from_json_file(&path)
            .with_context(|| format!("failed to read config from {path}"))?,
        None => ViewerConfig::default(),
    };
    if let Ok(key) = std::env::var(MAP_KEY_ENV) {
        config.commercial.credentials = key;
    }

    let platform = Arc::new(NativePlatformService::new(
        &config.user_agent,
        &config.data_dir,
    )?);
    let mut surface_size = config.surface_size();
    let mut viewer = Viewer::with_widget(config, platform, None)?;
    viewer.start().await;
    log::info!("Viewer started, type `help` for the list of commands");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match command::parse(&line, surface_size) {
            Ok(command) => command,
            Err(err) => {
                eprintln!("{err:#}");
                continue;
            }
        };

        match command {
            Command::Events(events) => {
                for event in events {
                    if let ViewerEvent::Resize(size) = &event {
                        surface_size = *size;
                    }
                    viewer.handle_event(event);
                }
                viewer.run_until_idle().await;
                println!("status: {}", viewer.status().text());
            }
            Command::Status => print_state(&viewer),
            Command::Help => println!("{}", command::HELP),
            Command::Quit => break,
        }
    }

    Ok(())
}

fn print_state(viewer: &Viewer) {
    let controls = viewer.controls();
    let viewport = match viewer.active_surface() {
        ActiveSurface::Primary => viewer.primary().viewport(),
        ActiveSurface::Secondary => Some(viewer.secondary().view()),
    };

    println!("status: {}", viewer.status().text());
    println!(
        "surface: {:?}, base: {}, provinces: {}, counties: {}",
        viewer.active_surface(),
        controls.base,
        controls.provinces,
        controls.counties
    );
    if let Some(viewport) = viewport {
        println!(
            "view: lat {:.4}, lon {:.4}, zoom {}",
            viewport.center.lat(),
            viewport.center.lon(),
            viewport.zoom
        );
    }
    if viewer.active_surface() == ActiveSurface::Primary {
        for attribution in viewer.primary().attributions() {
            println!("{attribution}");
        }
    }
}
