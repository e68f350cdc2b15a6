mod http_store;
mod library;
mod rodio_media;

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use dot_player::dot_matrix::DotFont;
use dot_player::{PlaybackController, PlayerApp, PlayerConfig, PlayerError};
use eframe::NativeOptions;

use crate::http_store::HttpSongStore;
use crate::library::Library;
use crate::rodio_media::RodioMedia;

struct Args {
    library: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args() -> Result<Args, PlayerError> {
    let mut args = pico_args::Arguments::from_env();
    let parsed = Args {
        library: args
            .opt_value_from_str("--library")
            .map_err(|e| PlayerError::Args(e.to_string()))?
            .unwrap_or_else(|| PathBuf::from("library.json")),
        config: args
            .opt_value_from_str("--config")
            .map_err(|e| PlayerError::Args(e.to_string()))?,
    };
    let rest = args.finish();
    if !rest.is_empty() {
        return Err(PlayerError::Args(format!("unexpected arguments: {rest:?}")));
    }
    Ok(parsed)
}

fn load_config(path: Option<&PathBuf>) -> Result<PlayerConfig, PlayerError> {
    let Some(path) = path else {
        return Ok(PlayerConfig::default());
    };
    let raw = fs::read_to_string(path).map_err(|source| PlayerError::Io {
        path: path.clone(),
        source,
    })?;
    PlayerConfig::from_json(&raw)
}

fn main() -> Result<(), PlayerError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = parse_args()?;
    let config = load_config(args.config.as_ref())?;
    let library = Library::load(&args.library, config.art_dot_spacing)?;
    log::info!("Loaded {} tracks from {}", library.tracks.len(), args.library.display());

    let font = library.dot_font.unwrap_or_else(DotFont::builtin);
    let store = HttpSongStore::new(
        &config.server_url,
        &config.delete_endpoint,
        Duration::from_secs(config.request_timeout_secs),
    );
    let controller = PlaybackController::new(RodioMedia::new(), store, library.tracks, &config);
    let app = PlayerApp::new(controller, font, &config);

    eframe::run_native(
        "Dot Player",
        NativeOptions::default(),
        Box::new(|cc| {
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| PlayerError::Window(e.to_string()))
}
