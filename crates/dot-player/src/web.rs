use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{Document, HtmlAudioElement, HtmlElement, Request, RequestInit, Response};

use crate::app::PlayerApp;
use crate::controller::PlaybackController;
use crate::error::DeleteError;
use crate::media::{known_duration, MediaElement};
use crate::page;
use crate::playlist::Track;
use crate::store::{delete_url, parse_delete_response, DeleteOutcome, SongStore};

const CANVAS_ID: &str = "dot-player-canvas";
const AUDIO_ID: &str = "audio-player";

/// The page's `<audio>` element.
pub struct WebAudio {
    element: HtmlAudioElement,
}

impl WebAudio {
    /// Reuses `#audio-player` or appends a hidden one to the body.
    fn attach(document: &Document) -> Result<Self, JsValue> {
        if let Some(el) = document.get_element_by_id(AUDIO_ID) {
            if let Ok(element) = el.dyn_into::<HtmlAudioElement>() {
                return Ok(Self { element });
            }
        }

        let element = document
            .create_element("audio")?
            .dyn_into::<HtmlAudioElement>()
            .map_err(JsValue::from)?;
        element.set_id(AUDIO_ID);
        element.style().set_property("display", "none")?;
        if let Some(body) = document.body() {
            body.append_child(&element)?;
        }
        Ok(Self { element })
    }
}

impl MediaElement for WebAudio {
    fn set_source(&mut self, url: &str) {
        self.element.set_src(url);
        self.element.load();
    }

    fn play(&mut self) {
        // Autoplay policies may reject; the next tick picks up the real state
        if let Ok(promise) = self.element.play() {
            spawn_local(async move {
                if let Err(err) = JsFuture::from(promise).await {
                    log::warn!("Playback was refused: {err:?}");
                }
            });
        }
    }

    fn pause(&mut self) {
        if let Err(err) = self.element.pause() {
            log::warn!("Failed to pause: {err:?}");
        }
    }

    fn is_paused(&self) -> bool {
        self.element.paused()
    }

    fn current_time(&self) -> f64 {
        self.element.current_time()
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.element.set_current_time(seconds);
    }

    fn duration(&self) -> Option<f64> {
        known_duration(self.element.duration())
    }

    fn set_volume(&mut self, fraction: f64) {
        self.element.set_volume(fraction.clamp(0.0, 1.0));
    }

    fn has_ended(&self) -> bool {
        self.element.ended()
    }
}

/// Deletes songs with `fetch`; completions queue up until the next frame.
pub struct WebSongStore {
    endpoint: String,
    finished: Rc<RefCell<Vec<DeleteOutcome>>>,
}

impl WebSongStore {
    fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            finished: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

async fn post(url: &str) -> Result<(), DeleteError> {
    let transport = |err: JsValue| DeleteError::Transport(format!("{err:?}"));

    let window = web_sys::window().ok_or_else(|| DeleteError::Transport("no window".to_string()))?;
    let opts = RequestInit::new();
    opts.set_method("POST");
    let request = Request::new_with_str_and_init(url, &opts).map_err(transport)?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(transport)?
        .dyn_into()
        .map_err(transport)?;
    let body = JsFuture::from(response.text().map_err(transport)?)
        .await
        .map_err(transport)?
        .as_string()
        .unwrap_or_default();

    parse_delete_response(&body)
}

impl SongStore for WebSongStore {
    fn delete_song(&mut self, song_id: &str) {
        let url = delete_url("", &self.endpoint, song_id);
        let song_id = song_id.to_string();
        let finished = self.finished.clone();

        spawn_local(async move {
            let result = post(&url).await;
            finished.borrow_mut().push(DeleteOutcome { song_id, result });
        });
    }

    fn drain_finished(&mut self) -> Vec<DeleteOutcome> {
        std::mem::take(&mut *self.finished.borrow_mut())
    }
}

fn element_text(document: &Document, id: &str) -> Option<String> {
    document.get_element_by_id(id)?.text_content()
}

/// Tracks from the `data-*` attributes of `#playlist li`.
fn read_tracks(document: &Document) -> Vec<Track> {
    let Ok(items) = document.query_selector_all("#playlist li") else {
        return Vec::new();
    };

    (0..items.length())
        .filter_map(|i| {
            let item = items.item(i)?.dyn_into::<HtmlElement>().ok()?;
            let data = item.dataset();
            page::track_from_dataset(i, |key| data.get(key))
        })
        .collect()
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    eframe::WebLogger::init(log::LevelFilter::Debug).ok();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        return Ok(());
    };
    let Some(canvas) = document
        .get_element_by_id(CANVAS_ID)
        .and_then(|el| el.dyn_into::<web_sys::HtmlCanvasElement>().ok())
    else {
        log::error!("No <canvas id=\"{CANVAS_ID}\"> on the page, player stays inactive");
        return Ok(());
    };

    let config = page::config_or_default(element_text(&document, "player-config").as_deref());
    let font = page::font_or_builtin(element_text(&document, "dot-font-data").as_deref());
    let tracks = read_tracks(&document);
    log::info!("Loaded {} tracks from the page", tracks.len());

    let media = WebAudio::attach(&document)?;
    let store = WebSongStore::new(&config.delete_endpoint);
    let controller = PlaybackController::new(media, store, tracks, &config);
    let app = PlayerApp::new(controller, font, &config);

    spawn_local(async move {
        let started = eframe::WebRunner::new()
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(|cc| {
                    egui_extras::install_image_loaders(&cc.egui_ctx);
                    Ok(Box::new(app))
                }),
            )
            .await;
        if let Err(err) = started {
            log::error!("Failed to start the player: {err:?}");
        }
    });

    Ok(())
}
