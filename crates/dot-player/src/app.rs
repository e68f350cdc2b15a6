use std::time::Duration;

use eframe::egui::{self, Color32, RichText};

use crate::config::PlayerConfig;
use crate::controller::PlaybackController;
use crate::dot_matrix::DotFont;
use crate::media::MediaElement;
use crate::radial::{KnobId, RadialControl, RadialEvent, RadialGroup};
use crate::store::SongStore;
use crate::ui::{self, PlayerAction};

/// How often the media position is sampled when nothing else repaints.
const TICK_INTERVAL: Duration = Duration::from_millis(250);
const ART_SIZE: f32 = 240.0;

/// The player widget as an eframe application.
pub struct PlayerApp<M: MediaElement, S: SongStore> {
    controller: PlaybackController<M, S>,
    knobs: RadialGroup,
    font: DotFont,
}

impl<M: MediaElement, S: SongStore> PlayerApp<M, S> {
    pub fn new(controller: PlaybackController<M, S>, font: DotFont, config: &PlayerConfig) -> Self {
        let knobs = RadialGroup::new(vec![
            RadialControl::new(KnobId::Volume, controller.volume(), config.knob_radius, config.ring_dots),
            RadialControl::new(KnobId::Bass, controller.bass(), config.knob_radius, config.ring_dots),
        ]);
        Self {
            controller,
            knobs,
            font,
        }
    }

    pub fn controller(&self) -> &PlaybackController<M, S> {
        &self.controller
    }

    pub fn knobs(&self) -> &RadialGroup {
        &self.knobs
    }

    pub fn apply(&mut self, action: PlayerAction) {
        match action {
            PlayerAction::PlayPause => self.controller.play_pause(),
            PlayerAction::Next => self.controller.next(),
            PlayerAction::Prev => self.controller.prev(),
            PlayerAction::Select(index) => self.controller.select_track(index),
            PlayerAction::Delete(song_id) => {
                self.controller.delete_track(&song_id);
            }
            PlayerAction::ToggleShuffle => self.controller.toggle_shuffle(),
            PlayerAction::ToggleArt => self.controller.toggle_album_art(),
            PlayerAction::Seek { offset_x, width } => self.controller.seek(offset_x, width),
            PlayerAction::DismissNotice => self.controller.dismiss_notice(),
        }
    }

    pub fn handle_knob_event(&mut self, event: RadialEvent) {
        match self.knobs.handle_event(event) {
            Some((KnobId::Volume, value)) => self.controller.set_volume(value),
            Some((KnobId::Bass, value)) => self.controller.set_bass(value),
            None => {}
        }
    }

    fn draw_player(&self, ui: &mut egui::Ui, actions: &mut Vec<PlayerAction>, knob_events: &mut Vec<RadialEvent>) {
        let track = self.controller.current_track();

        ui.horizontal(|ui| {
            if ui::album_art(ui, track, self.controller.is_dotted_art_visible(), ART_SIZE) {
                actions.push(PlayerAction::ToggleArt);
            }
            ui.vertical(|ui| {
                match track {
                    Some(track) => {
                        ui.label(RichText::new(&track.title).size(20.0).color(ui::DOT_ON));
                        ui.label(RichText::new(&track.artist).color(Color32::GRAY));
                    }
                    None => {
                        ui.colored_label(Color32::GRAY, "No track selected");
                    }
                }
                ui.add_space(12.0);
                ui::timer(ui, &self.font, self.controller.elapsed_label());
            });
        });

        ui.add_space(8.0);
        if let Some(seek) = ui::waveform(ui, self.controller.waveform(), self.controller.progress()) {
            actions.push(seek);
        }
        ui.add_space(8.0);
        if let Some(action) = ui::transport(ui, self.controller.play_label(), self.controller.is_shuffle()) {
            actions.push(action);
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            for control in self.knobs.controls() {
                let is_active = self.knobs.active() == Some(control.id());
                knob_events.extend(ui::knob(ui, control, is_active));
            }
        });
    }
}

impl<M: MediaElement, S: SongStore> eframe::App for PlayerApp<M, S> {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.controller.tick();
        ctx.request_repaint_after(TICK_INTERVAL);

        let mut actions = Vec::new();
        let mut knob_events = Vec::new();

        egui::SidePanel::right("playlist_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                let action = ui::playlist(
                    ui,
                    self.controller.playlist(),
                    self.controller.is_playing(),
                    |id| self.controller.is_delete_pending(id),
                );
                actions.extend(action);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            self.draw_player(ui, &mut actions, &mut knob_events);
        });

        if let Some(message) = self.controller.notice() {
            if ui::notice(ctx, message) {
                actions.push(PlayerAction::DismissNotice);
            }
        }

        // A release anywhere frees the knob being dragged
        if ctx.input(|i| i.pointer.any_released()) {
            knob_events.push(RadialEvent::Released);
        }
        if !knob_events.is_empty() {
            ctx.request_repaint();
        }
        for event in knob_events {
            self.handle_knob_event(event);
        }
        for action in actions {
            self.apply(action);
        }
    }
}
