use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use crate::dot_matrix::DotFont;
use crate::playlist::{Playlist, Track};
use crate::radial::{RadialControl, RadialEvent};
use crate::waveform::Waveform;

pub const BACKGROUND: Color32 = Color32::from_rgb(14, 14, 16);
pub const DOT_ON: Color32 = Color32::from_rgb(236, 234, 222);
pub const ACCENT: Color32 = Color32::from_rgb(255, 92, 56);

/// Opacity of an unlit dot in the timer and the knob rings.
const DOT_OFF_OPACITY: f32 = 0.1;
const TIMER_DOT_PITCH: f32 = 4.0;
const TIMER_GLYPH_GAP: f32 = 4.0;
const WAVEFORM_HEIGHT: f32 = 56.0;

/// User intent collected while drawing a frame.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayerAction {
    PlayPause,
    Next,
    Prev,
    Select(usize),
    Delete(String),
    ToggleShuffle,
    ToggleArt,
    Seek { offset_x: f32, width: f32 },
    DismissNotice,
}

fn dim(color: Color32) -> Color32 {
    color.gamma_multiply(DOT_OFF_OPACITY)
}

fn on_circle(centre: Pos2, angle_deg: f32, radius: f32) -> Pos2 {
    let angle = angle_deg.to_radians();
    centre + Vec2::new(angle.cos(), angle.sin()) * radius
}

/// Square album art: the dotted rendering or the original image.
/// Returns `true` when clicked.
pub fn album_art(ui: &mut egui::Ui, track: Option<&Track>, dotted: bool, size: f32) -> bool {
    let (rect, response) = ui.allocate_exact_size(Vec2::splat(size), Sense::click());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 6.0, BACKGROUND);

    if dotted {
        if let Some(art) = track.and_then(|t| t.art_dot_matrix.as_ref()) {
            let cols = art.cols.max(1) as f32;
            let rows = art.row_span().max(1.0);
            let cell = Vec2::new(rect.width() / cols, rect.height() / rows);
            let max_radius = cell.min_elem() * 0.45;
            for dot in art.dots() {
                let centre = rect.min + Vec2::new(dot.x * rect.width(), dot.y * rect.height()) + cell / 2.0;
                painter.circle_filled(centre, max_radius * dot.scale, DOT_ON);
            }
        }
    } else if let Some(url) = track.and_then(|t| t.art_original_url.as_deref()) {
        egui::Image::new(url).corner_radius(6.0).paint_at(ui, rect);
    }

    response.clicked()
}

/// `MM:SS` drawn with the dot-matrix font.
pub fn timer(ui: &mut egui::Ui, font: &DotFont, text: &str) {
    let glyphs = font.render(text);
    let rows = font.rows().max(1);
    let width = glyphs
        .iter()
        .map(|g| g.cols as f32 * TIMER_DOT_PITCH + TIMER_GLYPH_GAP)
        .sum::<f32>();
    let height = rows as f32 * TIMER_DOT_PITCH;
    let (rect, _) = ui.allocate_exact_size(Vec2::new(width.max(1.0), height), Sense::hover());
    let painter = ui.painter_at(rect);

    let mut x = rect.left();
    for glyph in &glyphs {
        for row in 0..glyph.rows() {
            for col in 0..glyph.cols {
                let centre = Pos2::new(
                    x + (col as f32 + 0.5) * TIMER_DOT_PITCH,
                    rect.top() + (row as f32 + 0.5) * TIMER_DOT_PITCH,
                );
                let color = if glyph.is_lit(row, col) { DOT_ON } else { dim(DOT_ON) };
                painter.circle_filled(centre, TIMER_DOT_PITCH * 0.4, color);
            }
        }
        x += glyph.cols as f32 * TIMER_DOT_PITCH + TIMER_GLYPH_GAP;
    }
}

/// Fake waveform with the played part highlighted. A click yields a seek.
pub fn waveform(ui: &mut egui::Ui, waveform: &Waveform, progress: f32) -> Option<PlayerAction> {
    let size = Vec2::new(ui.available_width(), WAVEFORM_HEIGHT);
    let (rect, response) = ui.allocate_exact_size(size, Sense::click());
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 4.0, BACKGROUND);

    let bars = waveform.bars();
    if !bars.is_empty() {
        let pitch = rect.width() / bars.len() as f32;
        let played_until = rect.left() + rect.width() * progress.clamp(0.0, 1.0);
        for (i, &height) in bars.iter().enumerate() {
            let left = rect.left() + i as f32 * pitch;
            let bar_height = rect.height() * height;
            let bar = Rect::from_min_max(
                Pos2::new(left + pitch * 0.2, rect.center().y - bar_height / 2.0),
                Pos2::new(left + pitch * 0.8, rect.center().y + bar_height / 2.0),
            );
            let color = if left + pitch / 2.0 <= played_until { ACCENT } else { dim(DOT_ON).gamma_multiply(4.0) };
            painter.rect_filled(bar, 1.0, color);
        }
        painter.line_segment(
            [Pos2::new(played_until, rect.top()), Pos2::new(played_until, rect.bottom())],
            Stroke::new(1.5, DOT_ON),
        );
    }

    if response.clicked() {
        let pos = response.interact_pointer_pos()?;
        return Some(PlayerAction::Seek {
            offset_x: pos.x - rect.left(),
            width: rect.width(),
        });
    }
    None
}

/// Prev / play-pause / next / shuffle row.
pub fn transport(ui: &mut egui::Ui, play_label: &str, shuffle: bool) -> Option<PlayerAction> {
    let mut action = None;
    ui.horizontal(|ui| {
        if ui.button("PREV").clicked() {
            action = Some(PlayerAction::Prev);
        }
        if ui.button(play_label).clicked() {
            action = Some(PlayerAction::PlayPause);
        }
        if ui.button("NEXT").clicked() {
            action = Some(PlayerAction::Next);
        }
        ui.separator();
        if ui.selectable_label(shuffle, "SHUFFLE").clicked() {
            action = Some(PlayerAction::ToggleShuffle);
        }
    });
    action
}

/// Jog wheel with its dot ring. Emits press and move events; releases are
/// global and handled by the caller.
pub fn knob(ui: &mut egui::Ui, control: &RadialControl, is_active: bool) -> Vec<RadialEvent> {
    let radius = control.radius();
    let ring_radius = radius + 9.0;
    let size = Vec2::new(ring_radius * 2.0 + 8.0, ring_radius * 2.0 + 24.0);
    let (rect, _) = ui.allocate_exact_size(size, Sense::click_and_drag());
    let centre = Pos2::new(rect.center().x, rect.top() + ring_radius + 4.0);
    let painter = ui.painter_at(rect);

    for dot in control.ring() {
        let color = if dot.lit { ACCENT } else { dim(DOT_ON) };
        painter.circle_filled(on_circle(centre, dot.angle, ring_radius), 2.0, color);
    }
    painter.circle_filled(centre, radius, BACKGROUND);
    painter.circle_stroke(centre, radius, Stroke::new(1.0, dim(DOT_ON).gamma_multiply(3.0)));
    let indicator_color = if is_active { ACCENT } else { DOT_ON };
    painter.circle_filled(centre + control.indicator_offset(), 5.0, indicator_color);
    painter.text(
        centre,
        Align2::CENTER_CENTER,
        control.value().to_string(),
        FontId::monospace(14.0),
        DOT_ON,
    );
    painter.text(
        Pos2::new(centre.x, rect.bottom() - 8.0),
        Align2::CENTER_CENTER,
        control.id().label(),
        FontId::monospace(10.0),
        dim(DOT_ON).gamma_multiply(6.0),
    );

    let mut events = Vec::new();
    let (pressed, pointer) = ui.input(|i| (i.pointer.primary_pressed(), i.pointer.latest_pos()));
    if let Some(pos) = pointer {
        if pressed && rect.contains(pos) {
            events.push(RadialEvent::Pressed(control.id(), pos - centre));
        }
        if is_active {
            events.push(RadialEvent::Moved(control.id(), pos - centre));
        }
    }
    events
}

/// Track list with the active entry highlighted and a delete button per row.
pub fn playlist(
    ui: &mut egui::Ui,
    playlist: &Playlist,
    is_playing: bool,
    is_delete_pending: impl Fn(&str) -> bool,
) -> Option<PlayerAction> {
    let mut action = None;
    ui.label(format!("Tracks ({}):", playlist.len()));
    if playlist.is_empty() {
        ui.colored_label(Color32::GRAY, "No tracks");
        return None;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        for (idx, track) in playlist.tracks().iter().enumerate() {
            let is_current = playlist.current_index() == Some(idx);
            let bg = if is_current { ACCENT.gamma_multiply(0.15) } else { Color32::TRANSPARENT };
            egui::Frame::group(ui.style()).fill(bg).inner_margin(4.0).show(ui, |ui| {
                ui.horizontal(|ui| {
                    if is_current && is_playing {
                        ui.label("▶");
                    } else {
                        ui.label(format!("{}.", idx + 1));
                    }
                    let text = format!("{} - {}", track.title, track.artist);
                    let label = egui::Label::new(text).sense(Sense::click());
                    if ui.add(label).clicked() {
                        action = Some(PlayerAction::Select(idx));
                    }
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if is_delete_pending(&track.id) {
                            ui.spinner();
                        } else if ui.small_button("✕").on_hover_text("Delete song").clicked() {
                            action = Some(PlayerAction::Delete(track.id.clone()));
                        }
                    });
                });
            });
        }
    });
    action
}

/// Error notice after a failed delete. Returns `true` when dismissed.
pub fn notice(ctx: &egui::Context, message: &str) -> bool {
    let mut dismissed = false;
    egui::Window::new("Delete failed")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(message);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    dismissed
}
