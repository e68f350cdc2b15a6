//! Radial "jog wheel" control
//!
//! Maps a value in `0..=100` onto a 270° arc that starts at 135° (bottom
//! left) and runs clockwise over the top to 45° (bottom right). Angles are in
//! screen space: degrees, y pointing down, so positive angles turn clockwise.
//!
//! Interaction follows the press/move/release pattern:
//!
//! ```rust,ignore
//! let mut knobs = RadialGroup::new(vec![RadialControl::new(KnobId::Volume, 80, 34.0, 28)]);
//! knobs.handle_event(RadialEvent::Pressed(KnobId::Volume, offset_from_centre));
//! if let Some((id, value)) = knobs.handle_event(RadialEvent::Moved(KnobId::Volume, offset)) {
//!     // apply value
//! }
//! knobs.handle_event(RadialEvent::Released);
//! ```

use egui::Vec2;

pub const START_ANGLE_DEG: f32 = 135.0;
pub const ANGLE_RANGE_DEG: f32 = 270.0;
pub const MAX_VALUE: u8 = 100;

/// How close (in points) a press must land to the indicator to grab it.
const INDICATOR_HIT_RADIUS: f32 = 12.0;

/// The knobs the player shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KnobId {
    Volume,
    Bass,
}

impl KnobId {
    pub fn label(self) -> &'static str {
        match self {
            KnobId::Volume => "VOLUME",
            KnobId::Bass => "BASS",
        }
    }
}

/// Angle of `value` on the arc, in `[135, 405]` degrees.
pub fn value_to_angle(value: u8) -> f32 {
    START_ANGLE_DEG + f32::from(value.min(MAX_VALUE)) / f32::from(MAX_VALUE) * ANGLE_RANGE_DEG
}

/// Direction of a pointer offset from the knob centre, in `[0, 360)` degrees.
pub fn pointer_angle(offset: Vec2) -> f32 {
    offset.y.atan2(offset.x).to_degrees().rem_euclid(360.0)
}

/// Value for an absolute angle.
///
/// Angles in the dead zone snap to the endpoint of the half they fall in, so
/// the margins next to either end of the arc clamp to that end.
pub fn angle_to_value(angle_deg: f32) -> u8 {
    let relative = (angle_deg - START_ANGLE_DEG + 360.0).rem_euclid(360.0);
    let dead_zone_mid = ANGLE_RANGE_DEG + (360.0 - ANGLE_RANGE_DEG) / 2.0;

    let fraction = if relative <= ANGLE_RANGE_DEG {
        relative / ANGLE_RANGE_DEG
    } else if relative < dead_zone_mid {
        1.0
    } else {
        0.0
    };

    (fraction * f32::from(MAX_VALUE)).round() as u8
}

/// One dot of the fill ring around a knob.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingDot {
    pub angle: f32,
    pub lit: bool,
}

#[derive(Clone, Debug)]
pub struct RadialControl {
    id: KnobId,
    value: u8,
    radius: f32,
    ring_dots: usize,
}

impl RadialControl {
    pub fn new(id: KnobId, value: u8, radius: f32, ring_dots: usize) -> Self {
        Self {
            id,
            value: value.min(MAX_VALUE),
            radius,
            ring_dots,
        }
    }

    pub fn id(&self) -> KnobId {
        self.id
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn angle(&self) -> f32 {
        value_to_angle(self.value)
    }

    /// Indicator position relative to the knob centre.
    pub fn indicator_offset(&self) -> Vec2 {
        let angle = self.angle().to_radians();
        Vec2::new(angle.cos(), angle.sin()) * self.radius
    }

    pub fn hits_indicator(&self, offset: Vec2) -> bool {
        (offset - self.indicator_offset()).length() <= INDICATOR_HIT_RADIUS
    }

    /// Ring dots spread evenly over the arc; a dot is lit up to the current angle.
    pub fn ring(&self) -> impl Iterator<Item = RingDot> + '_ {
        let count = self.ring_dots;
        let current = self.angle();
        (0..count).map(move |i| {
            let angle = if count > 1 {
                START_ANGLE_DEG + ANGLE_RANGE_DEG * i as f32 / (count - 1) as f32
            } else {
                START_ANGLE_DEG
            };
            RingDot {
                angle,
                lit: angle <= current + 1e-3,
            }
        })
    }
}

/// Pointer events delivered to the knobs, offsets relative to the knob centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadialEvent {
    Pressed(KnobId, Vec2),
    Moved(KnobId, Vec2),
    Released,
}

/// All knobs of the player. At most one of them is being dragged.
#[derive(Clone, Debug, Default)]
pub struct RadialGroup {
    controls: Vec<RadialControl>,
    active: Option<KnobId>,
}

impl RadialGroup {
    pub fn new(controls: Vec<RadialControl>) -> Self {
        Self {
            controls,
            active: None,
        }
    }

    pub fn controls(&self) -> &[RadialControl] {
        &self.controls
    }

    pub fn control(&self, id: KnobId) -> Option<&RadialControl> {
        self.controls.iter().find(|c| c.id == id)
    }

    pub fn active(&self) -> Option<KnobId> {
        self.active
    }

    /// Returns the knob and its new value when a drag changed it.
    pub fn handle_event(&mut self, event: RadialEvent) -> Option<(KnobId, u8)> {
        match event {
            RadialEvent::Pressed(id, offset) => {
                if self.active.is_none() && self.control(id).is_some_and(|c| c.hits_indicator(offset)) {
                    self.active = Some(id);
                }
                None
            }
            RadialEvent::Released => {
                self.active = None;
                None
            }
            RadialEvent::Moved(id, offset) => {
                if self.active != Some(id) {
                    return None;
                }
                let control = self.controls.iter_mut().find(|c| c.id == id)?;
                let value = angle_to_value(pointer_angle(offset));
                if value == control.value {
                    return None;
                }
                control.value = value;
                Some((id, value))
            }
        }
    }
}
