//! Fog-of-war: ambient sight around the player, the expanding sonar pulse,
//! and per-tick visibility decay.

use std::time::Duration;

use veil_core::{CellCoord, Event};

use crate::World;

/// Cells per second the pulse front travels.
pub(crate) const PULSE_SPEED: f32 = 30.0;
/// Visibility lost per second outside any light source.
pub(crate) const FADE_RATE: f32 = 2.0;
/// Radial thickness of the pulse ring.
pub(crate) const PULSE_RING_WIDTH: f32 = 2.0;
/// Pulse range as a multiple of the player's ambient vision radius.
pub(crate) const PULSE_RADIUS_FACTOR: f32 = 3.0;

/// An expanding sonar ring. Stays in place, deactivated, once it has run
/// its course; triggering a new pulse replaces it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pulse {
    pub(crate) origin: CellCoord,
    pub(crate) current_radius: f32,
    pub(crate) max_radius: f32,
    pub(crate) active: bool,
}

impl Pulse {
    /// Cell the pulse expands from.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Current radius of the expanding front, in cells.
    #[must_use]
    pub const fn current_radius(&self) -> f32 {
        self.current_radius
    }

    /// Radius at which the pulse stops expanding.
    #[must_use]
    pub const fn max_radius(&self) -> f32 {
        self.max_radius
    }

    /// Whether the front is still expanding.
    #[must_use]
    pub const fn active(&self) -> bool {
        self.active
    }
}

/// Replaces any active pulse with a fresh one centred on the player.
pub(crate) fn trigger_pulse(world: &mut World, out_events: &mut Vec<Event>) {
    let Some(player) = world.player.as_ref() else {
        return;
    };
    let origin = player.cell;
    let max_radius = PULSE_RADIUS_FACTOR * player.vision_radius;
    world.pulse = Some(Pulse {
        origin,
        current_radius: 0.0,
        max_radius,
        active: true,
    });
    out_events.push(Event::PulseTriggered { origin, max_radius });
}

/// Advances the pulse front and reconciles every cell's visibility for one
/// tick: pulse-ring reveal, ambient player light, then decay.
pub(crate) fn update(world: &mut World, dt: Duration, out_events: &mut Vec<Event>) {
    let Some((player, vision_radius)) = world
        .player
        .as_ref()
        .map(|player| (player.cell, player.vision_radius))
    else {
        return;
    };
    let dt_seconds = dt.as_secs_f32();

    // A ring computed this tick exempts its cells from decay even when the
    // pulse deactivates mid-tick.
    let mut ring: Option<(CellCoord, f32, f32)> = None;
    if let Some(pulse) = world.pulse.as_mut() {
        if pulse.active {
            pulse.current_radius += PULSE_SPEED * dt_seconds;
            if pulse.current_radius >= pulse.max_radius {
                pulse.active = false;
                out_events.push(Event::PulseFaded);
            }
            let outer = pulse.current_radius;
            let inner = (outer - PULSE_RING_WIDTH).max(0.0);
            ring = Some((pulse.origin, inner, outer));
        }
    }

    for y in 0..world.cells.rows() {
        for x in 0..world.cells.columns() {
            let coord = CellCoord::new(x, y);
            let in_ring = ring.is_some_and(|(origin, inner, outer)| {
                let distance = coord.euclidean_distance(origin);
                distance >= inner && distance <= outer
            });
            let player_distance = coord.euclidean_distance(player);
            let Some(cell) = world.cells.cell_mut(coord) else {
                continue;
            };
            if in_ring {
                cell.set_visibility(1.0);
                cell.mark_discovered();
            }
            if vision_radius > 0.0 && player_distance <= vision_radius {
                let brightness = 1.0 - 0.5 * (player_distance / vision_radius);
                if brightness > cell.visibility() {
                    cell.set_visibility(brightness);
                }
                cell.mark_discovered();
            } else if !in_ring && cell.visibility() > 0.0 {
                cell.set_visibility(cell.visibility() - FADE_RATE * dt_seconds);
            }
        }
    }
}
