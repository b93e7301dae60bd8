//! Environmental event overlay.
//!
//! Each season at most one new event starts. Modifiers are then aggregated
//! from every active event, and only afterwards are durations advanced.

use std::collections::BTreeMap;

use anyhow::Result;
use rand::{seq::SliceRandom, Rng};
use tracing::info;

use crate::{
    catalog::{Catalog, EnvironmentalEvent, Species, TrophicLevel},
    engine::{SeasonContext, SeasonFrame, System},
    report::{EventOccurrence, EventPhase},
    rng::SystemRng,
    state::{ActiveEvent, GameState},
};

/// Combined effect of all active events for one season.
///
/// Climate deltas add up; population multipliers compound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventModifiers {
    pub temperature_delta: f64,
    pub precipitation_delta: f64,
    pub species: BTreeMap<String, f64>,
    pub trophic: BTreeMap<TrophicLevel, f64>,
}

impl EventModifiers {
    pub fn multiplier_for(&self, species: &Species) -> f64 {
        let by_species = self.species.get(&species.id).copied().unwrap_or(1.0);
        let by_level = self
            .trophic
            .get(&species.trophic_level)
            .copied()
            .unwrap_or(1.0);
        by_species * by_level
    }

    fn absorb(&mut self, event: &EnvironmentalEvent) {
        let effects = &event.effects;
        self.temperature_delta += effects.temperature_delta;
        self.precipitation_delta += effects.precipitation_delta;
        for (id, multiplier) in &effects.species_multipliers {
            *self.species.entry(id.clone()).or_insert(1.0) *= multiplier;
        }
        for (level, multiplier) in &effects.trophic_multipliers {
            *self.trophic.entry(*level).or_insert(1.0) *= multiplier;
        }
    }
}

pub fn aggregate_modifiers(active: &[ActiveEvent], catalog: &Catalog) -> EventModifiers {
    let mut modifiers = EventModifiers::default();
    for event in active.iter().filter_map(|a| catalog.event(&a.event_id)) {
        modifiers.absorb(event);
    }
    modifiers
}

/// Decrements every remaining duration and returns the events that ran out.
pub fn advance_events(active: &mut Vec<ActiveEvent>) -> Vec<ActiveEvent> {
    for event in active.iter_mut() {
        event.remaining = event.remaining.saturating_sub(1);
    }
    let (expired, running): (Vec<_>, Vec<_>) =
        active.drain(..).partition(|event| event.remaining == 0);
    *active = running;
    expired
}

fn draw_new_event<'c>(
    ctx: &SeasonContext<'c>,
    state: &GameState,
    rng: &mut SystemRng<'_>,
) -> Option<&'c EnvironmentalEvent> {
    let scale = ctx.config.event_probability_scale * state.mode.event_probability_factor();
    let mut triggered = Vec::new();
    for event in ctx.catalog.events() {
        // One draw per catalog entry keeps the stream aligned across seasons.
        let roll: f64 = rng.gen();
        let probability = (event.probability * scale).clamp(0.0, 1.0);
        if roll >= probability {
            continue;
        }
        let already_active = state
            .active_events
            .iter()
            .any(|active| active.event_id == event.id);
        if ctx.config.dedupe_events && already_active {
            continue;
        }
        triggered.push(event);
    }
    triggered.choose(rng).copied()
}

pub struct EventSystem;

impl EventSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EventSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EventSystem {
    fn name(&self) -> &str {
        "events"
    }

    fn run(
        &mut self,
        ctx: &SeasonContext,
        state: &mut GameState,
        frame: &mut SeasonFrame,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        if let Some(event) = draw_new_event(ctx, state, rng) {
            info!(
                season = ctx.season,
                event = %event.id,
                severity = event.severity,
                duration = event.duration,
                "Environmental event started"
            );
            state.active_events.push(ActiveEvent {
                event_id: event.id.clone(),
                remaining: event.duration.max(1),
                started_season: ctx.season,
            });
        }

        frame.modifiers = aggregate_modifiers(&state.active_events, ctx.catalog);

        let expired = advance_events(&mut state.active_events);
        let name_of = |id: &str| {
            ctx.catalog
                .event(id)
                .map(|event| event.name.clone())
                .unwrap_or_else(|| id.to_string())
        };
        for event in expired.iter().chain(state.active_events.iter()) {
            // At most one instance starts per season.
            let phase = if event.started_season == ctx.season {
                EventPhase::Started
            } else if event.remaining == 0 {
                EventPhase::Ended
            } else {
                EventPhase::Ongoing
            };
            frame.result.events.push(EventOccurrence {
                event_id: event.event_id.clone(),
                name: name_of(&event.event_id),
                phase,
                remaining: event.remaining,
            });
        }
        for event in &expired {
            info!(season = ctx.season, event = %event.event_id, "Environmental event ended");
        }
        Ok(())
    }
}
