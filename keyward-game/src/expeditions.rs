//! Multi-day expeditions that return with rolled loot.
use crate::content::{Content, ExpeditionDef};
use crate::economy::require_day_action;
use crate::intent::IntentError;
use crate::numbers::floor_f64_to_i32;
use crate::rng::GameRng;
use crate::state::{Expedition, GameState, ResourceBundle};

const POOR_LOOT_ROLL: i32 = 15;
const RICH_LOOT_ROLL: i32 = 90;

/// Loot quality rolled when an expedition returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootQuality {
    Poor,
    Fair,
    Rich,
}

impl LootQuality {
    fn roll(rng: &mut GameRng) -> Self {
        match rng.roll_percent() {
            roll if roll <= POOR_LOOT_ROLL => Self::Poor,
            roll if roll > RICH_LOOT_ROLL => Self::Rich,
            _ => Self::Fair,
        }
    }

    #[must_use]
    pub const fn multiplier(self) -> f64 {
        match self {
            Self::Poor => 0.5,
            Self::Fair => 1.0,
            Self::Rich => 1.5,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Poor => "poor",
            Self::Fair => "fair",
            Self::Rich => "rich",
        }
    }
}

/// Send a party out for `def.days` days.
///
/// # Errors
///
/// Fails outside the day, without AP or food, or when the same expedition is out.
pub fn start_expedition(
    state: &mut GameState,
    content: &Content,
    id: &str,
) -> Result<Vec<String>, IntentError> {
    let def = content
        .expedition(id)
        .ok_or_else(|| IntentError::unknown("expedition", id))?;
    require_day_action(state, "start an expedition", def.ap_cost)?;
    if state.expeditions.iter().any(|exp| exp.kind == def.id) {
        return Err(IntentError::rejected(format!("the {} is already out", def.name)));
    }
    let cost = ResourceBundle {
        food: def.food_cost,
        ..ResourceBundle::default()
    };
    if !state.pay(&cost) {
        return Err(IntentError::Insufficient(cost));
    }
    state.ap -= def.ap_cost;
    let expedition_id = state.alloc_entity_id();
    state.expeditions.push(Expedition {
        id: expedition_id,
        kind: def.id.clone(),
        days_remaining: def.days,
    });
    Ok(vec![format!(
        "The {} sets out ({} days)",
        def.name, def.days
    )])
}

fn roll_rewards(rng: &mut GameRng, def: &ExpeditionDef) -> (LootQuality, ResourceBundle) {
    let quality = LootQuality::roll(rng);
    let mut loot = ResourceBundle::default();
    for (kind, range) in &def.rewards {
        let base = rng.roll_range(range.min, range.max);
        *loot.get_mut(*kind) = floor_f64_to_i32(f64::from(base) * quality.multiplier());
    }
    (quality, loot)
}

/// Count down every expedition and bring home the ones that finish.
pub fn advance_expeditions(state: &mut GameState, content: &Content) -> Vec<String> {
    let mut events = Vec::new();
    let mut returning = Vec::new();
    for expedition in &mut state.expeditions {
        expedition.days_remaining -= 1;
        if expedition.days_remaining <= 0 {
            returning.push(expedition.kind.clone());
        }
    }
    state.expeditions.retain(|exp| exp.days_remaining > 0);
    for kind in returning {
        let Some(def) = content.expedition(&kind) else {
            log::warn!("expedition {kind} has no definition; dropping it");
            continue;
        };
        let (quality, loot) = roll_rewards(&mut state.rng, def);
        state.grant(&loot);
        events.push(format!(
            "The {} returns with {} loot: {loot}",
            def.name,
            quality.as_str()
        ));
    }
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::new_game;

    #[test]
    fn expedition_costs_and_returns() {
        let content = Content::builtin();
        let mut state = new_game("expedition", content);
        state.resources.food = 100;
        state.ap = 10;
        let def = content.expedition("scouting_party").unwrap();
        start_expedition(&mut state, content, "scouting_party").unwrap();
        assert_eq!(state.resources.food, 100 - def.food_cost);
        assert_eq!(state.ap, 10 - def.ap_cost);
        assert!(start_expedition(&mut state, content, "scouting_party").is_err());
        let mut returned = Vec::new();
        for _ in 0..def.days {
            returned.extend(advance_expeditions(&mut state, content));
        }
        assert_eq!(returned.len(), 1);
        assert!(returned[0].contains("returns with"));
        assert!(state.expeditions.is_empty());
    }

    #[test]
    fn rewards_stay_in_scaled_range() {
        let content = Content::builtin();
        let def = content.expedition("mining_trip").unwrap();
        let mut rng = GameRng::from_seed_str("loot");
        for _ in 0..50 {
            let (_, loot) = roll_rewards(&mut rng, def);
            for (kind, range) in &def.rewards {
                let amount = loot.get(*kind);
                assert!(amount >= range.min / 2);
                assert!(f64::from(amount) <= f64::from(range.max) * 1.5);
            }
        }
    }

    #[test]
    fn night_blocks_departure() {
        let content = Content::builtin();
        let mut state = new_game("expedition", content);
        state.phase = crate::state::Phase::Night;
        assert!(matches!(
            start_expedition(&mut state, content, "trade_caravan"),
            Err(IntentError::WrongPhase { .. })
        ));
    }
}
