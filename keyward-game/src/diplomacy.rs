//! Faction relations and trade agreements.
use crate::constants::{BREAK_RELATION_LOSS, GIFT_RELATION_GAIN, RELATION_MAX, RELATION_MIN};
use crate::content::Content;
use crate::intent::{DiplomacyAction, IntentError};
use crate::state::{GameState, ResourceBundle, ResourceKind};

#[must_use]
pub fn relation(state: &GameState, faction: &str) -> i32 {
    state.faction_relations.get(faction).copied().unwrap_or(0)
}

fn shift_relation(state: &mut GameState, faction: &str, delta: i32) -> i32 {
    let entry = state.faction_relations.entry(faction.to_string()).or_insert(0);
    *entry = (*entry + delta).clamp(RELATION_MIN, RELATION_MAX);
    *entry
}

/// Gift, sign or break an agreement with a faction.
///
/// # Errors
///
/// Fails for unknown factions, unaffordable gifts, low relations, or a
/// missing or duplicate agreement.
pub fn apply_diplomacy(
    state: &mut GameState,
    content: &Content,
    faction: &str,
    action: DiplomacyAction,
) -> Result<Vec<String>, IntentError> {
    if state.is_night() {
        return Err(IntentError::WrongPhase {
            action: "negotiate",
            phase: state.phase,
        });
    }
    let def = content
        .faction(faction)
        .ok_or_else(|| IntentError::unknown("faction", faction))?;
    match action {
        DiplomacyAction::Gift => {
            let cost = ResourceBundle {
                gold: def.gift_cost,
                ..ResourceBundle::default()
            };
            if !state.pay(&cost) {
                return Err(IntentError::Insufficient(cost));
            }
            let now = shift_relation(state, &def.id, GIFT_RELATION_GAIN);
            Ok(vec![format!("Sent a gift to the {} (relation {now})", def.name)])
        }
        DiplomacyAction::Agreement => {
            if state.agreements.contains(&def.id) {
                return Err(IntentError::rejected(format!(
                    "already allied with the {}",
                    def.name
                )));
            }
            let current = relation(state, &def.id);
            if current < def.agreement_threshold {
                return Err(IntentError::rejected(format!(
                    "the {} want relation {} (now {current})",
                    def.name, def.agreement_threshold
                )));
            }
            state.agreements.insert(def.id.clone());
            Ok(vec![format!(
                "Signed an agreement with the {} (+{} gold daily)",
                def.name, def.agreement_income
            )])
        }
        DiplomacyAction::Break => {
            if !state.agreements.remove(&def.id) {
                return Err(IntentError::rejected(format!(
                    "no agreement with the {}",
                    def.name
                )));
            }
            let now = shift_relation(state, &def.id, -BREAK_RELATION_LOSS);
            Ok(vec![format!(
                "Broke the agreement with the {} (relation {now})",
                def.name
            )])
        }
    }
}

/// Dawn income from every standing agreement.
pub fn collect_agreement_income(state: &mut GameState, content: &Content) -> Vec<String> {
    let income: i32 = state
        .agreements
        .iter()
        .filter_map(|id| content.faction(id))
        .map(|def| def.agreement_income)
        .sum();
    if income <= 0 {
        return Vec::new();
    }
    state.add_resource(ResourceKind::Gold, income);
    vec![format!("Allies send {income} gold")]
}
