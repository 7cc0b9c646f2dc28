//! Timed buffs plus the named-effect totals they share with skills and items.
use crate::content::Content;
use crate::state::{Buff, GameState};

pub const EFFECT_DAMAGE_MULTIPLIER: &str = "damage_multiplier";
pub const EFFECT_TYPING_DAMAGE: &str = "typing_damage";
pub const EFFECT_TOWER_DAMAGE: &str = "tower_damage";
pub const EFFECT_TOWER_SPEED: &str = "tower_speed";
pub const EFFECT_PRODUCTION: &str = "production_multiplier";
pub const EFFECT_GOLD_BONUS: &str = "gold_bonus";
pub const EFFECT_AP_BONUS: &str = "ap_bonus";
pub const EFFECT_HP_REGEN: &str = "hp_regen";

/// Add a buff, replacing any existing buff with the same id wholesale.
pub fn add_buff(state: &mut GameState, buff: Buff) {
    if let Some(existing) = state.buffs.iter_mut().find(|b| b.id == buff.id) {
        *existing = buff;
    } else {
        state.buffs.push(buff);
    }
}

/// Decay every buff by one day and remove those that reach zero.
///
/// Returns the ids of the expired buffs in their original order.
pub fn expire_buffs(state: &mut GameState) -> Vec<String> {
    let mut expired = Vec::new();
    for buff in &mut state.buffs {
        buff.remaining_days -= 1;
        if buff.remaining_days <= 0 {
            expired.push(buff.id.clone());
        }
    }
    state.buffs.retain(|buff| buff.remaining_days > 0);
    expired
}

/// Sum of one effect across active buffs.
#[must_use]
pub fn buff_total(state: &GameState, effect: &str) -> f64 {
    state
        .buffs
        .iter()
        .filter_map(|buff| buff.effects.get(effect))
        .sum()
}

/// Sum of one effect across buffs, unlocked skills and equipped items.
#[must_use]
pub fn effect_total(state: &GameState, content: &Content, effect: &str) -> f64 {
    let skills: f64 = state
        .unlocked_skills
        .iter()
        .filter_map(|id| content.skill(id))
        .filter_map(|skill| skill.effects.get(effect))
        .sum();
    let items: f64 = state
        .equipped
        .values()
        .filter_map(|id| content.item(id))
        .filter_map(|item| item.effects.get(effect))
        .sum();
    buff_total(state, effect) + skills + items
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn buff(id: &str, days: i32, effect: &str, value: f64) -> Buff {
        Buff {
            id: id.to_string(),
            remaining_days: days,
            effects: BTreeMap::from([(effect.to_string(), value)]),
        }
    }

    #[test]
    fn adding_same_id_replaces() {
        let mut state = GameState::default();
        add_buff(&mut state, buff("focus", 3, EFFECT_DAMAGE_MULTIPLIER, 0.5));
        add_buff(&mut state, buff("focus", 1, EFFECT_AP_BONUS, 1.0));
        assert_eq!(state.buffs.len(), 1);
        assert_eq!(state.buffs[0].remaining_days, 1);
        assert!(buff_total(&state, EFFECT_DAMAGE_MULTIPLIER).abs() < f64::EPSILON);
    }

    #[test]
    fn expire_removes_exactly_the_finished() {
        let mut state = GameState::default();
        add_buff(&mut state, buff("a", 1, EFFECT_AP_BONUS, 1.0));
        add_buff(&mut state, buff("b", 2, EFFECT_AP_BONUS, 1.0));
        add_buff(&mut state, buff("c", 1, EFFECT_AP_BONUS, 1.0));
        assert_eq!(expire_buffs(&mut state), vec!["a".to_string(), "c".to_string()]);
        assert_eq!(state.buffs.len(), 1);
        assert_eq!(state.buffs[0].remaining_days, 1);
        assert_eq!(expire_buffs(&mut state), vec!["b".to_string()]);
        assert!(expire_buffs(&mut state).is_empty());
    }

    #[test]
    fn totals_include_skills_and_items() {
        let content = Content::builtin();
        let mut state = GameState::default();
        add_buff(&mut state, buff("edge", 2, EFFECT_TYPING_DAMAGE, 1.0));
        state.unlocked_skills.insert("sharp_eye".into());
        state
            .equipped
            .insert(crate::content::ItemSlot::Weapon, "iron_blade".into());
        let total = effect_total(&state, content, EFFECT_TYPING_DAMAGE);
        assert!((total - 3.0).abs() < f64::EPSILON);
    }
}
