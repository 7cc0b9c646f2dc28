//! Quests, milestones, daily challenges and the skill tree.
use crate::buffs::add_buff;
use crate::content::{ChallengeDef, Condition, ConditionKind, Content, Reward};
use crate::intent::IntentError;
use crate::state::{ActiveChallenge, Buff, GameState};

const CHALLENGE_TIER_TWO_DAY: i32 = 5;
const CHALLENGE_TIER_THREE_DAY: i32 = 10;

/// Current value of the counter a condition watches.
#[must_use]
pub fn condition_value(state: &GameState, kind: ConditionKind) -> i32 {
    match kind {
        ConditionKind::Kills => state.counters.kills,
        ConditionKind::MaxCombo => state.counters.max_combo,
        ConditionKind::DayReached => state.day,
        ConditionKind::Gold => state.gold,
        ConditionKind::StructuresBuilt => state.counters.structures_built,
        ConditionKind::TilesDiscovered => state.counters.tiles_discovered,
        ConditionKind::BossesDefeated => state.counters.bosses_defeated,
        ConditionKind::WordsTyped => state.counters.words_typed,
    }
}

#[must_use]
pub fn condition_met(state: &GameState, condition: &Condition) -> bool {
    condition_value(state, condition.kind) >= condition.target
}

/// Grant a reward and describe what was given.
pub fn apply_reward(state: &mut GameState, reward: &Reward) -> String {
    let mut parts = Vec::new();
    if !reward.resources.is_empty() {
        state.grant(&reward.resources);
        parts.push(reward.resources.to_string());
    }
    if reward.skill_points > 0 {
        state.skill_points += reward.skill_points;
        parts.push(format!("{} skill point(s)", reward.skill_points));
    }
    if let Some(grant) = &reward.buff {
        add_buff(
            state,
            Buff {
                id: grant.id.clone(),
                remaining_days: grant.days,
                effects: grant.effects.clone(),
            },
        );
        parts.push(format!("{} for {} days", grant.id, grant.days));
    }
    if parts.is_empty() {
        "nothing".to_string()
    } else {
        parts.join(", ")
    }
}

/// Highest challenge tier offered on `day`.
#[must_use]
pub const fn challenge_tier(day: i32) -> i32 {
    if day < CHALLENGE_TIER_TWO_DAY {
        1
    } else if day < CHALLENGE_TIER_THREE_DAY {
        2
    } else {
        3
    }
}

fn challenge_progress(state: &GameState, def: &ChallengeDef, baseline: i32) -> i32 {
    let value = condition_value(state, def.condition.kind);
    if def.condition.kind.is_cumulative() {
        value - baseline
    } else {
        value
    }
}

/// Complete every quest, milestone and the daily challenge whose condition holds.
pub fn evaluate_progress(state: &mut GameState, content: &Content) -> Vec<String> {
    let mut events = Vec::new();

    for quest in &content.progression.quests {
        if !state.completed_quests.contains(&quest.id) && condition_met(state, &quest.condition) {
            state.completed_quests.insert(quest.id.clone());
            let reward = apply_reward(state, &quest.reward);
            events.push(format!("Quest complete: {} ({reward})", quest.name));
        }
    }
    for milestone in &content.progression.milestones {
        if !state.completed_milestones.contains(&milestone.id)
            && condition_met(state, &milestone.condition)
        {
            state.completed_milestones.insert(milestone.id.clone());
            let reward = apply_reward(state, &milestone.reward);
            events.push(format!("Milestone reached: {} ({reward})", milestone.name));
        }
    }

    if let Some(active) = state.daily_challenge.clone()
        && let Some(def) = content.challenge(&active.id)
        && challenge_progress(state, def, active.baseline) >= def.condition.target
    {
        state.daily_challenge = None;
        state.completed_challenges.insert(def.id.clone());
        let reward = apply_reward(state, &def.reward);
        events.push(format!("Challenge complete: {} ({reward})", def.name));
    }
    events
}

/// Offer a new daily challenge from the tiers unlocked by the current day.
pub fn roll_daily_challenge(state: &mut GameState, content: &Content) -> Vec<String> {
    let tier = challenge_tier(state.day);
    let eligible: Vec<&ChallengeDef> = content
        .progression
        .challenges
        .iter()
        .filter(|def| def.tier <= tier && !state.completed_challenges.contains(&def.id))
        .collect();
    let Some(def) = state.rng.choose(&eligible).copied() else {
        state.daily_challenge = None;
        return Vec::new();
    };
    let baseline = if def.condition.kind.is_cumulative() {
        condition_value(state, def.condition.kind)
    } else {
        0
    };
    state.daily_challenge = Some(ActiveChallenge {
        id: def.id.clone(),
        baseline,
    });
    vec![format!("Daily challenge: {}", def.name)]
}

/// Complete a quest early when its condition already holds.
///
/// # Errors
///
/// Fails for unknown quests, completed quests and unmet conditions.
pub fn claim_quest(
    state: &mut GameState,
    content: &Content,
    id: &str,
) -> Result<Vec<String>, IntentError> {
    let quest = content
        .quest(id)
        .ok_or_else(|| IntentError::unknown("quest", id))?;
    if state.completed_quests.contains(&quest.id) {
        return Err(IntentError::rejected(format!("{} is already complete", quest.name)));
    }
    if !condition_met(state, &quest.condition) {
        let have = condition_value(state, quest.condition.kind);
        return Err(IntentError::rejected(format!(
            "{} is not finished ({have}/{})",
            quest.name, quest.condition.target
        )));
    }
    state.completed_quests.insert(quest.id.clone());
    let reward = apply_reward(state, &quest.reward);
    Ok(vec![format!("Quest complete: {} ({reward})", quest.name)])
}

/// Spend skill points on a skill whose prerequisite is unlocked.
///
/// # Errors
///
/// Fails for unknown or owned skills, missing prerequisites or points.
pub fn unlock_skill(
    state: &mut GameState,
    content: &Content,
    id: &str,
) -> Result<Vec<String>, IntentError> {
    let skill = content
        .skill(id)
        .ok_or_else(|| IntentError::unknown("skill", id))?;
    if state.unlocked_skills.contains(&skill.id) {
        return Err(IntentError::rejected(format!("{} is already unlocked", skill.name)));
    }
    if let Some(required) = &skill.requires
        && !state.unlocked_skills.contains(required)
    {
        return Err(IntentError::rejected(format!(
            "{} requires {required}",
            skill.name
        )));
    }
    if state.skill_points < skill.cost {
        return Err(IntentError::rejected(format!(
            "{} costs {} skill point(s), you have {}",
            skill.name, skill.cost, state.skill_points
        )));
    }
    state.skill_points -= skill.cost;
    state.unlocked_skills.insert(skill.id.clone());
    Ok(vec![format!("Learned {}", skill.name)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::new_game;

    fn fresh() -> GameState {
        new_game("progression", Content::builtin())
    }

    #[test]
    fn quest_completes_once() {
        let content = Content::builtin();
        let mut state = fresh();
        state.counters.structures_built = 1;
        let gold = state.gold;
        let events = evaluate_progress(&mut state, content);
        assert!(events.iter().any(|e| e.starts_with("Quest complete")));
        assert!(state.completed_quests.contains("first_tower"));
        assert!(state.gold > gold);
        let again = evaluate_progress(&mut state, content);
        assert!(!again.iter().any(|e| e.contains("First Defenses")));
    }

    #[test]
    fn claim_requires_condition() {
        let content = Content::builtin();
        let mut state = fresh();
        assert!(claim_quest(&mut state, content, "first_blood").is_err());
        assert!(claim_quest(&mut state, content, "no_such_quest").is_err());
        state.counters.kills = 1;
        claim_quest(&mut state, content, "first_blood").unwrap();
        assert!(claim_quest(&mut state, content, "first_blood").is_err());
    }

    #[test]
    fn challenge_counts_from_baseline() {
        let content = Content::builtin();
        let mut state = fresh();
        state.counters.kills = 40;
        state.daily_challenge = Some(ActiveChallenge {
            id: "slay_five".into(),
            baseline: 40,
        });
        state.counters.kills = 44;
        evaluate_progress(&mut state, content);
        assert!(state.daily_challenge.is_some());
        state.counters.kills = 45;
        let events = evaluate_progress(&mut state, content);
        assert!(events.iter().any(|e| e.starts_with("Challenge complete")));
        assert!(state.daily_challenge.is_none());
        assert!(state.completed_challenges.contains("slay_five"));
    }

    #[test]
    fn daily_roll_respects_tier() {
        let content = Content::builtin();
        let mut state = fresh();
        for _ in 0..20 {
            roll_daily_challenge(&mut state, content);
            let id = &state.daily_challenge.as_ref().unwrap().id;
            assert_eq!(content.challenge(id).unwrap().tier, 1);
        }
        assert_eq!(challenge_tier(5), 2);
        assert_eq!(challenge_tier(12), 3);
    }

    #[test]
    fn skills_need_points_and_prerequisites() {
        let content = Content::builtin();
        let mut state = fresh();
        assert!(unlock_skill(&mut state, content, "sharp_eye").is_err());
        state.skill_points = 5;
        assert!(unlock_skill(&mut state, content, "steady_hands").is_err());
        unlock_skill(&mut state, content, "sharp_eye").unwrap();
        unlock_skill(&mut state, content, "steady_hands").unwrap();
        assert!(unlock_skill(&mut state, content, "sharp_eye").is_err());
        assert!(state.skill_points < 5);
    }

    #[test]
    fn reward_buff_replaces_same_id() {
        let mut state = fresh();
        let reward = Reward {
            buff: Some(crate::content::BuffGrant {
                id: "rallied".into(),
                days: 3,
                effects: std::collections::BTreeMap::new(),
            }),
            ..Reward::default()
        };
        apply_reward(&mut state, &reward);
        apply_reward(&mut state, &reward);
        assert_eq!(state.buffs.len(), 1);
        assert_eq!(state.buffs[0].remaining_days, 3);
    }
}
