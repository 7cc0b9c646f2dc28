//! Day actions on the economy and the dawn tick.
use crate::buffs::{EFFECT_HP_REGEN, EFFECT_PRODUCTION, effect_total, expire_buffs};
use crate::constants::{
    BASE_GATHER_YIELD, BUILD_AP_COST, DAWN_HP_REGEN, DEMOLISH_REFUND_DIVISOR, GATHER_AP_COST,
    GOLD_TO_RESOURCE_RATE, RESOURCE_CAP_TABLE, RESOURCE_SWAP_RATE, RESOURCE_TO_GOLD_RATE,
    WORKER_BONUS_CAP, WORKER_BONUS_PER_CITIZEN,
};
use crate::content::Content;
use crate::diplomacy::collect_agreement_income;
use crate::expeditions::advance_expeditions;
use crate::intent::IntentError;
use crate::map::GridPos;
use crate::numbers::{floor_f64_to_i32, u64_to_f64};
use crate::progression::evaluate_progress;
use crate::state::{GameState, Phase, ResourceBundle, ResourceKind};
use crate::summons::dismiss_tower_summons;

const MARKET: &str = "market";
const CAPPED: [ResourceKind; 3] = [ResourceKind::Wood, ResourceKind::Stone, ResourceKind::Food];

/// Reject day actions at night, in an encounter, or without AP.
pub(crate) fn require_day_action(
    state: &GameState,
    action: &'static str,
    ap_cost: i32,
) -> Result<(), IntentError> {
    if state.phase != Phase::Day {
        return Err(IntentError::WrongPhase {
            action,
            phase: state.phase,
        });
    }
    if state.encounter.is_some() {
        return Err(IntentError::InEncounter(action));
    }
    if state.ap < ap_cost {
        return Err(IntentError::NotEnoughAp {
            needed: ap_cost,
            have: state.ap,
        });
    }
    Ok(())
}

/// `min(1 + 0.05 * citizens, 1.5)`.
#[must_use]
pub fn worker_bonus(citizens: i32) -> f64 {
    (1.0 + WORKER_BONUS_PER_CITIZEN * f64::from(citizens.max(0))).min(WORKER_BONUS_CAP)
}

/// Ceiling for wood, stone and food on the current day.
#[must_use]
pub fn resource_cap(state: &GameState, content: &Content) -> i32 {
    let base = RESOURCE_CAP_TABLE
        .iter()
        .find(|(below_day, _)| state.day < *below_day)
        .map_or(RESOURCE_CAP_TABLE[RESOURCE_CAP_TABLE.len() - 1].1, |(_, cap)| *cap);
    let bonus: i32 = state
        .structures
        .values()
        .filter_map(|id| content.building(id))
        .map(|def| def.cap_bonus)
        .sum();
    base + bonus
}

/// Silently trim stockpiles above the current cap.
pub fn apply_caps(state: &mut GameState, content: &Content) {
    let cap = resource_cap(state, content);
    for kind in CAPPED {
        let amount = state.amount(kind);
        if amount > cap {
            log::debug!("trimmed {} {kind} above cap {cap}", amount - cap);
            state.set_resource(kind, cap);
        }
    }
}

/// Gather a resource from an adjacent node or the surrounding land.
///
/// # Errors
///
/// Fails outside the day, during an encounter, or without AP.
pub fn gather(
    state: &mut GameState,
    content: &Content,
    resource: ResourceKind,
) -> Result<Vec<String>, IntentError> {
    require_day_action(state, "gather", GATHER_AP_COST)?;
    let player = state.player_pos;
    let node = state
        .resource_nodes
        .iter()
        .filter(|(index, node)| {
            node.cooldown_days == 0 && state.map.pos_of(**index).manhattan(player) <= 1
        })
        .find_map(|(index, node)| {
            content
                .resource_node(&node.kind)
                .filter(|def| def.resource == resource)
                .map(|def| (*index, def))
        });
    state.ap -= GATHER_AP_COST;
    let event = if let Some((index, def)) = node {
        state.add_resource(resource, def.amount);
        if let Some(node) = state.resource_nodes.get_mut(&index) {
            node.cooldown_days = def.regrow_days;
        }
        format!("Harvested {} {resource} from the {}", def.amount, def.name)
    } else {
        state.add_resource(resource, BASE_GATHER_YIELD);
        format!("Gathered {BASE_GATHER_YIELD} {resource}")
    };
    Ok(vec![event])
}

fn checked_tile(state: &GameState, x: i32, y: i32) -> Result<(GridPos, usize), IntentError> {
    let pos = GridPos::new(x, y);
    state
        .map
        .index_of(pos)
        .map(|index| (pos, index))
        .ok_or(IntentError::OutOfBounds { x, y })
}

/// Place a tower or building.
///
/// # Errors
///
/// Fails on unknown types, bad tiles, or missing AP or resources.
pub fn build(
    state: &mut GameState,
    content: &Content,
    structure: &str,
    x: i32,
    y: i32,
) -> Result<Vec<String>, IntentError> {
    require_day_action(state, "build", BUILD_AP_COST)?;
    let cost = content
        .structure_cost(structure)
        .ok_or_else(|| IntentError::unknown("structure", structure))?;
    let (pos, index) = checked_tile(state, x, y)?;
    if !state.map.is_discovered(pos) {
        return Err(IntentError::rejected(format!("{pos} has not been explored")));
    }
    if !state.map.is_passable(pos) {
        return Err(IntentError::rejected(format!("cannot build on water at {pos}")));
    }
    if pos == state.map.base {
        return Err(IntentError::rejected("the castle stands there"));
    }
    if state.structures.contains_key(&index) || state.resource_nodes.contains_key(&index) {
        return Err(IntentError::rejected(format!("{pos} is occupied")));
    }
    if !state.pay(&cost) {
        return Err(IntentError::Insufficient(cost));
    }
    state.ap -= BUILD_AP_COST;
    state.structures.insert(index, structure.to_string());
    state.structure_levels.insert(index, 1);
    state.counters.structures_built += 1;
    if content.is_tower(structure) {
        state.tower_cooldowns.insert(index, 0);
    } else if let Some(def) = content.building(structure) {
        state.citizens += def.citizens;
        state.hp_max += def.hp_bonus;
        state.hp += def.hp_bonus;
    }
    log::debug!("built {structure} at {pos} for {cost}");
    Ok(vec![format!("Built {structure} at {pos} ({cost})")])
}

/// Upgrade a tower along its upgrade path.
///
/// # Errors
///
/// Fails when there is no tower, no valid upgrade, or it cannot be afforded.
pub fn upgrade(
    state: &mut GameState,
    content: &Content,
    x: i32,
    y: i32,
    to: Option<&str>,
) -> Result<Vec<String>, IntentError> {
    require_day_action(state, "upgrade", 0)?;
    let (pos, index) = checked_tile(state, x, y)?;
    let current = state
        .structures
        .get(&index)
        .cloned()
        .ok_or_else(|| IntentError::rejected(format!("no structure at {pos}")))?;
    let def = content
        .tower(&current)
        .ok_or_else(|| IntentError::rejected(format!("{current} cannot be upgraded")))?;
    let target = match to {
        Some(wanted) if def.upgrades_to.iter().any(|id| id == wanted) => wanted.to_string(),
        Some(wanted) => {
            return Err(IntentError::rejected(format!(
                "{current} cannot become {wanted}"
            )));
        }
        None => def
            .upgrades_to
            .first()
            .cloned()
            .ok_or_else(|| IntentError::rejected(format!("{current} is fully upgraded")))?,
    };
    let cost = content
        .tower(&target)
        .map(|next| next.cost)
        .ok_or_else(|| IntentError::unknown("tower", &target))?;
    if !state.pay(&cost) {
        return Err(IntentError::Insufficient(cost));
    }
    state.structures.insert(index, target.clone());
    *state.structure_levels.entry(index).or_insert(1) += 1;
    state.tower_cooldowns.insert(index, 0);
    Ok(vec![format!("Upgraded {current} at {pos} to {target}")])
}

/// Remove a structure for half its cost back.
///
/// # Errors
///
/// Fails outside the day or when nothing stands at the tile.
pub fn demolish(
    state: &mut GameState,
    content: &Content,
    x: i32,
    y: i32,
) -> Result<Vec<String>, IntentError> {
    require_day_action(state, "demolish", 0)?;
    let (pos, index) = checked_tile(state, x, y)?;
    let Some(kind) = state.structures.remove(&index) else {
        return Err(IntentError::rejected(format!("nothing to demolish at {pos}")));
    };
    let refund = content
        .structure_cost(&kind)
        .unwrap_or_default()
        .divided(DEMOLISH_REFUND_DIVISOR);
    state.grant(&refund);
    state.structure_levels.remove(&index);
    state.tower_cooldowns.remove(&index);
    dismiss_tower_summons(state, index);
    if let Some(def) = content.building(&kind) {
        state.citizens = (state.citizens - def.citizens).max(0);
        state.hp_max -= def.hp_bonus;
        state.hp = state.hp.min(state.hp_max);
    }
    Ok(vec![format!("Demolished {kind} at {pos}, refunded {refund}")])
}

/// Exchange resources at the market's fixed rates.
///
/// # Errors
///
/// Fails without a market, with a non-positive amount, or when short.
pub fn trade(
    state: &mut GameState,
    give: ResourceKind,
    receive: ResourceKind,
    amount: i32,
) -> Result<Vec<String>, IntentError> {
    require_day_action(state, "trade", 0)?;
    if state.count_structures(MARKET) == 0 {
        return Err(IntentError::rejected("trading requires a market"));
    }
    if amount <= 0 {
        return Err(IntentError::InvalidPayload("amount must be positive".into()));
    }
    if give == receive {
        return Err(IntentError::rejected("cannot trade a resource for itself"));
    }
    let received = match (give, receive) {
        (ResourceKind::Gold, _) => amount * GOLD_TO_RESOURCE_RATE,
        (_, ResourceKind::Gold) => amount / RESOURCE_TO_GOLD_RATE,
        _ => amount / RESOURCE_SWAP_RATE,
    };
    if received <= 0 {
        return Err(IntentError::rejected(format!(
            "{amount} {give} is not enough to buy any {receive}"
        )));
    }
    let mut cost = ResourceBundle::default();
    *cost.get_mut(give) = amount;
    if !state.pay(&cost) {
        return Err(IntentError::Insufficient(cost));
    }
    state.add_resource(receive, received);
    Ok(vec![format!("Traded {amount} {give} for {received} {receive}")])
}

/// Pay an item's recipe and add it to the inventory.
///
/// # Errors
///
/// Fails outside the day, for unknown items, or when short.
pub fn craft(
    state: &mut GameState,
    content: &Content,
    item: &str,
) -> Result<Vec<String>, IntentError> {
    require_day_action(state, "craft", 0)?;
    let def = content
        .item(item)
        .ok_or_else(|| IntentError::unknown("item", item))?;
    if !state.pay(&def.recipe) {
        return Err(IntentError::Insufficient(def.recipe));
    }
    *state.inventory.entry(def.id.clone()).or_insert(0) += 1;
    Ok(vec![format!("Crafted {}", def.name)])
}

/// Move an item from the inventory into its slot.
///
/// # Errors
///
/// Fails for unknown items or items not in the inventory.
pub fn equip(
    state: &mut GameState,
    content: &Content,
    item: &str,
) -> Result<Vec<String>, IntentError> {
    if state.is_night() {
        return Err(IntentError::WrongPhase {
            action: "equip",
            phase: state.phase,
        });
    }
    let def = content
        .item(item)
        .ok_or_else(|| IntentError::unknown("item", item))?;
    let owned = state.inventory.get(&def.id).copied().unwrap_or(0);
    if owned == 0 {
        return Err(IntentError::rejected(format!("you have no {}", def.name)));
    }
    if owned == 1 {
        state.inventory.remove(&def.id);
    } else {
        state.inventory.insert(def.id.clone(), owned - 1);
    }
    let mut events = Vec::new();
    if let Some(previous) = state.equipped.insert(def.slot, def.id.clone()) {
        *state.inventory.entry(previous.clone()).or_insert(0) += 1;
        events.push(format!("Unequipped {previous}"));
    }
    events.push(format!("Equipped {} ({})", def.name, def.slot.as_str()));
    Ok(events)
}

/// Daily output of every standing building, scaled by workers and buffs.
#[must_use]
pub fn daily_production(state: &GameState, content: &Content) -> ResourceBundle {
    let raw = state
        .structures
        .values()
        .filter_map(|id| content.building(id))
        .fold(ResourceBundle::default(), |total, def| total.plus(&def.production));
    let multiplier =
        worker_bonus(state.citizens) * (1.0 + effect_total(state, content, EFFECT_PRODUCTION));
    let mut scaled = ResourceBundle::default();
    for (kind, amount) in raw.iter() {
        *scaled.get_mut(kind) = floor_f64_to_i32(f64::from(amount) * multiplier);
    }
    scaled
}

/// Everything that happens at dawn before the new day begins.
pub fn day_tick(state: &mut GameState, content: &Content) -> Vec<String> {
    let mut events = Vec::new();

    let produced = daily_production(state, content);
    if !produced.is_empty() {
        state.grant(&produced);
        events.push(format!("Production: {produced}"));
    }
    events.extend(collect_agreement_income(state, content));
    events.extend(advance_expeditions(state, content));

    for node in state.resource_nodes.values_mut() {
        node.cooldown_days = (node.cooldown_days - 1).max(0);
    }
    apply_caps(state, content);

    for id in expire_buffs(state) {
        events.push(format!("Buff expired: {id}"));
    }
    events.extend(evaluate_progress(state, content));

    state.threat = state.threat / 2 + 1;
    let regen = DAWN_HP_REGEN + floor_f64_to_i32(effect_total(state, content, EFFECT_HP_REGEN));
    state.hp = (state.hp + regen).min(state.hp_max);
    log::debug!(
        "day {} tick: threat {}, hp {}/{}, input {:.0}s",
        state.day,
        state.threat,
        state.hp,
        state.hp_max,
        u64_to_f64(state.typing.input_ms) / 1_000.0
    );
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::new_game;

    fn fresh() -> GameState {
        new_game("economy", Content::builtin())
    }

    fn open_tile(state: &GameState) -> GridPos {
        let base = state.map.base;
        state
            .map
            .neighbours(base)
            .find(|pos| !state.resource_nodes.contains_key(&state.map.index_of(*pos).unwrap()))
            .unwrap()
    }

    #[test]
    fn caps_follow_day_table() {
        let content = Content::builtin();
        let mut state = fresh();
        assert_eq!(resource_cap(&state, content), 100);
        state.day = 5;
        assert_eq!(resource_cap(&state, content), 200);
        state.day = 14;
        assert_eq!(resource_cap(&state, content), 400);
        state.day = 15;
        assert_eq!(resource_cap(&state, content), 800);
    }

    #[test]
    fn overflow_trimmed_silently() {
        let content = Content::builtin();
        let mut state = fresh();
        state.resources.wood = 130;
        state.gold = 500;
        apply_caps(&mut state, content);
        assert_eq!(state.resources.wood, 100);
        assert_eq!(state.gold, 500);
        apply_caps(&mut state, content);
        assert_eq!(state.resources.wood, 100);
    }

    #[test]
    fn dawn_trims_without_reporting() {
        let content = Content::builtin();
        let mut state = fresh();
        state.resources.wood = 150;
        let events = day_tick(&mut state, content);
        assert_eq!(state.resources.wood, 100);
        assert!(!events.iter().any(|e| e.contains("wood")), "{events:?}");
    }

    #[test]
    fn worker_bonus_caps() {
        assert!((worker_bonus(0) - 1.0).abs() < f64::EPSILON);
        assert!((worker_bonus(4) - 1.2).abs() < 1e-9);
        assert!((worker_bonus(40) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn build_validates_and_charges() {
        let content = Content::builtin();
        let mut state = fresh();
        let base = state.map.base;
        assert!(build(&mut state, content, "sentry", base.x, base.y).is_err());
        assert!(matches!(
            build(&mut state, content, "moat", 1, 1),
            Err(IntentError::UnknownId { .. })
        ));
        assert!(matches!(
            build(&mut state, content, "sentry", 99, 1),
            Err(IntentError::OutOfBounds { .. })
        ));
        let tile = open_tile(&state);
        let gold = state.gold;
        let ap = state.ap;
        build(&mut state, content, "sentry", tile.x, tile.y).unwrap();
        assert_eq!(state.gold, gold - content.tower("sentry").unwrap().cost.gold);
        assert_eq!(state.ap, ap - BUILD_AP_COST);
        assert_eq!(state.counters.structures_built, 1);
        assert!(build(&mut state, content, "sentry", tile.x, tile.y).is_err());
    }

    #[test]
    fn demolish_refunds_half() {
        let content = Content::builtin();
        let mut state = fresh();
        let tile = open_tile(&state);
        build(&mut state, content, "sentry", tile.x, tile.y).unwrap();
        let gold = state.gold;
        demolish(&mut state, content, tile.x, tile.y).unwrap();
        let cost = content.tower("sentry").unwrap().cost;
        assert_eq!(state.gold, gold + cost.gold / 2);
        assert!(state.structures.is_empty());
    }

    #[test]
    fn trade_needs_market_and_uses_rates() {
        let mut state = fresh();
        assert!(trade(&mut state, ResourceKind::Gold, ResourceKind::Wood, 5).is_err());
        let index = state.map.index_of(GridPos::new(0, 0)).unwrap();
        state.structures.insert(index, MARKET.into());
        let wood = state.resources.wood;
        trade(&mut state, ResourceKind::Gold, ResourceKind::Wood, 5).unwrap();
        assert_eq!(state.resources.wood, wood + 10);
        let gold = state.gold;
        trade(&mut state, ResourceKind::Wood, ResourceKind::Gold, 9).unwrap();
        assert_eq!(state.gold, gold + 3);
        let stone = state.resources.stone;
        trade(&mut state, ResourceKind::Wood, ResourceKind::Stone, 4).unwrap();
        assert_eq!(state.resources.stone, stone + 2);
        assert!(trade(&mut state, ResourceKind::Wood, ResourceKind::Gold, 2).is_err());
    }

    #[test]
    fn equip_swaps_previous_back() {
        let content = Content::builtin();
        let mut state = fresh();
        state.inventory.insert("iron_blade".into(), 1);
        state.inventory.insert("runed_sword".into(), 1);
        equip(&mut state, content, "iron_blade").unwrap();
        let events = equip(&mut state, content, "runed_sword").unwrap();
        assert_eq!(events[0], "Unequipped iron_blade");
        assert_eq!(state.inventory.get("iron_blade"), Some(&1));
        assert!(!state.inventory.contains_key("runed_sword"));
        assert!(equip(&mut state, content, "runed_sword").is_err());
    }

    #[test]
    fn dawn_produces_and_cools_threat() {
        let content = Content::builtin();
        let mut state = fresh();
        let index = state.map.index_of(GridPos::new(0, 0)).unwrap();
        state.structures.insert(index, "farm".into());
        state.threat = 9;
        state.hp = state.hp_max - 3;
        let food = state.resources.food;
        let events = day_tick(&mut state, content);
        let farm = content.building("farm").unwrap().production.food;
        assert_eq!(state.resources.food, food + farm);
        assert_eq!(state.threat, 5);
        assert_eq!(state.hp, state.hp_max - 2);
        assert!(events.iter().any(|e| e.starts_with("Production")));
    }
}
