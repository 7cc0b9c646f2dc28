use anyhow::{Result, bail};
use std::collections::HashSet;

/// Seeds used when `all` is requested.
pub const STANDARD_SEEDS: [&str; 6] = ["1337", "alpha", "bravo", "keyward", "siegeworks", "42"];

/// One seed string as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedInfo {
    pub label: String,
}

impl SeedInfo {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// Seed for the `iteration`-th run; iteration zero is the seed itself.
    #[must_use]
    pub fn for_iteration(&self, iteration: usize) -> String {
        if iteration == 0 {
            self.label.clone()
        } else {
            format!("{}#{iteration}", self.label)
        }
    }
}

/// Resolve CLI seed tokens, expanding `all` / `available` and dropping duplicates.
///
/// Any non-empty string is a valid seed; engines derive their RNG state from it.
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut pending: Vec<SeedInfo> = Vec::new();

    for token in tokens {
        if token.is_empty() {
            continue;
        }
        if token.eq_ignore_ascii_case("all") || token.eq_ignore_ascii_case("available") {
            pending.extend(STANDARD_SEEDS.iter().map(|seed| SeedInfo::new(*seed)));
            continue;
        }
        if token.chars().any(char::is_whitespace) {
            bail!("Seed tokens may not contain whitespace: {token:?}");
        }
        pending.push(SeedInfo::new(token.as_str()));
    }

    let mut seen = HashSet::new();
    pending.retain(|info| seen.insert(info.label.clone()));

    if pending.is_empty() {
        pending.push(SeedInfo::new(STANDARD_SEEDS[0]));
    }
    Ok(pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_order_and_drops_duplicates() {
        let raw = vec!["42".to_string(), "alpha".to_string(), "42".to_string()];
        let seeds = resolve_seed_inputs(&raw).unwrap();
        assert_eq!(seeds, vec![SeedInfo::new("42"), SeedInfo::new("alpha")]);
    }

    #[test]
    fn expands_all_keyword() {
        let seeds = resolve_seed_inputs(&["all".to_string()]).unwrap();
        assert_eq!(seeds.len(), STANDARD_SEEDS.len());
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        let seeds = resolve_seed_inputs(&[String::new()]).unwrap();
        assert_eq!(seeds, vec![SeedInfo::new("1337")]);
    }

    #[test]
    fn iteration_seeds_are_distinct() {
        let info = SeedInfo::new("alpha");
        assert_eq!(info.for_iteration(0), "alpha");
        assert_eq!(info.for_iteration(2), "alpha#2");
    }
}
