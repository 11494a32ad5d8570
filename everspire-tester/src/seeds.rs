//! Seed argument parsing for scenario and playability runs.

use std::collections::HashSet;

use anyhow::{Result, bail};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Fallback seed when the CLI provides none.
pub const DEFAULT_SEED: u64 = 1337;

/// Generator seed for `random:N` batches. Fixed so reruns see the same batch.
const RANDOM_BATCH_SEED: u64 = 0x5EED_BA5E;

/// Widest inclusive range a single `a..b` token may expand to.
const MAX_RANGE_SPAN: u64 = 10_000;

/// One resolved seed plus where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedInfo {
    pub seed: u64,
    pub generated: bool,
}

impl SeedInfo {
    #[must_use]
    pub const fn literal(seed: u64) -> Self {
        Self {
            seed,
            generated: false,
        }
    }

    #[must_use]
    pub const fn generated(seed: u64) -> Self {
        Self {
            seed,
            generated: true,
        }
    }
}

/// Resolve CLI seed tokens into a deduplicated seed list.
///
/// Accepts unsigned integers, negative integers (mapped by absolute value),
/// inclusive `a..b` ranges, and `random:N` batches. An empty input falls back
/// to [`DEFAULT_SEED`].
pub fn resolve_seed_inputs(tokens: &[String]) -> Result<Vec<SeedInfo>> {
    let mut resolved = Vec::new();

    for raw in tokens {
        let token = raw.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(count) = token.strip_prefix("random:") {
            let count: usize = count
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid random batch size: {token}"))?;
            resolved.extend(random_batch(count));
        } else if let Some((lo, hi)) = token.split_once("..") {
            resolved.extend(parse_range(token, lo, hi)?);
        } else {
            resolved.push(SeedInfo::literal(parse_numeric(token)?));
        }
    }

    if resolved.is_empty() {
        resolved.push(SeedInfo::literal(DEFAULT_SEED));
    }

    let mut seen = HashSet::new();
    resolved.retain(|info| seen.insert(info.seed));
    Ok(resolved)
}

fn parse_numeric(token: &str) -> Result<u64> {
    if let Ok(value) = token.parse::<u64>() {
        return Ok(value);
    }
    if let Ok(value) = token.parse::<i64>() {
        return Ok(value.unsigned_abs());
    }
    bail!("unknown seed token: {token}");
}

fn parse_range(token: &str, lo: &str, hi: &str) -> Result<Vec<SeedInfo>> {
    let lo: u64 = lo
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid range start in: {token}"))?;
    let hi: u64 = hi
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid range end in: {token}"))?;
    if hi < lo {
        bail!("descending seed range: {token}");
    }
    if hi - lo >= MAX_RANGE_SPAN {
        bail!(
            "seed range too wide ({} seeds): {token}",
            (hi - lo).saturating_add(1)
        );
    }
    Ok((lo..=hi).map(SeedInfo::literal).collect())
}

fn random_batch(count: usize) -> Vec<SeedInfo> {
    let mut rng = SmallRng::seed_from_u64(RANDOM_BATCH_SEED);
    (0..count)
        .map(|_| SeedInfo::generated(rng.random::<u64>()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn numeric_and_negative_tokens_resolve() {
        let seeds = resolve_seed_inputs(&tokens(&["42", "-7"])).unwrap();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[0], SeedInfo::literal(42));
        assert_eq!(seeds[1], SeedInfo::literal(7));
    }

    #[test]
    fn ranges_expand_inclusively() {
        let seeds = resolve_seed_inputs(&tokens(&["4..6"])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(values, vec![4, 5, 6]);
    }

    #[test]
    fn duplicates_collapse_keeping_first() {
        let seeds = resolve_seed_inputs(&tokens(&["5", "4..6", "5"])).unwrap();
        let values: Vec<u64> = seeds.iter().map(|s| s.seed).collect();
        assert_eq!(values, vec![5, 4, 6]);
    }

    #[test]
    fn empty_input_falls_back_to_default() {
        let seeds = resolve_seed_inputs(&tokens(&["", "  "])).unwrap();
        assert_eq!(seeds, vec![SeedInfo::literal(DEFAULT_SEED)]);
    }

    #[test]
    fn random_batches_are_stable_across_calls() {
        let first = resolve_seed_inputs(&tokens(&["random:3"])).unwrap();
        let second = resolve_seed_inputs(&tokens(&["random:3"])).unwrap();
        assert_eq!(first, second);
        assert!(first.iter().all(|s| s.generated));
    }

    #[test]
    fn gibberish_is_rejected() {
        assert!(resolve_seed_inputs(&tokens(&["banana"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["9..2"])).is_err());
        assert!(resolve_seed_inputs(&tokens(&["random:lots"])).is_err());
    }
}
