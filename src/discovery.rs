//! Active Address Discovery
//!
//! Recovers, from nothing but the master key, every address that has ever
//! been used on-chain. Each group is scanned independently under the gap
//! limit rule: keep deriving until `min_gap` consecutive addresses in that
//! group have no recorded activity. The initial seed for all groups is
//! pooled into a single batched existence check to amortize round-trips;
//! refills query only their own sub-batch.

use std::collections::BTreeSet;

use bitcoin::bip32::Xpriv;
use bitcoin::secp256k1::{All, Secp256k1};

use crate::api::ExistenceOracle;
use crate::error::{ShardWalletError, ShardWalletResult};
use crate::types::{AddressKeyPair, DEFAULT_GROUP_SCAN_BUDGET, TOTAL_GROUPS};
use crate::wallet;

/// Tuning knobs for a discovery run.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Number of groups the address space is partitioned into.
    pub group_count: u32,
    /// Maximum addresses accepted per group before the run is aborted with
    /// `DiscoveryExceededBudget`. Guards against an oracle that keeps
    /// reporting activity forever.
    pub group_scan_budget: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            group_count: TOTAL_GROUPS,
            group_scan_budget: DEFAULT_GROUP_SCAN_BUDGET,
        }
    }
}

/// Orchestrates derivation and existence checks across all groups.
///
/// Holds no state between runs; every `discover` call starts from an empty
/// scan state and either returns the complete active set or an error.
pub struct DiscoveryEngine<'a, O: ExistenceOracle> {
    oracle: &'a O,
    config: DiscoveryConfig,
    secp: Secp256k1<All>,
}

impl<'a, O: ExistenceOracle> DiscoveryEngine<'a, O> {
    pub fn new(oracle: &'a O) -> Self {
        Self::with_config(oracle, DiscoveryConfig::default())
    }

    pub fn with_config(oracle: &'a O, config: DiscoveryConfig) -> Self {
        Self {
            oracle,
            config,
            secp: Secp256k1::new(),
        }
    }

    /// Discover all active addresses derivable from `master`.
    ///
    /// `known_indices` are indices already assigned in persistent wallet
    /// storage; they are never rederived. The result is ordered group-major,
    /// then by derivation order within each group. `min_gap = 0` is legal
    /// and returns an empty set without touching the network.
    ///
    /// On any error the run aborts and returns no addresses; a partial set
    /// is never handed back.
    pub fn discover(
        &self,
        master: &Xpriv,
        known_indices: &[u32],
        min_gap: usize,
    ) -> ShardWalletResult<Vec<AddressKeyPair>> {
        let group_count = self.config.group_count;
        if group_count == 0 {
            return Err(ShardWalletError::invalid_group("Group count must be non-zero"));
        }
        if min_gap > self.config.group_scan_budget {
            return Err(ShardWalletError::discovery_exceeded_budget(format!(
                "Gap limit {} exceeds the per-group scan budget {}",
                min_gap, self.config.group_scan_budget
            )));
        }

        crate::log_info!(
            "discovery",
            "Starting active address discovery",
            groups = group_count,
            min_gap = min_gap,
            known_indices = known_indices.len(),
        );

        let root = wallet::discovery_root(&self.secp, master)?;
        let mut skip: BTreeSet<u32> = known_indices.iter().copied().collect();

        // Seed phase: min_gap fresh addresses per group. Indices consumed by
        // earlier groups are skipped by later ones through the shared set.
        let mut per_group: Vec<Vec<AddressKeyPair>> = Vec::with_capacity(group_count as usize);
        for group in 0..group_count {
            let batch =
                wallet::derive_in_group(&self.secp, &root, group, group_count, min_gap, &skip)?;
            skip.extend(batch.iter().map(|p| p.index));
            per_group.push(batch);
        }

        // One pooled existence check over the whole seed, group-major order.
        // The oracle re-pages to its own limits internally.
        let seed_addresses: Vec<String> = per_group
            .iter()
            .flatten()
            .map(|p| p.hash.clone())
            .collect();
        let seed_results = self.oracle.check_active(&seed_addresses)?;
        if seed_results.len() != seed_addresses.len() {
            return Err(ShardWalletError::internal(
                "Oracle returned a result list of the wrong length",
            ));
        }

        let mut active = Vec::new();
        let mut offset = 0;

        for (group, seeded) in per_group.iter().enumerate() {
            let flags = &seed_results[offset..offset + seeded.len()];
            offset += seeded.len();

            let (mut gap, mut found) = walk_gap(seeded, flags, 0)?;
            active.append(&mut found);
            let mut accepted = seeded.len();

            // Refill until the trailing run of inactive addresses reaches
            // the gap limit. Each round tops the run back up to min_gap.
            while gap < min_gap {
                let need = min_gap - gap;
                if accepted + need > self.config.group_scan_budget {
                    return Err(ShardWalletError::discovery_exceeded_budget(format!(
                        "Group {} exceeded its scan budget of {} addresses",
                        group, self.config.group_scan_budget
                    )));
                }

                crate::log_debug!(
                    "discovery",
                    "Refilling group",
                    group = group,
                    gap = gap,
                    need = need,
                );

                let batch = wallet::derive_in_group(
                    &self.secp,
                    &root,
                    group as u32,
                    group_count,
                    need,
                    &skip,
                )?;
                skip.extend(batch.iter().map(|p| p.index));
                accepted += batch.len();

                let addresses: Vec<String> = batch.iter().map(|p| p.hash.clone()).collect();
                let flags = self.oracle.check_active(&addresses)?;

                let (next_gap, mut found) = walk_gap(&batch, &flags, gap)?;
                gap = next_gap;
                active.append(&mut found);
            }
        }

        crate::log_info!(
            "discovery",
            "Discovery complete",
            active = active.len(),
            derived = skip.len().saturating_sub(known_indices.len()),
        );

        Ok(active)
    }
}

/// Walk a batch in derivation order, tracking the running count of
/// consecutive inactive addresses. An active hit resets the count and
/// records the address; an inactive one increments it.
fn walk_gap(
    pairs: &[AddressKeyPair],
    results: &[bool],
    starting_gap: usize,
) -> ShardWalletResult<(usize, Vec<AddressKeyPair>)> {
    if pairs.len() != results.len() {
        return Err(ShardWalletError::internal(format!(
            "Gap walk over {} addresses but {} flags",
            pairs.len(),
            results.len()
        )));
    }

    let mut gap = starting_gap;
    let mut active = Vec::new();

    for (pair, is_active) in pairs.iter().zip(results) {
        if *is_active {
            active.push(pair.clone());
            gap = 0;
        } else {
            gap += 1;
        }
    }

    Ok((gap, active))
}
