//! Largest-first coin selection.
//!
//! UTXOs are ordered by value descending with a stable sort, so equal values
//! keep the order the node reported them in. The selector then takes the
//! shortest prefix of that ordering whose total covers the target. The result
//! is deterministic for a given input list and minimal under this policy, but
//! not globally minimal in input count or leftover change.

use shadowy_core::types::Utxo;
use tracing::debug;

use crate::error::WalletError;

/// Result of coin selection: which UTXOs to spend and what they add up to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoinSelection {
    /// Selected UTXOs, in selection order (largest first).
    pub selected: Vec<Utxo>,
    /// Total value of the selected UTXOs in satoshis.
    pub total_selected: u64,
    /// The target the selection was made for.
    pub target: u64,
}

impl CoinSelection {
    /// Value selected beyond the target.
    pub fn excess(&self) -> u64 {
        self.total_selected.saturating_sub(self.target)
    }
}

/// Largest-first greedy coin selector.
pub struct CoinSelector;

impl CoinSelector {
    /// Select UTXOs whose total covers `target` (amount plus fee, in satoshis).
    pub fn select(utxos: &[Utxo], target: u64) -> Result<CoinSelection, WalletError> {
        if utxos.is_empty() {
            return Err(WalletError::NoUtxos);
        }

        if target == 0 {
            return Err(WalletError::InvalidAmount("target must be non-zero".into()));
        }

        let mut ordered: Vec<&Utxo> = utxos.iter().collect();
        // sort_by is stable: ties keep input order
        ordered.sort_by(|a, b| b.value.cmp(&a.value));

        let mut selected = Vec::new();
        let mut total: u64 = 0;

        for utxo in ordered {
            total = total
                .checked_add(utxo.value)
                .ok_or_else(|| WalletError::InvalidAmount("UTXO total overflow".into()))?;
            selected.push(utxo.clone());

            if total >= target {
                debug!(
                    inputs = selected.len(),
                    total_selected = total,
                    target,
                    "coins selected"
                );
                return Ok(CoinSelection {
                    selected,
                    total_selected: total,
                    target,
                });
            }
        }

        Err(WalletError::InsufficientFunds {
            needed: target,
            have: total,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn make_utxo(tag: u8, value: u64) -> Utxo {
        Utxo {
            txid: format!("{:064x}", tag),
            vout: 0,
            value,
            script_pubkey: String::new(),
            address: "Ssource".into(),
            confirmations: 1,
        }
    }

    fn sample_set() -> Vec<Utxo> {
        vec![
            make_utxo(1, 1_000_000_000),
            make_utxo(2, 500_000_000),
            make_utxo(3, 200_000_000),
        ]
    }

    #[test]
    fn select_largest_alone_when_sufficient() {
        let result = CoinSelector::select(&sample_set(), 600_100_000).unwrap();
        assert_eq!(result.selected.len(), 1);
        assert_eq!(result.selected[0].value, 1_000_000_000);
        assert_eq!(result.total_selected, 1_000_000_000);
        assert_eq!(result.excess(), 399_900_000);
    }

    #[test]
    fn select_is_order_independent_for_distinct_values() {
        let mut reversed = sample_set();
        reversed.reverse();
        let a = CoinSelector::select(&sample_set(), 1_200_000_000).unwrap();
        let b = CoinSelector::select(&reversed, 1_200_000_000).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.selected.len(), 2);
        assert_eq!(a.total_selected, 1_500_000_000);
    }

    #[test]
    fn select_exact_target() {
        let result = CoinSelector::select(&sample_set(), 1_700_000_000).unwrap();
        assert_eq!(result.selected.len(), 3);
        assert_eq!(result.excess(), 0);
    }

    #[test]
    fn select_insufficient_funds() {
        let err = CoinSelector::select(&sample_set(), 2_000_000_000).unwrap_err();
        assert_eq!(
            err,
            WalletError::InsufficientFunds {
                needed: 2_000_000_000,
                have: 1_700_000_000,
            }
        );
        assert_eq!(err.shortfall(), Some(300_000_000));
    }

    #[test]
    fn select_empty_utxos() {
        let err = CoinSelector::select(&[], 1).unwrap_err();
        assert_eq!(err, WalletError::NoUtxos);
    }

    #[test]
    fn select_zero_target_rejected() {
        let err = CoinSelector::select(&sample_set(), 0).unwrap_err();
        assert!(matches!(err, WalletError::InvalidAmount(_)));
    }

    #[test]
    fn ties_keep_input_order() {
        let utxos = vec![make_utxo(9, 100), make_utxo(4, 100), make_utxo(7, 100)];
        let result = CoinSelector::select(&utxos, 150).unwrap();
        assert_eq!(result.selected.len(), 2);
        assert_eq!(result.selected[0].txid, utxos[0].txid);
        assert_eq!(result.selected[1].txid, utxos[1].txid);
    }

    #[test]
    fn max_value_utxo_covers_any_target() {
        let utxos = vec![make_utxo(1, u64::MAX), make_utxo(2, u64::MAX)];
        let result = CoinSelector::select(&utxos, u64::MAX).unwrap();
        assert_eq!(result.selected.len(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        #[test]
        fn selection_covers_target_and_is_minimal(
            values in proptest::collection::vec(1u64..1_000_000_000, 1..20),
            target in 1u64..5_000_000_000,
        ) {
            let utxos: Vec<Utxo> = values
                .iter()
                .enumerate()
                .map(|(i, v)| make_utxo(i as u8, *v))
                .collect();
            let sum: u64 = values.iter().sum();

            match CoinSelector::select(&utxos, target) {
                Ok(sel) => {
                    prop_assert!(sel.total_selected >= target);
                    let last = sel.selected.last().map(|u| u.value).unwrap_or(0);
                    if sel.selected.len() > 1 {
                        prop_assert!(sel.total_selected - last < target);
                    }
                    // Largest first: selection values are non-increasing.
                    for pair in sel.selected.windows(2) {
                        prop_assert!(pair[0].value >= pair[1].value);
                    }
                }
                Err(WalletError::InsufficientFunds { needed, have }) => {
                    prop_assert!(sum < target);
                    prop_assert_eq!(needed, target);
                    prop_assert_eq!(have, sum);
                }
                Err(other) => prop_assert!(false, "unexpected error: {other}"),
            }
        }
    }
}
