//! Key-component bundle: accumulate custodian components, validate each
//! against its check value, then XOR-combine and verify the derived KEK.

use std::collections::BTreeMap;

use custos_cipher::des::TDES_KEY_LEN;
use custos_cipher::BlockCipher;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::errors::{BundleError, Result};

/// Merge-time preconditions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergePolicy {
    /// Fail fast with [`BundleError::IncompleteBundle`] when fewer than the
    /// expected number of components are loaded. Off by default: an
    /// incomplete merge then surfaces as a final check value mismatch,
    /// matching the reference ceremony flow.
    pub require_complete: bool,
}

/// A serializable, key-material-free snapshot of a bundle's progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleSummary {
    pub name: String,
    pub index: u32,
    pub expected_components: usize,
    pub loaded_components: usize,
    pub complete: bool,
}

/// Accumulates custodian key components for one target KEK and rebuilds
/// the key once the components are in.
///
/// Slots are custodian identifiers; re-adding a slot overwrites it (last
/// write wins), and the populated slot count is the sole completeness
/// signal. The bundle has no internal synchronization: embedders must
/// serialize [`add_component`](Self::add_component) calls per bundle.
pub struct KekBundle {
    name: String,
    index: u32,
    expected_components: usize,
    final_check_value: String,
    components: BTreeMap<u32, Zeroizing<Vec<u8>>>,
}

impl KekBundle {
    /// Creates an empty bundle.
    ///
    /// `expected_components` is trusted to be a sane positive count and is
    /// not validated here; `final_check_value` is an opaque string until
    /// merge time, where it is interpreted as hex.
    pub fn new(
        name: impl Into<String>,
        index: u32,
        expected_components: usize,
        final_check_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            index,
            expected_components,
            final_check_value: final_check_value.into(),
            components: BTreeMap::new(),
        }
    }

    /// Label of the target key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identifier of this bundle within a fleet. Uniqueness is a caller
    /// concern.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Number of components required before the key can be reconstructed.
    pub fn expected_components(&self) -> usize {
        self.expected_components
    }

    /// Expected check value of the fully combined key, as given at
    /// construction.
    pub fn final_check_value(&self) -> &str {
        &self.final_check_value
    }

    /// Number of distinct slots currently populated.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// True once every expected component slot is populated.
    pub fn is_complete(&self) -> bool {
        self.components.len() == self.expected_components
    }

    /// Progress snapshot without key material, for ceremony dashboards and
    /// embedding systems.
    pub fn summary(&self) -> BundleSummary {
        BundleSummary {
            name: self.name.clone(),
            index: self.index,
            expected_components: self.expected_components,
            loaded_components: self.components.len(),
            complete: self.is_complete(),
        }
    }

    /// Validates and stores one custodian component.
    ///
    /// `component_hex` must decode to a 16- or 24-byte 3DES key and
    /// `check_value_hex` must verify against that key (2..=8 byte
    /// truncation, case-insensitive). On success the expanded 24-byte key
    /// bytes are stored under `slot`, overwriting any prior submission for
    /// that slot. On failure the bundle is left untouched.
    pub fn add_component(
        &mut self,
        slot: u32,
        component_hex: &str,
        check_value_hex: &str,
    ) -> Result<()> {
        let cipher = BlockCipher::from_tdes_key_hex(component_hex).map_err(|source| {
            warn!(bundle = %self.name, slot, "rejected key component: {source}");
            BundleError::InvalidComponent { slot, source }
        })?;

        if !cipher.verify_check_value(check_value_hex) {
            warn!(bundle = %self.name, slot, "component check value does not tally");
            return Err(BundleError::CheckValueMismatch {
                slot,
                check_value: check_value_hex.to_owned(),
            });
        }

        self.components
            .insert(slot, Zeroizing::new(cipher.key_bytes().to_vec()));
        debug!(
            bundle = %self.name,
            slot,
            loaded = self.components.len(),
            expected = self.expected_components,
            "key component admitted"
        );
        Ok(())
    }

    /// Rebuilds the KEK from the loaded components.
    ///
    /// Components are XOR-combined into a 24-byte all-zero accumulator;
    /// XOR is commutative and associative, so insertion order never
    /// affects the result. The derived key is returned only if its check
    /// value tallies with the bundle's expected final check value.
    ///
    /// Merging an incomplete bundle is not an error in itself: the
    /// combination is simply wrong and fails the final check. Use
    /// [`merge_with`](Self::merge_with) to opt into an explicit
    /// completeness precondition.
    pub fn merge(&self) -> Result<BlockCipher> {
        self.merge_with(MergePolicy::default())
    }

    /// [`merge`](Self::merge) with explicit preconditions.
    pub fn merge_with(&self, policy: MergePolicy) -> Result<BlockCipher> {
        if policy.require_complete && !self.is_complete() {
            return Err(BundleError::IncompleteBundle {
                got: self.components.len(),
                expected: self.expected_components,
            });
        }

        let mut kek_bytes = Zeroizing::new([0u8; TDES_KEY_LEN]);
        for component in self.components.values() {
            for (acc, byte) in kek_bytes.iter_mut().zip(component.iter()) {
                *acc ^= byte;
            }
        }

        let cipher =
            BlockCipher::from_tdes_key_bytes(&kek_bytes[..]).map_err(BundleError::InvalidDerivedKey)?;

        if !cipher.verify_check_value(&self.final_check_value) {
            warn!(
                bundle = %self.name,
                index = self.index,
                loaded = self.components.len(),
                "derived key check value does not tally"
            );
            return Err(BundleError::FinalCheckValueMismatch {
                expected: self.final_check_value.clone(),
            });
        }

        debug!(bundle = %self.name, index = self.index, "KEK reconstructed and verified");
        Ok(cipher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reflects_progress() {
        let mut bundle = KekBundle::new("visa", 1, 3, "2D617C");
        bundle
            .add_component(1, "E38FD6D9EF85A892F2FBFDD083A407AE", "DD1375")
            .unwrap();

        let summary = bundle.summary();
        assert_eq!(summary.name, "visa");
        assert_eq!(summary.index, 1);
        assert_eq!(summary.expected_components, 3);
        assert_eq!(summary.loaded_components, 1);
        assert!(!summary.complete);
    }

    #[test]
    fn summary_serializes() {
        let bundle = KekBundle::new("visa", 1, 3, "2D617C");
        let value = serde_json::to_value(bundle.summary()).unwrap();
        assert_eq!(value["name"], "visa");
        assert_eq!(value["loaded_components"], 0);
        assert_eq!(value["complete"], false);
    }
}
