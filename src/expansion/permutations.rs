use crate::store::QuantityType;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A reordering of a signature. `slots[i]` is the placeholder index of the
/// operand now at position `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermutedSignature {
    pub quantities: Vec<QuantityType>,
    pub slots: Vec<usize>,
}

impl PermutedSignature {
    pub fn identity(signature: &[QuantityType]) -> Self {
        Self { quantities: signature.to_vec(), slots: (0..signature.len()).collect() }
    }
}

/// Every distinct ordering of `signature`, starting with the identity.
///
/// Orderings that only swap operands of the same type are dropped.
pub fn permutations(signature: &[QuantityType]) -> Vec<PermutedSignature> {
    let mut current = PermutedSignature::identity(signature);
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    permute(&mut current, 0, &mut seen, &mut out);
    out
}

fn permute(
    current: &mut PermutedSignature,
    from: usize,
    seen: &mut HashSet<Vec<QuantityType>>,
    out: &mut Vec<PermutedSignature>,
) {
    if from + 1 >= current.quantities.len() {
        if seen.insert(current.quantities.clone()) {
            out.push(current.clone());
        }
        return;
    }

    for i in from..current.quantities.len() {
        current.quantities.swap(from, i);
        current.slots.swap(from, i);
        permute(current, from + 1, seen, out);
        current.quantities.swap(from, i);
        current.slots.swap(from, i);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signature(names: &[&str]) -> Vec<QuantityType> {
        names.iter().map(|n| QuantityType::parse(n)).collect()
    }

    #[test]
    fn test_distinct_operands_give_all_orderings() {
        let result = permutations(&signature(&["Length", "Time", "Mass"]));
        assert_eq!(result.len(), 6);
        assert_eq!(result[0], PermutedSignature::identity(&signature(&["Length", "Time", "Mass"])));

        for permuted in &result {
            for (position, &slot) in permuted.slots.iter().enumerate() {
                assert_eq!(permuted.quantities[position], signature(&["Length", "Time", "Mass"])[slot]);
            }
        }
    }

    #[test]
    fn test_repeated_operands_are_deduplicated() {
        assert_eq!(permutations(&signature(&["Length", "Length"])).len(), 1);
        assert_eq!(permutations(&signature(&["Length", "Length", "Time"])).len(), 3);
        assert_eq!(permutations(&[]).len(), 1);
    }
}
