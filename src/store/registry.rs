use super::types::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Maps a quantity type to how the derivation engine should treat it.
///
/// Implementations must be pure lookups for the duration of one resolution.
pub trait OperandClassifier {
    fn classify(&self, quantity: &QuantityType) -> Classification;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub quantity: QuantityType,
    pub dimension: Dimension,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupEntry {
    pub quantity: QuantityType,
    pub members: BTreeMap<Dimension, QuantityType>,
}

/// The set of known quantities: scalars, stand-alone vectors and vector groups.
///
/// Anything not registered classifies as a scalar.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuantityPopulation {
    #[serde(default)]
    pub scalars: Vec<QuantityType>,
    #[serde(default)]
    pub vectors: Vec<VectorEntry>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,

    // Lookup table (Not serialized, rebuilt on load)
    #[serde(skip)]
    index: HashMap<QuantityType, Classification>,
}

impl QuantityPopulation {
    pub fn new() -> Self { Self::default() }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut population: Self = serde_json::from_str(json)?;
        population.rebuild_index();
        Ok(population)
    }

    pub fn add_scalar(&mut self, quantity: impl Into<QuantityType>) -> &mut Self {
        self.scalars.push(quantity.into());
        self.rebuild_index();
        self
    }

    pub fn add_vector(&mut self, quantity: impl Into<QuantityType>, dimension: Dimension) -> &mut Self {
        self.vectors.push(VectorEntry { quantity: quantity.into(), dimension });
        self.rebuild_index();
        self
    }

    pub fn add_group<T: Into<QuantityType>>(
        &mut self,
        quantity: impl Into<QuantityType>,
        members: impl IntoIterator<Item = (Dimension, T)>,
    ) -> &mut Self {
        let members = members.into_iter().map(|(d, ty)| (d, ty.into())).collect();
        self.groups.push(GroupEntry { quantity: quantity.into(), members });
        self.rebuild_index();
        self
    }

    /// Rebuilds the lookup table after deserialization or mutation.
    ///
    /// Group membership wins over a plain vector registration of the same type.
    pub fn rebuild_index(&mut self) {
        let mut index = HashMap::new();
        for scalar in &self.scalars {
            index.insert(scalar.clone(), Classification::Scalar);
        }
        for vector in &self.vectors {
            index.insert(vector.quantity.clone(), Classification::FixedVector(vector.dimension));
        }
        for group in &self.groups {
            for (&dimension, member) in &group.members {
                index.insert(member.clone(), Classification::GroupMember(dimension));
            }
            index.insert(group.quantity.clone(), Classification::Group(group.members.clone()));
        }
        self.index = index;
    }
}

impl OperandClassifier for QuantityPopulation {
    fn classify(&self, quantity: &QuantityType) -> Classification {
        self.index.get(quantity).cloned().unwrap_or(Classification::Scalar)
    }
}
