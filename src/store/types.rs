use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::fmt;

/// The component count of a vector quantity.
pub type Dimension = u32;

/// A named quantity type, e.g. `kinematics::Speed`.
///
/// The module part is what the operator searcher compares when deciding
/// whether an overload is "suitable" for the declaring type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct QuantityType {
    pub module: String,
    pub name: String,
}

impl QuantityType {
    pub fn new(module: impl Into<String>, name: impl Into<String>) -> Self {
        Self { module: module.into(), name: name.into() }
    }

    /// Splits a path such as `a::b::Name` at its last separator.
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once("::") {
            Some((module, name)) => Self::new(module, name),
            None => Self::new("", path),
        }
    }
}

impl From<String> for QuantityType {
    fn from(path: String) -> Self { Self::parse(&path) }
}

impl From<&str> for QuantityType {
    fn from(path: &str) -> Self { Self::parse(path) }
}

impl From<QuantityType> for String {
    fn from(ty: QuantityType) -> Self { ty.to_string() }
}

impl fmt::Display for QuantityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}::{}", self.module, self.name)
        }
    }
}

/// An ordered set of candidate dimensions.
///
/// Order is insertion order, which for groups is ascending; enumeration during
/// expansion follows it, so it must stay stable across set operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionSet(SmallVec<[Dimension; 4]>);

impl DimensionSet {
    pub fn empty() -> Self { Self::default() }

    pub fn single(dimension: Dimension) -> Self {
        let mut set = Self::default();
        set.0.push(dimension);
        set
    }

    pub fn len(&self) -> usize { self.0.len() }
    pub fn is_empty(&self) -> bool { self.0.is_empty() }
    pub fn contains(&self, dimension: Dimension) -> bool { self.0.contains(&dimension) }
    pub fn iter(&self) -> impl Iterator<Item = Dimension> + '_ { self.0.iter().copied() }

    /// The only element, or `None` if the set is empty or still holds a choice.
    pub fn as_single(&self) -> Option<Dimension> {
        match self.0.as_slice() {
            [dimension] => Some(*dimension),
            _ => None,
        }
    }

    /// Elements of `self` that are also in `other`, in `self`'s order.
    pub fn intersect(&self, other: &Self) -> Self {
        self.iter().filter(|d| other.contains(*d)).collect()
    }

    /// Elements of `self` followed by the elements of `other` not yet present.
    pub fn union(&self, other: &Self) -> Self {
        let mut set = self.clone();
        for dimension in other.iter() {
            if !set.contains(dimension) {
                set.0.push(dimension);
            }
        }
        set
    }
}

impl FromIterator<Dimension> for DimensionSet {
    fn from_iter<I: IntoIterator<Item = Dimension>>(iter: I) -> Self {
        let mut set = Self::default();
        for dimension in iter {
            if !set.contains(dimension) {
                set.0.push(dimension);
            }
        }
        set
    }
}

/// How the Operand Classifier sees a quantity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Scalar,
    /// A stand-alone vector quantity of a fixed dimension.
    FixedVector(Dimension),
    /// One concrete member of a group.
    GroupMember(Dimension),
    /// A dimension-polymorphic family, with its member for each dimension.
    Group(BTreeMap<Dimension, QuantityType>),
}

impl Classification {
    /// The dimensions a target of this classification accepts, if it is a vector.
    pub fn vector_dimensions(&self) -> Option<DimensionSet> {
        match self {
            Classification::Scalar => None,
            Classification::FixedVector(d) | Classification::GroupMember(d) => Some(DimensionSet::single(*d)),
            Classification::Group(members) => Some(members.keys().copied().collect()),
        }
    }
}

/// The resulting kind of an expression (sub)tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResultKind {
    Scalar,
    Vector,
    Invalid,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("kinematics::Speed", "kinematics", "Speed")]
    #[case("a::b::Length", "a::b", "Length")]
    #[case("Scalar", "", "Scalar")]
    fn test_quantity_type_parsing(#[case] path: &str, #[case] module: &str, #[case] name: &str) {
        let ty = QuantityType::parse(path);
        assert_eq!(ty.module, module);
        assert_eq!(ty.name, name);
        assert_eq!(ty.to_string(), path);
    }

    #[test]
    fn test_set_operations_keep_order() {
        let a: DimensionSet = [4, 2, 3].into_iter().collect();
        let b: DimensionSet = [3, 4].into_iter().collect();
        assert_eq!(a.intersect(&b).iter().collect::<Vec<_>>(), vec![4, 3]);
        assert_eq!(b.union(&a).iter().collect::<Vec<_>>(), vec![3, 4, 2]);
        assert_eq!(a.intersect(&DimensionSet::empty()).as_single(), None);
        assert_eq!(DimensionSet::single(3).as_single(), Some(3));
    }

    #[test]
    fn test_quantity_type_serializes_as_path() {
        let ty = QuantityType::new("geometry", "Position3");
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"geometry::Position3\"");
        assert_eq!(serde_json::from_str::<QuantityType>(&json).unwrap(), ty);
    }
}
