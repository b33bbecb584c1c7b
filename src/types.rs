//! Canonical key types for states and actions.
//!
//! Environments hand out states and actions as plain coordinate vectors. The
//! value table and the action space only ever store the canonical forms
//! defined here, and accept raw slices at their API boundary through
//! `AsRef<[i64]>`. Hashing and equality of a key are those of its coordinate
//! slice, so a lookup with `&[i64]` finds the entry stored under the key.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Leading coordinate of a state; selects which actions are legal.
pub type StageKey = i64;

macro_rules! coordinate_key {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Box<[i64]>);

        impl $name {
            /// Canonicalize any coordinate container.
            pub fn new(coords: impl AsRef<[i64]>) -> Self {
                Self(coords.as_ref().into())
            }

            /// Coordinates in order.
            pub fn coords(&self) -> &[i64] {
                &self.0
            }

            /// Number of coordinates.
            pub fn len(&self) -> usize {
                self.0.len()
            }

            /// Whether the key has no coordinates.
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            /// Owned coordinate vector, e.g. to hand back to an environment.
            pub fn to_vec(&self) -> Vec<i64> {
                self.0.to_vec()
            }
        }

        impl AsRef<[i64]> for $name {
            fn as_ref(&self) -> &[i64] {
                &self.0
            }
        }

        impl Borrow<[i64]> for $name {
            fn borrow(&self) -> &[i64] {
                &self.0
            }
        }

        impl From<Vec<i64>> for $name {
            fn from(coords: Vec<i64>) -> Self {
                Self(coords.into_boxed_slice())
            }
        }

        impl From<&[i64]> for $name {
            fn from(coords: &[i64]) -> Self {
                Self(coords.into())
            }
        }

        impl<const N: usize> From<[i64; N]> for $name {
            fn from(coords: [i64; N]) -> Self {
                Self(Box::new(coords))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "(")?;
                for (i, value) in self.0.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{value}")?;
                }
                write!(f, ")")
            }
        }
    };
}

coordinate_key!(
    /// Immutable, hashable form of an environment state.
    StateKey
);

coordinate_key!(
    /// Immutable, hashable form of an action.
    ActionKey
);

impl StateKey {
    /// Stage key of this state.
    pub fn stage(&self) -> Result<StageKey> {
        stage_key(&self.0)
    }
}

/// Leading coordinate of a raw or canonical state.
///
/// # Errors
///
/// Returns [`Error::EmptyState`] for a state without coordinates.
pub fn stage_key(state: impl AsRef<[i64]>) -> Result<StageKey> {
    state.as_ref().first().copied().ok_or(Error::EmptyState)
}

#[cfg(test)]
mod tests {
    use std::{
        collections::hash_map::DefaultHasher,
        hash::{Hash, Hasher},
    };

    use super::*;

    fn hash_of<T: Hash + ?Sized>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_key_hash_matches_slice_hash() {
        let key = StateKey::from(vec![3, 1, 4]);
        let raw: &[i64] = &[3, 1, 4];
        assert_eq!(hash_of(&key), hash_of(raw));
    }

    #[test]
    fn test_container_forms_compare_equal() {
        let from_vec = ActionKey::from(vec![1, 0]);
        let from_array = ActionKey::from([1, 0]);
        let from_slice = ActionKey::new(&[1i64, 0][..]);
        assert_eq!(from_vec, from_array);
        assert_eq!(from_array, from_slice);
    }

    #[test]
    fn test_stage_key() {
        assert_eq!(stage_key([7, 2]).unwrap(), 7);
        assert_eq!(StateKey::from([2]).stage().unwrap(), 2);
        assert!(matches!(stage_key(Vec::<i64>::new()), Err(Error::EmptyState)));
    }

    #[test]
    fn test_display() {
        assert_eq!(StateKey::from([1, -2, 3]).to_string(), "(1, -2, 3)");
        assert_eq!(ActionKey::from(Vec::new()).to_string(), "()");
    }
}
