//! Strongly typed, zero-cost identifier wrappers.
//!
//! All IDs are `Copy + Ord + Hash` so they can be used as map keys and sorted
//! collection elements without ceremony.
//!
//! Two kinds of identifier live here and they behave differently:
//!
//! - `AgentId` and `ObstacleId` are **stable handles**: assigned from a
//!   monotonically increasing counter and never reused while the owning store
//!   lives.  They are resolved to a dense index through an [`IdMap`].
//! - `VertexId` **is** the dense index of an obstacle vertex.  It is only
//!   valid until the next obstacle removal (swap-remove moves the last vertex
//!   into the freed slot).

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID", equal to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Stable handle of a live agent.  Never reused while the simulator lives.
    pub struct AgentId(u32);
}

typed_id! {
    /// Stable handle of one polygon added with `add_obstacle`, shared by every
    /// vertex of that polygon, including vertices synthesised by edge splits.
    pub struct ObstacleId(u32);
}

typed_id! {
    /// Dense index of an obstacle vertex.  Not stable across removals.
    pub struct VertexId(u32);
}

/// Id → dense-index map used by the agent and obstacle registries.
#[cfg(not(feature = "fx-hash"))]
pub type IdMap<K, V> = std::collections::HashMap<K, V>;

/// Id → dense-index map used by the agent and obstacle registries.
#[cfg(feature = "fx-hash")]
pub type IdMap<K, V> = rustc_hash::FxHashMap<K, V>;
