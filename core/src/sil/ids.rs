//! file: core/src/sil/ids.rs
//! description: typed arena indices for source-IR entities.
//!
//! Every entity of a `SilModule` lives in a per-module arena and is addressed
//! by one of these indices. Lowering keys its caches by these indices rather
//! than by object addresses, so two modules never share identities.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            pub fn index(self) -> usize {
                self.0 as usize
            }

            pub(crate) fn from_index(index: usize) -> Self {
                $name(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

arena_id!(FunctionId, "fn");
arena_id!(BlockId, "block");
arena_id!(InstId, "inst");
arena_id!(ValueId, "%");
