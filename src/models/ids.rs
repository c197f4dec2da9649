//! Strongly-typed ID wrappers for all entity types
//!
//! Identifiers are numeric and assigned by storage on first save. Newtype
//! wrappers keep a `BillId` from being passed where a `BankAccountId` belongs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::audit::FieldValue;

/// Raw numeric identifier shared by every table
pub type RecordId = i64;

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(RecordId);

        impl $name {
            /// Wrap a raw identifier
            pub const fn new(id: RecordId) -> Self {
                Self(id)
            }

            /// Get the raw identifier
            pub const fn get(&self) -> RecordId {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<RecordId> for $name {
            fn from(id: RecordId) -> Self {
                Self(id)
            }
        }

        impl From<$name> for RecordId {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<$name> for FieldValue {
            fn from(id: $name) -> Self {
                FieldValue::Int(id.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.trim().parse()?))
            }
        }
    };
}

define_id!(UserId);
define_id!(StatusId);
define_id!(RecurrenceId);
define_id!(CategoryId);
define_id!(BankAccountId);
define_id!(BankAccountInstanceId);
define_id!(BillId);
define_id!(DueBillId);
