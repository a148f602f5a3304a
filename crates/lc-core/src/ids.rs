//! Host-issued identifiers for lanes, segments and nodes.
//!
//! The connector never interprets an id beyond equality, ordering and
//! hashing; the host decides what the numbers mean.  Each id reserves its
//! inner type's `MAX` as the `INVALID` sentinel, which is also the
//! `Default`, so an id that was never assigned can't pass for a real one.

use std::fmt;
use std::num::TryFromIntError;

/// Declare one or more id newtypes over unsigned integers.
macro_rules! typed_ids {
    ($( $(#[$attr:meta])* $name:ident($inner:ty); )+) => {$(
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        pub struct $name(pub $inner);

        impl $name {
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Position in a host array indexed by this id.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }

            #[inline]
            pub const fn is_invalid(self) -> bool {
                self.0 == <$inner>::MAX
            }
        }

        impl Default for $name {
            #[inline]
            fn default() -> Self {
                $name::INVALID
            }
        }

        impl TryFrom<usize> for $name {
            type Error = TryFromIntError;

            #[inline]
            fn try_from(index: usize) -> Result<Self, Self::Error> {
                Ok($name(<$inner>::try_from(index)?))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(concat!(stringify!($name), "("))?;
                fmt::Display::fmt(&self.0, f)?;
                f.write_str(")")
            }
        }
    )+};
}

typed_ids! {
    /// One traffic-carrying strand of a segment.  Lanes outnumber everything
    /// else in a city, hence 32 bits.
    LaneId(u32);

    /// A stretch of road or rail between two nodes.
    SegmentId(u16);

    /// A junction point where segments meet.
    NodeId(u16);
}
