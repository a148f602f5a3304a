//! The two independent connection spaces.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// One of the two connection spaces, each owning its own graph.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ConnectionGroup {
    /// Cars, bicycles, trolleybuses.
    Road,
    /// Trains, trams, metro, monorail.
    Track,
}

impl ConnectionGroup {
    pub const ALL: [ConnectionGroup; 2] = [ConnectionGroup::Road, ConnectionGroup::Track];

    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionGroup::Road  => "road",
            ConnectionGroup::Track => "track",
        }
    }
}

impl fmt::Display for ConnectionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionGroup {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "road"  => Ok(ConnectionGroup::Road),
            "track" => Ok(ConnectionGroup::Track),
            other   => Err(CoreError::Parse(format!(
                "invalid connection group {other:?}: expected \"road\" or \"track\""
            ))),
        }
    }
}

/// Which group(s) a manager-level operation is addressed to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GroupSelector {
    Road,
    Track,
    /// Whichever groups support both lanes involved.
    #[default]
    All,
}

impl GroupSelector {
    #[inline]
    pub fn includes(self, group: ConnectionGroup) -> bool {
        matches!(
            (self, group),
            (GroupSelector::All, _)
                | (GroupSelector::Road, ConnectionGroup::Road)
                | (GroupSelector::Track, ConnectionGroup::Track)
        )
    }
}

impl From<ConnectionGroup> for GroupSelector {
    fn from(group: ConnectionGroup) -> Self {
        match group {
            ConnectionGroup::Road  => GroupSelector::Road,
            ConnectionGroup::Track => GroupSelector::Track,
        }
    }
}
