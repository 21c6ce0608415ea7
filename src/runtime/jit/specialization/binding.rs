use std::fmt;

/// Quantifies how well a stored binding satisfies a requested one.
///
/// Scores are only comparable within one scoring scheme. The two sentinels
/// bound every scheme: [`MatchScore::MISMATCH`] means "never use this
/// specialization", [`MatchScore::MATCH`] means "perfect fit, stop searching".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatchScore(i32);

impl MatchScore {
    /// Total mismatch; the bindings are incompatible.
    pub const MISMATCH: Self = Self(i32::MIN);
    /// Perfect match; no better candidate can exist.
    pub const MATCH: Self = Self(i32::MAX);

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> i32 {
        self.0
    }

    pub const fn is_mismatch(self) -> bool {
        self.0 == i32::MIN
    }

    pub const fn is_match(self) -> bool {
        self.0 == i32::MAX
    }
}

impl Default for MatchScore {
    fn default() -> Self {
        Self::MISMATCH
    }
}

impl From<i32> for MatchScore {
    fn from(value: i32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MatchScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_mismatch() {
            f.write_str("mismatch")
        } else if self.is_match() {
            f.write_str("match")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Runtime parameters a specialization was generated for.
///
/// The relation is directional: the stored binding scores an incoming
/// request. Implementations must be deterministic for a fixed pair.
pub trait Binding {
    fn match_with(&self, requested: &Self) -> MatchScore;
}

/// Binding for functions without runtime parameters. Never matches.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NoBinding;

impl Binding for NoBinding {
    fn match_with(&self, _requested: &Self) -> MatchScore {
        MatchScore::MISMATCH
    }
}
