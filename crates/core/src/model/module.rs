use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One fixed unit of lesson content with an independently tracked
/// completion percent.
///
/// The set is closed at compile time so progress handling stays exhaustive,
/// even though the remote document may carry extra fields for future modules
/// (those are ignored on read).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKey {
    AcidBase,
    Titration,
    Redox,
    Bonding,
    Thermochemistry,
    Stoichiometry,
}

impl ModuleKey {
    /// All modules, in display order.
    pub const ALL: [ModuleKey; 6] = [
        ModuleKey::AcidBase,
        ModuleKey::Titration,
        ModuleKey::Redox,
        ModuleKey::Bonding,
        ModuleKey::Thermochemistry,
        ModuleKey::Stoichiometry,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModuleKey::AcidBase => "acid-base",
            ModuleKey::Titration => "titration",
            ModuleKey::Redox => "redox",
            ModuleKey::Bonding => "bonding",
            ModuleKey::Thermochemistry => "thermochemistry",
            ModuleKey::Stoichiometry => "stoichiometry",
        }
    }

    /// Field name of this module's percent in the remote per-user document.
    ///
    /// The same string doubles as the local cache key, so a cached value and
    /// its remote counterpart always refer to the same field.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            ModuleKey::AcidBase => "acidBaseProgress",
            ModuleKey::Titration => "titrationProgress",
            ModuleKey::Redox => "redoxProgress",
            ModuleKey::Bonding => "bondingProgress",
            ModuleKey::Thermochemistry => "thermochemistryProgress",
            ModuleKey::Stoichiometry => "stoichiometryProgress",
        }
    }

    /// Human-readable module title.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ModuleKey::AcidBase => "Acid & Base",
            ModuleKey::Titration => "Titration",
            ModuleKey::Redox => "Redox Reactions",
            ModuleKey::Bonding => "Chemical Bonding",
            ModuleKey::Thermochemistry => "Thermochemistry",
            ModuleKey::Stoichiometry => "Stoichiometry",
        }
    }
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown module key: {0}")]
pub struct ParseModuleKeyError(pub String);

impl FromStr for ModuleKey {
    type Err = ParseModuleKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|module| module.as_str() == s)
            .ok_or_else(|| ParseModuleKeyError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_str() {
        for module in ModuleKey::ALL {
            let parsed: ModuleKey = module.as_str().parse().unwrap();
            assert_eq!(parsed, module);
        }
    }

    #[test]
    fn rejects_unknown_key() {
        let err = "alchemy".parse::<ModuleKey>().unwrap_err();
        assert_eq!(err, ParseModuleKeyError("alchemy".into()));
    }

    #[test]
    fn field_names_are_distinct() {
        let mut names: Vec<_> = ModuleKey::ALL.iter().map(|m| m.field_name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), ModuleKey::ALL.len());
    }
}
