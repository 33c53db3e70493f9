use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BloodTypeError;
use crate::registry::BloodTypeRegistry;

/// ABO antigen group
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AboGroup {
    O,
    A,
    B,
    AB,
}

impl AboGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AboGroup::O => "O",
            AboGroup::A => "A",
            AboGroup::B => "B",
            AboGroup::AB => "AB",
        }
    }

    /// Red-cell antigens carried by this group
    pub fn antigens(&self) -> &'static [&'static str] {
        match self {
            AboGroup::O => &[],
            AboGroup::A => &["A"],
            AboGroup::B => &["B"],
            AboGroup::AB => &["A", "B"],
        }
    }

    /// Plasma antibodies carried by this group
    pub fn antibodies(&self) -> &'static [&'static str] {
        match self {
            AboGroup::O => &["anti-A", "anti-B"],
            AboGroup::A => &["anti-B"],
            AboGroup::B => &["anti-A"],
            AboGroup::AB => &[],
        }
    }
}

impl fmt::Display for AboGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Presence (positive) or absence (negative) of the Rh(D) antigen
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RhFactor {
    Positive,
    Negative,
}

impl RhFactor {
    pub fn sign(&self) -> char {
        match self {
            RhFactor::Positive => '+',
            RhFactor::Negative => '-',
        }
    }

    pub fn is_positive(&self) -> bool {
        matches!(self, RhFactor::Positive)
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, RhFactor::Negative)
    }
}

impl fmt::Display for RhFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RhFactor::Positive => f.write_str("positive"),
            RhFactor::Negative => f.write_str("negative"),
        }
    }
}

/// One of the eight clinically distinguished blood types.
///
/// Variant order is the canonical registry order and is relied upon
/// for indexing into [`BloodTypeRegistry::all`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BloodType {
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "AB-")]
    ABNegative,
    #[serde(rename = "AB+")]
    ABPositive,
}

impl BloodType {
    pub const COUNT: usize = 8;

    pub const fn from_parts(abo: AboGroup, rh: RhFactor) -> Self {
        match (abo, rh) {
            (AboGroup::O, RhFactor::Negative) => BloodType::ONegative,
            (AboGroup::O, RhFactor::Positive) => BloodType::OPositive,
            (AboGroup::A, RhFactor::Negative) => BloodType::ANegative,
            (AboGroup::A, RhFactor::Positive) => BloodType::APositive,
            (AboGroup::B, RhFactor::Negative) => BloodType::BNegative,
            (AboGroup::B, RhFactor::Positive) => BloodType::BPositive,
            (AboGroup::AB, RhFactor::Negative) => BloodType::ABNegative,
            (AboGroup::AB, RhFactor::Positive) => BloodType::ABPositive,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BloodType::ONegative => "O-",
            BloodType::OPositive => "O+",
            BloodType::ANegative => "A-",
            BloodType::APositive => "A+",
            BloodType::BNegative => "B-",
            BloodType::BPositive => "B+",
            BloodType::ABNegative => "AB-",
            BloodType::ABPositive => "AB+",
        }
    }

    /// Position in canonical registry order
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn entity(&self) -> &'static BloodTypeEntity {
        BloodTypeRegistry::get(*self)
    }

    pub fn abo(&self) -> AboGroup {
        self.entity().abo_group
    }

    pub fn rh(&self) -> RhFactor {
        self.entity().rh_factor
    }

    /// Same ABO group with the given Rh factor
    pub fn with_rh(&self, rh: RhFactor) -> Self {
        BloodType::from_parts(self.abo(), rh)
    }

    pub fn all() -> impl Iterator<Item = BloodType> {
        BloodTypeRegistry::all().iter().map(|entity| entity.id)
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BloodType {
    type Err = BloodTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BloodTypeRegistry::find_by_id(s).map(|entity| entity.id)
    }
}

/// Registry record: the id plus its structured ABO/Rh attributes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BloodTypeEntity {
    pub id: BloodType,
    pub abo_group: AboGroup,
    pub rh_factor: RhFactor,
}

impl BloodTypeEntity {
    pub const fn new(abo_group: AboGroup, rh_factor: RhFactor) -> Self {
        Self {
            id: BloodType::from_parts(abo_group, rh_factor),
            abo_group,
            rh_factor,
        }
    }

    pub fn label(&self) -> &'static str {
        self.id.label()
    }
}

/// Role the selected blood type plays in a query
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Selected type is the donor; find its recipients
    #[default]
    Give,
    /// Selected type is the recipient; find its donors
    Receive,
}

impl InteractionMode {
    pub fn toggled(&self) -> Self {
        match self {
            InteractionMode::Give => InteractionMode::Receive,
            InteractionMode::Receive => InteractionMode::Give,
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            InteractionMode::Give => "donor",
            InteractionMode::Receive => "recipient",
        }
    }

    pub fn counterpart_role(&self) -> &'static str {
        self.toggled().role()
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionMode::Give => f.write_str("GIVE"),
            InteractionMode::Receive => f.write_str("RECEIVE"),
        }
    }
}

/// Directed donor -> recipient edge
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: BloodType,
    pub to: BloodType,
}

impl Connection {
    pub fn new(from: BloodType, to: BloodType) -> Self {
        Self { from, to }
    }
}

/// Compatible counterparts of one blood type in one role
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompatibilityResult {
    pub subject: BloodType,
    pub mode: InteractionMode,
    pub matches: Vec<BloodType>,
}

impl CompatibilityResult {
    pub fn contains(&self, id: BloodType) -> bool {
        self.matches.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.matches.iter().map(BloodType::label).collect()
    }
}
