use serde::{Deserialize, Serialize};

use crate::registry::BloodTypeRegistry;
use crate::types::*;

/// ABO/Rh donation rule evaluator.
///
/// Stateless: every method is a total function over the eight blood types.
#[derive(Debug, Default, Clone, Copy)]
pub struct CompatibilityEngine;

impl CompatibilityEngine {
    pub fn new() -> Self {
        Self
    }

    /// Whether `donor` may give blood to `recipient`.
    ///
    /// Both the Rh rule and the ABO rule must hold. Every type is
    /// compatible with itself.
    pub fn can_donate(&self, donor: BloodType, recipient: BloodType) -> bool {
        let donor = donor.entity();
        let recipient = recipient.entity();

        self.rh_compatible(donor.rh_factor, recipient.rh_factor)
            && self.abo_compatible(donor.abo_group, recipient.abo_group)
    }

    /// Rh+ blood cannot go to an Rh- recipient
    pub fn rh_compatible(&self, donor: RhFactor, recipient: RhFactor) -> bool {
        donor.is_negative() || recipient.is_positive()
    }

    pub fn abo_compatible(&self, donor: AboGroup, recipient: AboGroup) -> bool {
        match donor {
            AboGroup::O => true,
            AboGroup::A => matches!(recipient, AboGroup::A | AboGroup::AB),
            AboGroup::B => matches!(recipient, AboGroup::B | AboGroup::AB),
            AboGroup::AB => recipient == AboGroup::AB,
        }
    }

    /// Every type `donor` can give to, in registry order (includes `donor`)
    pub fn recipients_for(&self, donor: BloodType) -> Vec<BloodType> {
        BloodTypeRegistry::all()
            .iter()
            .filter(|recipient| self.can_donate(donor, recipient.id))
            .map(|recipient| recipient.id)
            .collect()
    }

    /// Every type `recipient` can receive from, in registry order (includes `recipient`)
    pub fn donors_for(&self, recipient: BloodType) -> Vec<BloodType> {
        BloodTypeRegistry::all()
            .iter()
            .filter(|donor| self.can_donate(donor.id, recipient))
            .map(|donor| donor.id)
            .collect()
    }

    /// Raw compatible set for a selection: recipients in GIVE mode, donors in RECEIVE mode
    pub fn compatible_with(&self, subject: BloodType, mode: InteractionMode) -> CompatibilityResult {
        let matches = match mode {
            InteractionMode::Give => self.recipients_for(subject),
            InteractionMode::Receive => self.donors_for(subject),
        };

        CompatibilityResult {
            subject,
            mode,
            matches,
        }
    }

    pub fn is_universal_donor(&self, id: BloodType) -> bool {
        self.recipients_for(id).len() == BloodType::COUNT
    }

    pub fn is_universal_recipient(&self, id: BloodType) -> bool {
        self.donors_for(id).len() == BloodType::COUNT
    }

    pub fn chart(&self) -> CompatibilityChart {
        let rows = BloodType::all()
            .map(|donor| ChartRow {
                donor,
                compatible: BloodType::all()
                    .map(|recipient| self.can_donate(donor, recipient))
                    .collect(),
            })
            .collect();

        CompatibilityChart { rows }
    }
}

/// Full donor x recipient matrix, both axes in registry order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompatibilityChart {
    pub rows: Vec<ChartRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChartRow {
    pub donor: BloodType,
    /// One entry per recipient, indexed by [`BloodType::index`]
    pub compatible: Vec<bool>,
}

impl CompatibilityChart {
    pub fn recipients(&self) -> Vec<BloodType> {
        BloodType::all().collect()
    }

    pub fn get(&self, donor: BloodType, recipient: BloodType) -> bool {
        self.rows[donor.index()].compatible[recipient.index()]
    }

    pub fn compatible_pair_count(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.compatible.iter().filter(|&&ok| ok).count())
            .sum()
    }
}
