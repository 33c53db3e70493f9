use crate::error::{BloodTypeError, Result};
use crate::types::{AboGroup, BloodType, BloodTypeEntity, RhFactor};

/// The eight blood types in canonical order: grouped by ABO,
/// negative before positive within each group.
static BLOOD_TYPES: [BloodTypeEntity; BloodType::COUNT] = [
    BloodTypeEntity::new(AboGroup::O, RhFactor::Negative),
    BloodTypeEntity::new(AboGroup::O, RhFactor::Positive),
    BloodTypeEntity::new(AboGroup::A, RhFactor::Negative),
    BloodTypeEntity::new(AboGroup::A, RhFactor::Positive),
    BloodTypeEntity::new(AboGroup::B, RhFactor::Negative),
    BloodTypeEntity::new(AboGroup::B, RhFactor::Positive),
    BloodTypeEntity::new(AboGroup::AB, RhFactor::Negative),
    BloodTypeEntity::new(AboGroup::AB, RhFactor::Positive),
];

/// Immutable source of truth for all blood-type entities
pub struct BloodTypeRegistry;

impl BloodTypeRegistry {
    pub fn all() -> &'static [BloodTypeEntity] {
        &BLOOD_TYPES
    }

    pub fn get(id: BloodType) -> &'static BloodTypeEntity {
        &BLOOD_TYPES[id.index()]
    }

    /// Look up an entity by its exact label (e.g. `"AB+"`).
    ///
    /// Surrounding whitespace is ignored; anything else that is not one of
    /// the eight labels is rejected as [`BloodTypeError::InvalidIdentifier`].
    pub fn find_by_id(id: &str) -> Result<&'static BloodTypeEntity> {
        let candidate = id.trim();
        BLOOD_TYPES
            .iter()
            .find(|entity| entity.label() == candidate)
            .ok_or_else(|| BloodTypeError::invalid(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_canonical_order() {
        let labels: Vec<&str> = BloodTypeRegistry::all()
            .iter()
            .map(|entity| entity.label())
            .collect();
        assert_eq!(
            labels,
            vec!["O-", "O+", "A-", "A+", "B-", "B+", "AB-", "AB+"]
        );
    }

    #[test]
    fn test_exactly_eight_unique_entities() {
        let all = BloodTypeRegistry::all();
        assert_eq!(all.len(), 8);

        let ids: HashSet<BloodType> = all.iter().map(|entity| entity.id).collect();
        assert_eq!(ids.len(), 8);

        let parts: HashSet<(AboGroup, RhFactor)> = all
            .iter()
            .map(|entity| (entity.abo_group, entity.rh_factor))
            .collect();
        assert_eq!(parts.len(), 8);
    }

    #[test]
    fn test_get_agrees_with_index() {
        for (index, entity) in BloodTypeRegistry::all().iter().enumerate() {
            assert_eq!(entity.id.index(), index);
            assert_eq!(BloodTypeRegistry::get(entity.id), entity);
        }
    }

    #[test]
    fn test_find_by_id() -> anyhow::Result<()> {
        let entity = BloodTypeRegistry::find_by_id("AB-")?;
        assert_eq!(entity.id, BloodType::ABNegative);
        assert_eq!(entity.abo_group, AboGroup::AB);
        assert_eq!(entity.rh_factor, RhFactor::Negative);

        let padded = BloodTypeRegistry::find_by_id("  O+ ")?;
        assert_eq!(padded.id, BloodType::OPositive);

        Ok(())
    }

    #[test]
    fn test_find_by_id_rejects_unknown() {
        for candidate in ["", "C+", "AB", "o-", "A plus", "O--", "ABO+"] {
            assert_eq!(
                BloodTypeRegistry::find_by_id(candidate),
                Err(BloodTypeError::InvalidIdentifier(candidate.to_string()))
            );
        }
    }
}
