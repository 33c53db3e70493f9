use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::CompatibilityEngine;
use crate::error::{BloodTypeError, Result};
use crate::registry::BloodTypeRegistry;
use crate::types::*;

lazy_static! {
    // "A+", "ab pos", "type O negative", "b minus", "nhóm máu O dương tính", "AB âm", ...
    // Vietnamese words are matched in precomposed (NFC) form, with or without diacritics.
    static ref SPOKEN_BLOOD_TYPE: Regex = Regex::new(
        r"(?i)^(?:blood\s+)?(?:type\s+)?(?:nhóm\s+)?(?:máu\s+)?(ab|a|b|o|0)\s*(\+|-|pos|positive|plus|neg|negative|minus|cộng|dương|cong|duong|trừ|âm|tru|am)(?:\s+(?:tính|tinh))?$"
    )
    .expect("blood type pattern is valid");
}

/// Parse free-form input (typed or transcribed speech) into a blood type.
///
/// Exact labels are tried first, then the lenient spoken forms.
pub fn parse_spoken(candidate: &str) -> Result<BloodType> {
    if let Ok(entity) = BloodTypeRegistry::find_by_id(candidate) {
        return Ok(entity.id);
    }

    let normalized = candidate.split_whitespace().collect::<Vec<_>>().join(" ");
    let caps = SPOKEN_BLOOD_TYPE
        .captures(&normalized)
        .ok_or_else(|| BloodTypeError::invalid(candidate))?;

    let abo = match caps[1].to_ascii_uppercase().as_str() {
        "O" | "0" => AboGroup::O,
        "A" => AboGroup::A,
        "B" => AboGroup::B,
        "AB" => AboGroup::AB,
        _ => return Err(BloodTypeError::invalid(candidate)),
    };

    let rh = match caps[2].to_lowercase().as_str() {
        "+" | "pos" | "positive" | "plus" | "cộng" | "dương" | "cong" | "duong" => {
            RhFactor::Positive
        }
        "-" | "neg" | "negative" | "minus" | "trừ" | "âm" | "tru" | "am" => RhFactor::Negative,
        _ => return Err(BloodTypeError::invalid(candidate)),
    };

    Ok(BloodType::from_parts(abo, rh))
}

/// Types to highlight for a selection: the raw compatible set minus the
/// selection itself.
pub fn highlighted_ids(selected: BloodType, mode: InteractionMode) -> Vec<BloodType> {
    CompatibilityEngine::new()
        .compatible_with(selected, mode)
        .matches
        .into_iter()
        .filter(|id| *id != selected)
        .collect()
}

/// Arrows between the selection and each highlighted type.
///
/// GIVE points from the selection outwards, RECEIVE points inwards.
pub fn connections(selected: BloodType, mode: InteractionMode) -> Vec<Connection> {
    highlighted_ids(selected, mode)
        .into_iter()
        .map(|other| match mode {
            InteractionMode::Give => Connection::new(selected, other),
            InteractionMode::Receive => Connection::new(other, selected),
        })
        .collect()
}

/// Caller-owned session state: the current selection and role
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Selection {
    selected: Option<BloodType>,
    mode: InteractionMode,
}

impl Selection {
    pub fn new(mode: InteractionMode) -> Self {
        Self {
            selected: None,
            mode,
        }
    }

    pub fn selected(&self) -> Option<BloodType> {
        self.selected
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InteractionMode) {
        debug!("Interaction mode set to {}", mode);
        self.mode = mode;
    }

    /// Click behaviour: selecting the current type again clears it
    pub fn toggle(&mut self, id: BloodType) {
        if self.selected == Some(id) {
            debug!("Deselected {}", id);
            self.selected = None;
        } else {
            self.select(id);
        }
    }

    pub fn select(&mut self, id: BloodType) {
        debug!("Selected {} ({})", id, self.mode);
        self.selected = Some(id);
    }

    /// Validate external input before selecting.
    ///
    /// Unrecognized input leaves the current selection untouched.
    pub fn select_str(&mut self, candidate: &str) -> Result<BloodType> {
        match parse_spoken(candidate) {
            Ok(id) => {
                self.select(id);
                Ok(id)
            }
            Err(e) => {
                warn!("Ignoring selection: {}", e);
                Err(e)
            }
        }
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn highlighted(&self) -> Vec<BloodType> {
        self.selected
            .map(|id| highlighted_ids(id, self.mode))
            .unwrap_or_default()
    }

    pub fn connections(&self) -> Vec<Connection> {
        self.selected
            .map(|id| connections(id, self.mode))
            .unwrap_or_default()
    }

    pub fn is_highlighted(&self, id: BloodType) -> bool {
        self.highlighted().contains(&id)
    }
}
