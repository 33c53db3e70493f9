use serde::{Deserialize, Serialize};

use crate::analysis::CompatibilityEngine;
use crate::selection::highlighted_ids;
use crate::types::*;

const SELECTION_PROMPT: &str = "Select a blood type to see how it gives and receives.";

/// Deterministic ABO/Rh facts about a selection, plus a short summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Explanation {
    pub selected: BloodType,
    pub mode: InteractionMode,
    pub abo_group: AboGroup,
    pub rh_factor: RhFactor,
    pub compatible: Vec<BloodType>,
    pub highlighted: Vec<BloodType>,
    pub universal_donor: bool,
    pub universal_recipient: bool,
    pub summary: String,
}

impl Explanation {
    /// Text shown while nothing is selected
    pub fn prompt() -> &'static str {
        SELECTION_PROMPT
    }

    pub fn for_selection(selected: BloodType, mode: InteractionMode) -> Self {
        let engine = CompatibilityEngine::new();
        let entity = selected.entity();
        let compatible = engine.compatible_with(selected, mode).matches;
        let highlighted = highlighted_ids(selected, mode);

        let universal_donor = engine.is_universal_donor(selected);
        let universal_recipient = engine.is_universal_recipient(selected);

        let summary = [
            rh_sentence(selected, mode),
            abo_sentence(entity.abo_group, mode),
            outcome_sentence(selected, mode, &highlighted, universal_donor, universal_recipient),
        ]
        .join(" ");

        Self {
            selected,
            mode,
            abo_group: entity.abo_group,
            rh_factor: entity.rh_factor,
            compatible,
            highlighted,
            universal_donor,
            universal_recipient,
            summary,
        }
    }
}

fn rh_sentence(selected: BloodType, mode: InteractionMode) -> String {
    match (selected.rh(), mode) {
        (RhFactor::Negative, InteractionMode::Give) => format!(
            "{} is Rh-negative: its cells carry no D antigen, so it can go to both Rh-negative and Rh-positive recipients.",
            selected
        ),
        (RhFactor::Positive, InteractionMode::Give) => format!(
            "{} is Rh-positive: its cells carry the D antigen, so it can only go to Rh-positive recipients.",
            selected
        ),
        (RhFactor::Negative, InteractionMode::Receive) => format!(
            "{} is Rh-negative: it must only receive Rh-negative blood to avoid forming anti-D antibodies.",
            selected
        ),
        (RhFactor::Positive, InteractionMode::Receive) => format!(
            "{} is Rh-positive: it already carries the D antigen, so it can receive both Rh-positive and Rh-negative blood.",
            selected
        ),
    }
}

fn abo_sentence(abo: AboGroup, mode: InteractionMode) -> String {
    match mode {
        InteractionMode::Give if abo.antigens().is_empty() => format!(
            "Group {} cells carry no A or B antigens, so no recipient antibodies can react with them.",
            abo
        ),
        InteractionMode::Give => format!(
            "Group {} cells carry the {} antigen{}, so the recipient's plasma must not contain anti-{}.",
            abo,
            abo.antigens().join(" and "),
            if abo.antigens().len() > 1 { "s" } else { "" },
            abo.antigens().join(" or anti-")
        ),
        InteractionMode::Receive if abo.antibodies().is_empty() => format!(
            "Group {} plasma contains no anti-A or anti-B antibodies, so it accepts cells of every ABO group.",
            abo
        ),
        InteractionMode::Receive => {
            let targets: Vec<&str> = abo
                .antibodies()
                .iter()
                .map(|antibody| antibody.trim_start_matches("anti-"))
                .collect();
            format!(
                "Group {} plasma contains {}, which rules out donor cells carrying the {} antigen.",
                abo,
                abo.antibodies().join(" and "),
                targets.join(" or ")
            )
        }
    }
}

fn outcome_sentence(
    selected: BloodType,
    mode: InteractionMode,
    highlighted: &[BloodType],
    universal_donor: bool,
    universal_recipient: bool,
) -> String {
    if mode == InteractionMode::Give && universal_donor {
        return format!("{} is the universal donor and can give to every other type.", selected);
    }
    if mode == InteractionMode::Receive && universal_recipient {
        return format!(
            "{} is the universal recipient and can receive from every other type.",
            selected
        );
    }
    if highlighted.is_empty() {
        return format!(
            "Apart from itself, {} has no compatible {}.",
            selected,
            mode.counterpart_role()
        );
    }

    let labels: Vec<&str> = highlighted.iter().map(BloodType::label).collect();
    let verb = match mode {
        InteractionMode::Give => "can give to",
        InteractionMode::Receive => "can receive from",
    };
    format!("Besides itself, {} {} {}.", selected, verb, labels.join(", "))
}
