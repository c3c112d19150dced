use std::sync::LazyLock;

use regex::Regex;

use crate::config::confidence_levels;
use crate::model::record::DischargeDestination;

static RE_DESTINATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)discharged?\s+(?:to|home\s+with)\s+([A-Za-z][A-Za-z /-]{2,60})").unwrap()
});

const KNOWN_DESTINATIONS: &[&str] = &[
    "home", "home with services", "home with home health", "acute rehabilitation",
    "acute rehab", "skilled nursing facility", "snf", "subacute rehab", "long-term acute care",
    "ltac", "hospice", "another facility", "inpatient rehabilitation",
];

/// Normalize a matched destination phrase against the known-destination
/// vocabulary; falls back to the trimmed raw phrase so an unusual but
/// clearly-stated destination is not dropped (§4.6).
fn normalize_destination(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('.').to_string();
    let lower = trimmed.to_lowercase();
    KNOWN_DESTINATIONS
        .iter()
        .find(|known| lower.starts_with(*known))
        .map(|known| known.to_string())
        .unwrap_or(trimmed)
}

/// Extract the discharge destination (§4.6): the first "discharged to/home
/// with ..." phrase in the note.
pub fn extract_discharge_destination(text: &str) -> Option<DischargeDestination> {
    RE_DESTINATION.captures(text).map(|c| DischargeDestination {
        destination: normalize_destination(&c[1]),
        confidence: confidence_levels::HIGH,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_home_destination() {
        let d = extract_discharge_destination("Patient was discharged to home in stable condition.").unwrap();
        assert_eq!(d.destination, "home");
    }

    #[test]
    fn extracts_rehab_facility() {
        let d = extract_discharge_destination("Discharged to acute rehabilitation for continued therapy.").unwrap();
        assert_eq!(d.destination, "acute rehabilitation");
    }

    #[test]
    fn no_destination_mentioned_yields_none() {
        assert!(extract_discharge_destination("Patient remains admitted.").is_none());
    }
}
