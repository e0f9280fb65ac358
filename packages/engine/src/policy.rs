//! Sensitivity classification for detected entity labels.
//!
//! A static, total policy: every label maps to a tier, unknown labels
//! default to tier 1. No side effects, no failure mode.

/// Lowest tier — encrypted only when a caller asks for everything.
pub const TIER_LOW: u8 = 1;
/// Medium tier — contact details, network identifiers.
pub const TIER_MEDIUM: u8 = 2;
/// Highest tier — government IDs, financial and medical data.
pub const TIER_HIGH: u8 = 3;

/// Map an entity label to its sensitivity tier.
///
/// The table is fixed for the lifetime of the process. Labels are the
/// detector's fixed vocabulary; anything unrecognized is tier 1.
pub fn classify(label: &str) -> u8 {
    match label {
        // High sensitivity
        "SSN" | "CREDITCARD" | "ID_NUMBER" | "FINANCIAL" | "MEDICAL" => TIER_HIGH,

        // Medium sensitivity
        "EMAIL" | "PHONE" | "ADDRESS" | "DATE" | "IP_ADDRESS" | "URL" => TIER_MEDIUM,

        // Low sensitivity, and the default for unknown labels
        "PERSON" | "LOCATION" | "ORGANIZATION" | "USERNAME" | "TIME" | "MISC" => TIER_LOW,
        _ => TIER_LOW,
    }
}
