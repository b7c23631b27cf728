//! Static county list and postal-routing prefix lookup.
//!
//! Selecting a county derives a default routing prefix into the postcode
//! field (when still empty), and the contact-step gate requires the entered
//! postcode to start with the county's prefix when one is known. Dublin has
//! no single routing key, so it carries no prefix.

/// County options in display order.
pub const COUNTIES: &[&str] = &[
    "Carlow",
    "Cavan",
    "Clare",
    "Cork",
    "Donegal",
    "Dublin",
    "Galway",
    "Kerry",
    "Kildare",
    "Kilkenny",
    "Laois",
    "Leitrim",
    "Limerick",
    "Longford",
    "Louth",
    "Mayo",
    "Meath",
    "Monaghan",
    "Offaly",
    "Roscommon",
    "Sligo",
    "Tipperary",
    "Waterford",
    "Westmeath",
    "Wexford",
    "Wicklow",
];

/// Routing prefix for a county, if one is known.
pub fn routing_prefix(county: &str) -> Option<&'static str> {
    match county {
        "Carlow" => Some("R93"),
        "Cavan" => Some("H12"),
        "Clare" => Some("V95"),
        "Cork" => Some("T12"),
        "Donegal" => Some("F92"),
        "Galway" => Some("H91"),
        "Kerry" => Some("V92"),
        "Kildare" => Some("W12"),
        "Kilkenny" => Some("R95"),
        "Laois" => Some("R32"),
        "Leitrim" => Some("N41"),
        "Limerick" => Some("V94"),
        "Longford" => Some("N39"),
        "Louth" => Some("A91"),
        "Mayo" => Some("F23"),
        "Meath" => Some("C15"),
        "Monaghan" => Some("H18"),
        "Offaly" => Some("R35"),
        "Roscommon" => Some("F42"),
        "Sligo" => Some("F91"),
        "Tipperary" => Some("E91"),
        "Waterford" => Some("X91"),
        "Westmeath" => Some("N91"),
        "Wexford" => Some("Y35"),
        "Wicklow" => Some("A63"),
        _ => None,
    }
}
