//! Step descriptors.
//!
//! Each category owns an ordered descriptor list interpreted by the engine;
//! step 0 is category selection for every category, and indices 1..N map into
//! the list. The two multi-select checklists carry an exclusive "none/unknown"
//! sentinel that clears the other selections and auto-advances.

use super::counties;
use crate::models::JobCategory;

/// Field names used by the step descriptors and the submission payload.
pub mod field {
    pub const PROPERTY_TYPE: &str = "property_type";
    pub const BEDROOMS: &str = "bedrooms";
    pub const FEATURES: &str = "features";
    pub const BUILDING_TYPE: &str = "building_type";
    pub const FLOOR_AREA: &str = "floor_area";
    pub const BUILDING_SYSTEMS: &str = "building_systems";
    pub const DOCUMENTS: &str = "documents";
    pub const COUNTY: &str = "county";
    pub const TIMEFRAME: &str = "timeframe";
}

/// Exclusive sentinel options for the multi-select checklists.
pub mod sentinel {
    pub const NO_FEATURES: &str = "None of these";
    pub const SYSTEMS_UNKNOWN: &str = "Not sure";
    pub const NO_DOCUMENTS: &str = "None available";
}

/// Kind of a data-collection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    /// Single choice; advances automatically on selection.
    Select {
        field: &'static str,
        options: &'static [&'static str],
    },
    /// Checklist; advances only via the forward control, except when the
    /// exclusive sentinel is picked.
    MultiSelect {
        field: &'static str,
        options: &'static [&'static str],
        exclusive: &'static str,
    },
    /// Final contact-details step.
    Contact,
}

/// One step in a category's sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepDescriptor {
    pub kind: StepKind,
    pub label: &'static str,
}

const TIMEFRAMES: &[&str] = &[
    "As soon as possible",
    "Within 2 weeks",
    "Within a month",
    "Just researching",
];

const DOMESTIC_STEPS: &[StepDescriptor] = &[
    StepDescriptor {
        label: "Property type",
        kind: StepKind::Select {
            field: field::PROPERTY_TYPE,
            options: &[
                "Detached house",
                "Semi-detached house",
                "Terraced house",
                "Apartment",
                "Bungalow",
            ],
        },
    },
    StepDescriptor {
        label: "Bedrooms",
        kind: StepKind::Select {
            field: field::BEDROOMS,
            options: &["1", "2", "3", "4", "5+"],
        },
    },
    StepDescriptor {
        label: "Property features",
        kind: StepKind::MultiSelect {
            field: field::FEATURES,
            options: &[
                "Solar panels",
                "Heat pump",
                "Extension",
                "Converted attic",
                "Open fireplace",
                sentinel::NO_FEATURES,
            ],
            exclusive: sentinel::NO_FEATURES,
        },
    },
    StepDescriptor {
        label: "County",
        kind: StepKind::Select {
            field: field::COUNTY,
            options: counties::COUNTIES,
        },
    },
    StepDescriptor {
        label: "Timeframe",
        kind: StepKind::Select {
            field: field::TIMEFRAME,
            options: TIMEFRAMES,
        },
    },
    StepDescriptor {
        label: "Contact details",
        kind: StepKind::Contact,
    },
];

const COMMERCIAL_STEPS: &[StepDescriptor] = &[
    StepDescriptor {
        label: "Building type",
        kind: StepKind::Select {
            field: field::BUILDING_TYPE,
            options: &[
                "Office",
                "Retail unit",
                "Warehouse",
                "Hospitality",
                "Mixed use",
            ],
        },
    },
    StepDescriptor {
        label: "Floor area",
        kind: StepKind::Select {
            field: field::FLOOR_AREA,
            options: &[
                "Under 100 sqm",
                "100–500 sqm",
                "500–1,000 sqm",
                "1,000–5,000 sqm",
                "Over 5,000 sqm",
            ],
        },
    },
    StepDescriptor {
        label: "Building systems",
        kind: StepKind::MultiSelect {
            field: field::BUILDING_SYSTEMS,
            options: &[
                "Gas heating",
                "Electric heating",
                "Air conditioning",
                "Mechanical ventilation",
                sentinel::SYSTEMS_UNKNOWN,
            ],
            exclusive: sentinel::SYSTEMS_UNKNOWN,
        },
    },
    StepDescriptor {
        label: "Available documents",
        kind: StepKind::MultiSelect {
            field: field::DOCUMENTS,
            options: &[
                "Floor plans",
                "Previous certificate",
                "Heating schedules",
                sentinel::NO_DOCUMENTS,
            ],
            exclusive: sentinel::NO_DOCUMENTS,
        },
    },
    StepDescriptor {
        label: "County",
        kind: StepKind::Select {
            field: field::COUNTY,
            options: counties::COUNTIES,
        },
    },
    StepDescriptor {
        label: "Timeframe",
        kind: StepKind::Select {
            field: field::TIMEFRAME,
            options: TIMEFRAMES,
        },
    },
    StepDescriptor {
        label: "Contact details",
        kind: StepKind::Contact,
    },
];

const ASSESSMENT_STEPS: &[StepDescriptor] = &[
    StepDescriptor {
        label: "Property type",
        kind: StepKind::Select {
            field: field::PROPERTY_TYPE,
            options: &[
                "Detached house",
                "Semi-detached house",
                "Terraced house",
                "Apartment",
                "Bungalow",
            ],
        },
    },
    StepDescriptor {
        label: "County",
        kind: StepKind::Select {
            field: field::COUNTY,
            options: counties::COUNTIES,
        },
    },
    StepDescriptor {
        label: "Timeframe",
        kind: StepKind::Select {
            field: field::TIMEFRAME,
            options: TIMEFRAMES,
        },
    },
    StepDescriptor {
        label: "Contact details",
        kind: StepKind::Contact,
    },
];

/// Data-collection steps for a category, excluding the category step itself.
pub fn step_sequence(category: JobCategory) -> &'static [StepDescriptor] {
    match category {
        JobCategory::Domestic => DOMESTIC_STEPS,
        JobCategory::Commercial => COMMERCIAL_STEPS,
        JobCategory::AssessmentOnly => ASSESSMENT_STEPS,
    }
}

/// Total step count including the category step at index 0.
pub fn total_steps(category: JobCategory) -> usize {
    1 + step_sequence(category).len()
}

/// Descriptor at `index` within a category's sequence. `None` for the
/// category step (index 0) and out-of-bounds indices.
pub fn descriptor_at(category: JobCategory, index: usize) -> Option<&'static StepDescriptor> {
    if index == 0 {
        return None;
    }
    step_sequence(category).get(index - 1)
}
