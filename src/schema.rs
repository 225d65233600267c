//! Column-name constants.
//! Single source of truth for the input contract and the exported views.

// ── Trade source columns ────────────────────────────────────────────────────
pub mod trade {
    pub const AREA_CODE: &str = "Area Code (M49)";
    pub const AREA: &str = "Area";
    pub const YEAR: &str = "Year";
    pub const IMPORT: &str = "Import";
    /// The raw export header carries a trailing space.
    pub const EXPORT: &str = "Export ";
    pub const PRODUCTION: &str = "Production";
    pub const CONSUMPTION: &str = "Consumption";
    pub const UNIT: &str = "Unit";

    pub const REQUIRED: [&str; 8] = [
        AREA_CODE,
        AREA,
        YEAR,
        IMPORT,
        EXPORT,
        PRODUCTION,
        CONSUMPTION,
        UNIT,
    ];
}

// ── Reference source columns ────────────────────────────────────────────────
pub mod reference {
    pub const NUMERIC_CODE: &str = "Numeric code";
    pub const ALPHA3_CODE: &str = "Alpha-3 code";

    pub const REQUIRED: [&str; 2] = [NUMERIC_CODE, ALPHA3_CODE];
}

// ── Canonical columns (exported views) ──────────────────────────────────────
pub mod canonical {
    pub const AREA: &str = "Area";
    pub const CONTINENT: &str = "Continent";
    pub const ISO3: &str = "ISO-3";
    pub const YEAR: &str = "Year";
    pub const IMPORT: &str = "Import";
    pub const EXPORT: &str = "Export";
    pub const PRODUCTION: &str = "Production";
    pub const CONSUMPTION: &str = "Consumption";
    pub const NET_TRADE: &str = "Net Trade";
    pub const SELF_SUFFICIENCY_RATIO: &str = "Self-Sufficiency Ratio";

    /// Suffix appended to a metric name for its world-rank column.
    pub const RANK_SUFFIX: &str = "_Rank";
}

// ── Export file names ───────────────────────────────────────────────────────
pub mod files {
    pub const CANONICAL: &str = "map_data.csv";
    pub const CONTINENTAL: &str = "continental_data.csv";
    pub const WORLD_RANK: &str = "world_rank_data.csv";
}
