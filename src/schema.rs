/// Sheet and column-name constants for the feeding-assay workbooks.
/// Single source of truth - exported to Python via PyO3.

// ── Sheet names ─────────────────────────────────────────────────────────────
pub mod sheets {
    pub const OD: &str = "OD";
    pub const RESULTS: &str = "Results";
    pub const SUMMARY: &str = "Summary";
    pub const STANDARD_CURVE: &str = "Standard_Curve";
}

// ── Results table (one row per sample well) ─────────────────────────────────
pub mod results {
    pub const INDEX: &str = "Index";
    pub const GROUP: &str = "Group";
    pub const OD: &str = "OD";
    pub const CONCENTRATION: &str = "Concentration";
    pub const FOOD_INTAKE: &str = "Food intake";

    pub const ALL: [&str; 5] = [INDEX, GROUP, OD, CONCENTRATION, FOOD_INTAKE];
}

// ── Summary table (one row per group) ───────────────────────────────────────
pub mod summary {
    pub const GROUP: &str = "Group";
    pub const MEAN: &str = "Mean";
    pub const STD_DEV: &str = "Std Dev";
    pub const SAMPLES: &str = "Samples";

    pub const ALL: [&str; 4] = [GROUP, MEAN, STD_DEV, SAMPLES];
}

// ── Standard curve table ────────────────────────────────────────────────────
pub mod calibration {
    pub const OD: &str = "OD";
    pub const CONCENTRATION: &str = "Concentration";
    pub const BASELINE_OD: &str = "Baseline OD";

    pub const ALL: [&str; 3] = [OD, CONCENTRATION, BASELINE_OD];
}
