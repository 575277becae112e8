/// Multiplier from lakhs to rupees
pub const LAKH: i64 = 100_000;

/// Placeholder rendered for any missing display value
pub const DISPLAY_FALLBACK: &str = "N/A";

/// Prefix of locally generated ids for sub-records awaiting confirmation
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Default page size for search requests
pub const DEFAULT_HITS_PER_PAGE: usize = 20;

/// Upper bound accepted for a search page size
pub const MAX_HITS_PER_PAGE: usize = 1000;

/// Document store collection names
pub const PROPERTIES_COLLECTION: &str = "properties";
pub const REQUIREMENTS_COLLECTION: &str = "requirements";
pub const PRE_LAUNCH_PROJECTS_COLLECTION: &str = "preLaunchProjects";
pub const POST_RERA_PROJECTS_COLLECTION: &str = "postReraProjects";
pub const BUILDERS_COLLECTION: &str = "builders";
pub const TASKS_COLLECTION: &str = "tasks";
