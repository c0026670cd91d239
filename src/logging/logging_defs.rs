use super::logger::DebugLogsCategories;

/// Span IDs for performance-logging events.  Each ID must be unique;
/// simply increment when adding a new span.
pub const EXTRACT: u64 = 1;
pub const LOCATE_ROOT: u64 = 2;
pub const HARVEST_LANDMARKS: u64 = 3;
pub const HARVEST_HEADINGS: u64 = 4;
pub const HARVEST_NAV_LINKS: u64 = 5;
pub const EXTRACT_BLOCKS: u64 = 6;
pub const HARVEST_FORMS: u64 = 7;
pub const HARVEST_BUTTONS: u64 = 8;
pub const HARVEST_LINKS: u64 = 9;
pub const DETECT_SEARCH: u64 = 10;
pub const GROUP_BLOCKS: u64 = 11;
pub const SCORE_GROUPS: u64 = 12;

pub fn name(span_id: u64) -> &'static str {
    match span_id {
        EXTRACT => "EXTRACT",
        LOCATE_ROOT => "LOCATE_ROOT",
        HARVEST_LANDMARKS => "HARVEST_LANDMARKS",
        HARVEST_HEADINGS => "HARVEST_HEADINGS",
        HARVEST_NAV_LINKS => "HARVEST_NAV_LINKS",
        EXTRACT_BLOCKS => "EXTRACT_BLOCKS",
        HARVEST_FORMS => "HARVEST_FORMS",
        HARVEST_BUTTONS => "HARVEST_BUTTONS",
        HARVEST_LINKS => "HARVEST_LINKS",
        DETECT_SEARCH => "DETECT_SEARCH",
        GROUP_BLOCKS => "GROUP_BLOCKS",
        SCORE_GROUPS => "SCORE_GROUPS",
        _ => "UNKNOWN_SPAN",
    }
}

/// The debug category a span is reported under.
pub fn category(span_id: u64) -> DebugLogsCategories {
    match span_id {
        EXTRACT | LOCATE_ROOT => DebugLogsCategories::PIPELINE,
        EXTRACT_BLOCKS => DebugLogsCategories::BLOCK_WALK,
        HARVEST_LANDMARKS | HARVEST_HEADINGS | HARVEST_NAV_LINKS | HARVEST_FORMS
        | HARVEST_BUTTONS | HARVEST_LINKS | DETECT_SEARCH => DebugLogsCategories::HARVESTING,
        GROUP_BLOCKS | SCORE_GROUPS => DebugLogsCategories::GROUPING,
        _ => DebugLogsCategories::NONE,
    }
}
