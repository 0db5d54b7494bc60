//! Application-wide constants.
//!
//! Centralizes limits, defaults and chart layout values.

// ============================================================================
// Dataset Limits
// ============================================================================

/// Maximum dataset file size in megabytes
pub const MAX_CSV_SIZE_MB: usize = 100;

/// Maximum number of incident rows accepted by the loader
pub const MAX_CSV_ROWS: usize = 100_000;

/// Default dataset file name, as shipped with the demo
pub const DEFAULT_DATASET: &str = "servicenow_incidents.csv";

// ============================================================================
// View Limits
// ============================================================================

/// Number of configuration items kept by the Pareto view
pub const PARETO_TOP_N: usize = 10;

/// Number of assignment groups kept by the SLA breach view
pub const SLA_BREACH_TOP_N: usize = 10;

/// Lowest accepted customer satisfaction score
pub const CSAT_MIN: f64 = 1.0;

/// Highest accepted customer satisfaction score
pub const CSAT_MAX: f64 = 5.0;

// ============================================================================
// Server
// ============================================================================

/// Default bind host for the dashboard server
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default dashboard port
pub const DEFAULT_PORT: u16 = 8050;

/// Poll interval of the server loop in milliseconds
pub const SERVER_POLL_MS: u64 = 100;

/// Seconds to wait for the server thread to bind
pub const SERVER_STARTUP_TIMEOUT_SECS: u64 = 5;

// ============================================================================
// Chart Layout
// ============================================================================

/// Default chart width in pixels
pub const DEFAULT_CHART_WIDTH: u32 = 960;

/// Default chart height in pixels
pub const DEFAULT_CHART_HEIGHT: u32 = 480;

/// Smallest chart size accepted from settings
pub const MIN_CHART_SIZE: u32 = 200;

/// Plot margins (top, right, bottom, left) in pixels
pub const CHART_MARGIN: (f64, f64, f64, f64) = (48.0, 64.0, 96.0, 72.0);

/// Chart color palette - highly distinct colors for data visualization
pub const CHART_COLORS: [&str; 8] = [
    "hsl(220, 85%, 55%)", // Bright Blue
    "hsl(140, 75%, 45%)", // Green
    "hsl(30, 95%, 55%)",  // Orange
    "hsl(270, 75%, 55%)", // Violet/Purple
    "hsl(0, 80%, 55%)",   // Red
    "hsl(175, 75%, 45%)", // Cyan/Teal
    "hsl(55, 90%, 50%)",  // Yellow
    "hsl(320, 75%, 55%)", // Pink/Magenta
];

/// Text color used for axes and labels
pub const AXIS_COLOR: &str = "#444444";

/// Grid line color
pub const GRID_COLOR: &str = "#e5e5e5";

/// Placeholder text for views without data
pub const EMPTY_VIEW_TEXT: &str = "No data for this view";
