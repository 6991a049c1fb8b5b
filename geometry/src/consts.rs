//! Shared numeric constants for the geometry crate.

// ── Viewport ────────────────────────────────────────────────────

/// Smallest allowed scale, in pixels per model unit.
pub const MIN_SCALE: f64 = 5.0;

/// Largest allowed scale, in pixels per model unit.
pub const MAX_SCALE: f64 = 200.0;

/// Scale of a freshly created viewport.
pub const DEFAULT_SCALE: f64 = 40.0;

/// Multiplier applied per zoom-in step; zoom-out divides by it.
pub const ZOOM_STEP: f64 = 1.2;

// ── Picking ─────────────────────────────────────────────────────

/// Screen-space hit slop in pixels.
pub const PICK_TOLERANCE_PX: f64 = 10.0;

// ── Snapping ────────────────────────────────────────────────────

/// Grid spacing in model units used when grid snap is on.
pub const GRID_SNAP_STEP: f64 = 0.5;

// ── Construction ────────────────────────────────────────────────

/// A polygon can only be closed from the tool once it has this many vertices.
pub const MIN_POLYGON_VERTICES: usize = 3;

// ── Colors ──────────────────────────────────────────────────────

pub const POINT_COLOR: &str = "#A78BFA";
pub const LINE_COLOR: &str = "#F97316";
pub const SEGMENT_COLOR: &str = "#22C55E";
pub const CIRCLE_COLOR: &str = "#3B82F6";
pub const POLYGON_STROKE: &str = "#EC4899";
pub const POLYGON_FILL: &str = "rgba(236, 72, 153, 0.15)";
pub const DISTANCE_COLOR: &str = "#EAB308";
