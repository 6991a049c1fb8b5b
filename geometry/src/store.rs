//! Object model and the identifier-keyed store that owns every object.
//!
//! This module defines the geometric object sum type (`Shape`), the common
//! record wrapping it (`GeoObject`), opaque handles (`ObjectId`), and the
//! runtime store (`GeometryStore`). Composite objects never own the points
//! they reference: they hold `ObjectId`s and resolve them through the store
//! on every read, so removing a point invalidates every handle to it at once.
//!
//! The store is append-ordered. Ids are allocated monotonically and the
//! insertion order is kept alongside the id-indexed map, so lookups stay O(1)
//! while the renderer and the pick engine can walk objects front-to-back or
//! back-to-front.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::consts::{CIRCLE_COLOR, DISTANCE_COLOR, LINE_COLOR, POINT_COLOR, POLYGON_FILL, POLYGON_STROKE, SEGMENT_COLOR};
use crate::viewport::Point;

/// Opaque handle to an object in a [`GeometryStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u64);

impl ObjectId {
    /// Raw handle value. Only meaningful for display and ordering.
    #[must_use]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The kind of a geometric object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Point,
    Line,
    Segment,
    Circle,
    Polygon,
    Distance,
}

/// Kind-specific geometry of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Shape {
    /// Free point in model coordinates.
    Point { x: f64, y: f64 },
    /// Unbounded line through two points.
    Line { p1: ObjectId, p2: ObjectId },
    /// Segment bounded by two points.
    Segment { p1: ObjectId, p2: ObjectId },
    /// Circle around a point with a radius frozen at creation.
    Circle { center: ObjectId, radius: f64 },
    /// Closed polygon through an ordered list of points. `fill` is the area color.
    Polygon { points: Vec<ObjectId>, fill: String },
    /// Live distance readout between two points.
    Distance { p1: ObjectId, p2: ObjectId },
}

impl Shape {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Point { .. } => ObjectKind::Point,
            Self::Line { .. } => ObjectKind::Line,
            Self::Segment { .. } => ObjectKind::Segment,
            Self::Circle { .. } => ObjectKind::Circle,
            Self::Polygon { .. } => ObjectKind::Polygon,
            Self::Distance { .. } => ObjectKind::Distance,
        }
    }

    /// Point ids this shape depends on, in declaration order.
    #[must_use]
    pub fn point_refs(&self) -> Vec<ObjectId> {
        match self {
            Self::Point { .. } => Vec::new(),
            Self::Line { p1, p2 } | Self::Segment { p1, p2 } | Self::Distance { p1, p2 } => vec![*p1, *p2],
            Self::Circle { center, .. } => vec![*center],
            Self::Polygon { points, .. } => points.clone(),
        }
    }

    /// Whether any referenced point id is in `ids`.
    #[must_use]
    pub fn references_any(&self, ids: &HashSet<ObjectId>) -> bool {
        match self {
            Self::Point { .. } => false,
            Self::Line { p1, p2 } | Self::Segment { p1, p2 } | Self::Distance { p1, p2 } => {
                ids.contains(p1) || ids.contains(p2)
            }
            Self::Circle { center, .. } => ids.contains(center),
            Self::Polygon { points, .. } => points.iter().any(|p| ids.contains(p)),
        }
    }
}

/// An object as stored: common display attributes plus its shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoObject {
    pub id: ObjectId,
    /// Display label; may be empty.
    pub label: String,
    /// Stroke (or dot) color as a CSS color string.
    pub color: String,
    /// Hidden objects are neither drawn nor picked.
    pub visible: bool,
    pub shape: Shape,
}

impl GeoObject {
    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.shape.kind()
    }

    #[must_use]
    pub fn is_point(&self) -> bool {
        matches!(self.shape, Shape::Point { .. })
    }

    /// Model position when this object is a point.
    #[must_use]
    pub fn position(&self) -> Option<Point> {
        match self.shape {
            Shape::Point { x, y } => Some(Point::new(x, y)),
            _ => None,
        }
    }
}

/// Reasons an `add_*` call refuses to create an object.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StoreError {
    #[error("both references resolve to the same point {0}")]
    SamePoint(ObjectId),
    #[error("point not found: {0}")]
    MissingPoint(ObjectId),
    #[error("invalid radius: {0}")]
    InvalidRadius(f64),
}

/// In-memory store of geometric objects.
#[derive(Debug, Default)]
pub struct GeometryStore {
    objects: HashMap<ObjectId, GeoObject>,
    order: Vec<ObjectId>,
    next_id: u64,
    point_labels: usize,
    object_labels: usize,
}

impl GeometryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Creation ---

    /// Add a free point. Always succeeds.
    ///
    /// Without an explicit label the next label in the `A, B, …, Z, A1, …`
    /// sequence is used.
    pub fn add_point(&mut self, x: f64, y: f64, label: Option<&str>, color: Option<&str>) -> ObjectId {
        let label = match label {
            Some(l) => l.to_owned(),
            None => {
                let l = sequence_label(self.point_labels, b'A');
                self.point_labels += 1;
                l
            }
        };
        let color = color.unwrap_or(POINT_COLOR).to_owned();
        self.insert(Shape::Point { x, y }, label, color)
    }

    /// Add an unbounded line through two distinct existing points.
    ///
    /// # Errors
    ///
    /// `SamePoint` if `p1 == p2`, `MissingPoint` if either point is absent.
    pub fn add_line(&mut self, p1: ObjectId, p2: ObjectId) -> Result<ObjectId, StoreError> {
        self.require_pair(p1, p2)?;
        Ok(self.insert_labelled(Shape::Line { p1, p2 }, LINE_COLOR))
    }

    /// Add a segment between two distinct existing points.
    ///
    /// # Errors
    ///
    /// `SamePoint` if `p1 == p2`, `MissingPoint` if either point is absent.
    pub fn add_segment(&mut self, p1: ObjectId, p2: ObjectId) -> Result<ObjectId, StoreError> {
        self.require_pair(p1, p2)?;
        Ok(self.insert_labelled(Shape::Segment { p1, p2 }, SEGMENT_COLOR))
    }

    /// Add a circle around `center`. The radius is stored as given and never
    /// re-derived afterwards; zero is accepted.
    ///
    /// # Errors
    ///
    /// `MissingPoint` if the center is absent, `InvalidRadius` if the radius is
    /// negative or not finite.
    pub fn add_circle(&mut self, center: ObjectId, radius: f64) -> Result<ObjectId, StoreError> {
        self.require_point(center)?;
        if !radius.is_finite() || radius < 0.0 {
            return Err(StoreError::InvalidRadius(radius));
        }
        Ok(self.insert_labelled(Shape::Circle { center, radius }, CIRCLE_COLOR))
    }

    /// Add a polygon through `points` in order. Duplicates are kept and no
    /// minimum vertex count is enforced.
    ///
    /// # Errors
    ///
    /// `MissingPoint` for the first vertex that is not a point in the store.
    pub fn add_polygon(&mut self, points: &[ObjectId]) -> Result<ObjectId, StoreError> {
        for id in points {
            self.require_point(*id)?;
        }
        let shape = Shape::Polygon { points: points.to_vec(), fill: POLYGON_FILL.to_owned() };
        Ok(self.insert_labelled(shape, POLYGON_STROKE))
    }

    /// Add a distance annotation between two distinct existing points.
    ///
    /// # Errors
    ///
    /// `SamePoint` if `p1 == p2`, `MissingPoint` if either point is absent.
    pub fn add_distance(&mut self, p1: ObjectId, p2: ObjectId) -> Result<ObjectId, StoreError> {
        self.require_pair(p1, p2)?;
        Ok(self.insert_labelled(Shape::Distance { p1, p2 }, DISTANCE_COLOR))
    }

    // --- Mutation ---

    /// Remove exactly the given ids. Returns the removed ids in insertion order.
    ///
    /// No dependency expansion happens here; user-initiated deletes go through
    /// [`crate::deps::cascade`] first.
    pub fn remove(&mut self, ids: &HashSet<ObjectId>) -> Vec<ObjectId> {
        let mut removed = Vec::new();
        self.order.retain(|id| {
            if ids.contains(id) {
                removed.push(*id);
                false
            } else {
                true
            }
        });
        for id in &removed {
            self.objects.remove(id);
        }
        debug!(count = removed.len(), "objects removed");
        removed
    }

    /// Move a point. Returns false if `id` is not a point.
    pub fn move_point(&mut self, id: ObjectId, to: Point) -> bool {
        let Some(obj) = self.objects.get_mut(&id) else {
            return false;
        };
        let Shape::Point { x, y } = &mut obj.shape else {
            return false;
        };
        *x = to.x;
        *y = to.y;
        trace!(%id, x = to.x, y = to.y, "point moved");
        true
    }

    /// Flip an object's visibility. Returns the new visibility, or `None` if
    /// the object doesn't exist.
    pub fn toggle_visibility(&mut self, id: ObjectId) -> Option<bool> {
        let obj = self.objects.get_mut(&id)?;
        obj.visible = !obj.visible;
        debug!(%id, visible = obj.visible, "visibility toggled");
        Some(obj.visible)
    }

    /// Drop every object. Label sequences restart.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.order.clear();
        self.point_labels = 0;
        self.object_labels = 0;
    }

    // --- Queries ---

    /// Return a reference to an object by id.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&GeoObject> {
        self.objects.get(&id)
    }

    #[must_use]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// Position of a point, or `None` for a missing id or a non-point.
    #[must_use]
    pub fn point_position(&self, id: ObjectId) -> Option<Point> {
        self.objects.get(&id).and_then(GeoObject::position)
    }

    /// Live value of a distance annotation, recomputed from its points.
    ///
    /// `None` if `id` is not a distance or one of its points is gone.
    #[must_use]
    pub fn distance(&self, id: ObjectId) -> Option<f64> {
        match self.objects.get(&id)?.shape {
            Shape::Distance { p1, p2 } => Some(self.point_position(p1)?.distance(self.point_position(p2)?)),
            _ => None,
        }
    }

    /// All objects in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &GeoObject> {
        self.order.iter().filter_map(|id| self.objects.get(id))
    }

    /// Visible objects in insertion order.
    pub fn visible(&self) -> impl DoubleEndedIterator<Item = &GeoObject> {
        self.iter().filter(|obj| obj.visible)
    }

    /// Number of objects currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` if the store contains no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of objects of one kind.
    #[must_use]
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.objects.values().filter(|obj| obj.kind() == kind).count()
    }

    // --- Internals ---

    fn require_point(&self, id: ObjectId) -> Result<(), StoreError> {
        match self.objects.get(&id) {
            Some(obj) if obj.is_point() => Ok(()),
            _ => Err(StoreError::MissingPoint(id)),
        }
    }

    fn require_pair(&self, p1: ObjectId, p2: ObjectId) -> Result<(), StoreError> {
        if p1 == p2 {
            return Err(StoreError::SamePoint(p1));
        }
        self.require_point(p1)?;
        self.require_point(p2)
    }

    fn insert_labelled(&mut self, shape: Shape, color: &str) -> ObjectId {
        let label = sequence_label(self.object_labels, b'a');
        self.object_labels += 1;
        self.insert(shape, label, color.to_owned())
    }

    fn insert(&mut self, shape: Shape, label: String, color: String) -> ObjectId {
        self.next_id += 1;
        let id = ObjectId(self.next_id);
        debug!(%id, kind = ?shape.kind(), %label, "object created");
        self.objects.insert(id, GeoObject { id, label, color, visible: true, shape });
        self.order.push(id);
        id
    }
}

/// `n`-th label of the sequence `X, …, X+25, X1, …` starting at letter `first`.
fn sequence_label(n: usize, first: u8) -> String {
    #[allow(clippy::cast_possible_truncation)]
    let letter = char::from(first + (n % 26) as u8);
    match n / 26 {
        0 => letter.to_string(),
        round => format!("{letter}{round}"),
    }
}
