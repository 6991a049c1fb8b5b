//! Interactive 2D geometric-construction engine.
//!
//! This crate owns everything behind the construction canvas of the math view:
//! the object store of points, lines, segments, circles, polygons and distance
//! annotations, the screen/model coordinate mapping, hit-testing, the
//! multi-step construction tools, drag-vs-pan disambiguation and cascade
//! deletion. The host is responsible only for wiring input events to the
//! engine and for drawing the [`render::Scene`] it exposes.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Event handlers, dirty flag, and the testable [`engine::EngineCore`] |
//! | [`store`] | Identifier-keyed object store and the object sum type |
//! | [`viewport`] | Pan/zoom state and screen/model conversions |
//! | [`pick`] | Hit-testing a screen point against the store |
//! | [`deps`] | Cascade expansion for deletes |
//! | [`construct`] | Construction tool state machine and live preview |
//! | [`drag`] | Pointer-down session choice: point drag, select, or pan |
//! | [`input`] | Tool, modifier, button and key types; UI and gesture state |
//! | [`render`] | Scene description handed to the renderer |
//! | [`config`] | Engine configuration and snap policy |
//! | [`consts`] | Shared numeric constants and default colors |

pub mod config;
pub mod consts;
pub mod construct;
pub mod deps;
pub mod drag;
pub mod engine;
pub mod input;
pub mod pick;
pub mod render;
pub mod store;
pub mod viewport;
