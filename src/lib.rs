//! Note-store, projection, and drag engine for the 3D sticky-note corkboard.
//!
//! The crate owns the non-presentational half of the board: the persisted
//! collection of notes, the perspective math that maps pointer pixels onto the
//! board plane, and the per-pointer gesture state machine that turns a
//! pointer-down/move/up sequence into exactly one committed position. The host
//! page (or the [`web`] façade when built with the `web` feature) forwards DOM
//! events to [`engine::EngineCore`] and applies the returned
//! [`engine::Action`]s to whatever renders the notes.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::EngineCore`] and the [`engine::Action`] output type |
//! | [`store`] | Ordered note collection with load/backfill/dedupe and persistence |
//! | [`storage`] | Durable key-value backends behind the [`storage::NoteStorage`] trait |
//! | [`note`] | Note record, colours, and the optional-field input types |
//! | [`camera`] | Vectors, viewport size, and the perspective camera |
//! | [`projector`] | Screen ↔ world conversions |
//! | [`scene`] | Scene host: camera, viewport, frame tick, parallax drift |
//! | [`input`] | Pointer event types and per-pointer gesture state |
//! | [`drag`] | The drag controller state machine |
//! | [`hit`] | Hit-testing pointer positions against note rectangles |
//! | [`text`] | Composition-aware text commit gate |
//! | [`widget`] | Note widget capability trait and the layer reconciler |
//! | [`config`] | Board configuration and environment overrides |
//! | [`logging`] | Tracing subscriber setup |
//! | [`consts`] | Shared numeric constants |
//! | `web` | `wasm-bindgen` façade for the browser (feature `web`) |

pub mod camera;
pub mod config;
pub mod consts;
pub mod drag;
pub mod engine;
pub mod hit;
pub mod input;
pub mod logging;
pub mod note;
pub mod projector;
pub mod scene;
pub mod storage;
pub mod store;
pub mod text;
pub mod widget;

#[cfg(feature = "web")]
pub mod web;
