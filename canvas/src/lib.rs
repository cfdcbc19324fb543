//! Page model and geometry engine for the storybook page editor.
//!
//! This crate holds everything about one page that can be computed without
//! touching the network: the editable model, the percentage-space geometry
//! behind drag and resize gestures, the tolerant reader for persisted page
//! records, and the assembly of the save payload. The async side of the editor
//! (uploads, page collection, templates) lives in the `page-editor` crate and
//! drives this one.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`editor`] | [`editor::EditorCore`]: model plus gesture routing |
//! | [`model`] | The Canvas Model and its mutation operations |
//! | [`page`] | Page value types: text boxes, scroll, background, web view |
//! | [`media`] | Local files, preview handles, and media sequences |
//! | [`geometry`] | Pointer-to-percentage math for text boxes, scroll, and surface |
//! | [`input`] | Gesture state machine types |
//! | [`persisted`] | Server page records and field-variant resolution |
//! | [`payload`] | Save payload assembly |
//! | [`mention`] | `@name` character mention autocomplete |
//! | [`consts`] | Defaults and clamp ranges |

pub mod consts;
pub mod editor;
pub mod geometry;
pub mod input;
pub mod media;
pub mod mention;
pub mod model;
pub mod page;
pub mod payload;
pub mod persisted;

#[cfg(test)]
mod test_helpers;
