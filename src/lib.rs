//! Async side of the storybook page editor.
//!
//! The [`canvas`] crate owns the page model and its geometry; this crate
//! connects it to the backend. It uploads staged media and saves pages,
//! keeps a book's page list and the create/edit mode, stores page layout
//! templates, and wraps the text enhancement and catalog services.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`api`] | Collaborator traits, wire types, and the reqwest-backed [`api::http::HttpApi`] |
//! | [`upload`] | Media upload orchestration and save dispatch |
//! | [`session`] | [`session::EditorSession`]: page collection and create/edit mode |
//! | [`template`] | Per-book layout templates and bulk layout copy |
//! | [`enhance`] | Text enhancement and speech cache clearing |
//! | [`catalog`] | Web-view games and character voices |
//! | [`config`] | Environment-driven configuration |

pub mod api;
pub mod catalog;
pub mod config;
pub mod enhance;
pub mod session;
pub mod template;
pub mod upload;

pub use canvas;

#[cfg(test)]
mod test_helpers;
