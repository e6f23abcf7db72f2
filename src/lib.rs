// Library root
// -----------
// This crate exposes the library surface behind the card tracker CLI. The
// binary (`main.rs`) wires these modules into the interactive menu.
//
// Module responsibilities:
// - `api`: HTTP calls to the card backend (list, get, create, scan, price).
// - `models`: the JSON shapes exchanged with the backend.
// - `scanner`: busy/message state of the scan workflow.
// - `collection`: the client-side copy of the user's cards.
// - `picker`: native dialog or terminal prompt that yields an image path.
// - `config` / `error`: environment configuration and typed errors.
// - `ui`: terminal menus that drive everything above.
pub mod api;
pub mod collection;
pub mod config;
pub mod error;
pub mod models;
pub mod picker;
pub mod scanner;
pub mod ui;
