// Library root
// -----------
// This crate exposes the pieces of the `veg-poster` CLI so they can be
// tested without touching the network or the process environment.
//
// Module responsibilities:
// - `env`: loads `.env` files into the process environment.
// - `config`: credentials and Graph API settings, built once at startup.
// - `meta`: infers crop, stage, location and season from a filename.
// - `caption`: turns that metadata into a caption with hashtags.
// - `api`: the two-step create/publish client behind a `Transport` seam.
// - `ui`: caption preview, confirmation prompt and spinner.
pub mod api;
pub mod caption;
pub mod config;
pub mod env;
pub mod meta;
pub mod ui;
