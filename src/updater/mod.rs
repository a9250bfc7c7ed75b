//! Updater module - Runs tag updates over the manifests of a configuration.

mod updater;


pub use updater::*;
