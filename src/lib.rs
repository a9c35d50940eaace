//! An interactive shell over a keyed collection of movie records.
//!
//! Commands are read line by line from a [`source::LineSource`] (the console or a script file),
//! looked up in a [`registry::Registry`] and run against the session's
//! [`store::MovieStore`]. Scripts may call other scripts; a script that would re-enter itself
//! is rejected. The collection is loaded from and saved to the XML file named by the
//! `MOVIE_COLLECTION` environment variable.
//!
//! The main entry point is [`Interpreter`]. The [`command`] module exposes the trait for
//! implementing extra commands.

mod builtin;
pub mod command;
pub mod env;
pub mod error;
pub mod history;
pub mod interpreter;
pub mod io_adapters;
pub mod logging;
pub mod model;
pub mod prompt;
pub mod registry;
pub mod script;
pub mod source;
pub mod storage;
pub mod store;
pub mod validate;

/// Just a convenient re-export of the interactive command runner.
///
/// See [`Interpreter`] for the high-level API and examples.
pub use interpreter::Interpreter;
