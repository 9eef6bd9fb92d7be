//! HTTP surface of salescope: routing, parameter coercion, and shared
//! application state. The binary in `main.rs` wires this router to the
//! configured scan backend.

pub mod params;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
