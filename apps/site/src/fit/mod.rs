// Fit-to-page scaling: pure scale computation, the debounced trigger loop that
// drives it, and the WebSocket the page script talks to.

pub mod controller;
pub mod handlers;
pub mod scale;

pub use controller::DEFAULT_DEBOUNCE;
pub use scale::FitConstraints;
