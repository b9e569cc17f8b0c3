//! UI-side core of the Kitty proxy manager: typed backend services, local
//! stores and the daily subscription refresh.

pub mod application;
pub mod presentation;

pub use presentation::state::AppContext;
