pub mod debounce;
pub mod engine;
pub mod notice;
pub mod session;
