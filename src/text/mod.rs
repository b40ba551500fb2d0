pub(crate) mod draw;
pub mod layout;
pub mod overlay;
