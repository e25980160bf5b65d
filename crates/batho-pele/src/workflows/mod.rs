pub mod intake;
pub mod resources;
pub mod treatment;
