pub mod check;
pub mod dump;
pub mod file_loader;
pub mod layouts;
