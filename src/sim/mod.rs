pub mod assets;
pub mod event;
pub mod step;
pub mod world;
