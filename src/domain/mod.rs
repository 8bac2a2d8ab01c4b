pub mod layout;
pub mod movement;
pub mod viewport;
