pub mod astro;
pub mod details;
pub mod events;
pub mod format;
pub mod scene;
pub mod solar;
pub mod weather;
