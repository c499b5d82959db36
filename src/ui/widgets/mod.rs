pub mod conditions;
pub mod details;
pub mod status;
pub mod sun_path;
