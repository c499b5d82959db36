pub mod cache;
pub mod forecast;
pub mod geocode;
pub mod geoip;
