pub mod camera;
pub mod capture;
pub mod config;
pub mod desktop;
pub mod hud;
pub mod measure;
pub mod paths;
pub mod scene;
pub mod tracking;
pub mod units;
pub mod world;

#[cfg(test)]
mod testing;
