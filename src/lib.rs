//! Terramarch library - procedural voxel terrain demo

pub mod camera;
pub mod cli;
pub mod density;
pub mod input;
pub mod mesh;
pub mod overlay;
pub mod params;
pub mod rendering;
pub mod scene;
pub mod waves;
