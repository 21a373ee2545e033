pub mod burst;
pub mod run;
pub mod version;
