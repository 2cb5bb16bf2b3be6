//! Angel display: orientation readings to on-screen pixels

pub mod angel;

pub use angel::{
    AngelDisplaySystem, AngelSnapshot, AngelState, angle_to_screen, format_angle_text,
};
