pub mod button;
pub mod heading;
