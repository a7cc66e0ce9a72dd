pub mod charts;
pub mod html;
pub mod pdf;
