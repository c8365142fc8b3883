//! Colors shared by every part of the CLI.
//!
//! - RUCKS_AMBER: Main Color
//! - RUCKS_SLATE: Secondary Color, used for column headers

use colored::Color;

pub(crate) const RUCKS_AMBER: Color = Color::TrueColor {
    r: 255,
    g: 176,
    b: 59,
};

pub(crate) const RUCKS_SLATE: Color = Color::TrueColor {
    r: 120,
    g: 144,
    b: 156,
};
