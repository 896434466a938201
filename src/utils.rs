//! Utility functions for CSS value formatting

use crate::types::Color;

/// Convert a 0..=1 channel to a 0..=255 byte, rounding to nearest
pub fn channel_to_byte(channel: f64) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Uppercase six-digit hex, e.g. `#FF0000`
pub fn color_to_hex(color: &Color) -> String {
    format!(
        "#{:02X}{:02X}{:02X}",
        channel_to_byte(color.r),
        channel_to_byte(color.g),
        channel_to_byte(color.b)
    )
}

/// `rgba(r, g, b, a)` with alpha printed to exactly two decimals.
///
/// Halfway alphas round up: 0.125 prints as 0.13.
pub fn color_to_rgba(color: &Color, alpha: f64) -> String {
    let alpha = (alpha.clamp(0.0, 1.0) * 100.0).round() / 100.0;
    format!(
        "rgba({}, {}, {}, {:.2})",
        channel_to_byte(color.r),
        channel_to_byte(color.g),
        channel_to_byte(color.b),
        alpha
    )
}

/// Hex when the effective alpha is exactly 1, rgba otherwise.
///
/// The effective alpha is the colour's own alpha multiplied by the paint opacity.
pub fn color_to_css(color: &Color, opacity: f64) -> String {
    let alpha = color.a * opacity;
    if alpha == 1.0 {
        color_to_hex(color)
    } else {
        color_to_rgba(color, alpha)
    }
}

/// Format a number the way CSS lengths are written: `16`, `1.5`, never `-0`
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    format!("{}", value)
}

pub fn px(value: f64) -> String {
    format!("{}px", format_number(value))
}

/// CSS padding shorthand with the shortest faithful form
pub fn padding_shorthand(top: f64, right: f64, bottom: f64, left: f64) -> String {
    if top == right && right == bottom && bottom == left {
        px(top)
    } else if top == bottom && right == left {
        format!("{} {}", px(top), px(right))
    } else {
        format!("{} {} {} {}", px(top), px(right), px(bottom), px(left))
    }
}

pub fn radians_to_degrees(radians: f64) -> f64 {
    radians * 180.0 / std::f64::consts::PI
}
