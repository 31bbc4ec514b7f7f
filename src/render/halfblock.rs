use super::canvas::{Canvas, ColorMode, color_to_fg};
use crate::engine::palette::Rgb;
use crossterm::style::Color;

fn color_to_bg(color: Color) -> String {
    match color {
        Color::Rgb { r, g, b } => format!("48;2;{};{};{}", r, g, b),
        Color::AnsiValue(v) => format!("48;5;{}", v),
        Color::Black => "40".into(),
        Color::DarkRed => "41".into(),
        Color::DarkGreen => "42".into(),
        Color::DarkBlue => "44".into(),
        Color::Grey => "47".into(),
        Color::Red => "101".into(),
        Color::Green => "102".into(),
        Color::Blue => "104".into(),
        Color::White => "107".into(),
        _ => "40".into(),
    }
}

/// Channel distance from the background above which a mono pixel is lit.
const MONO_THRESHOLD: u16 = 24;

fn lit(p: Rgb, background: Rgb) -> bool {
    let d = |a: u8, b: u8| (a as i16 - b as i16).unsigned_abs();
    d(p.0, background.0) + d(p.1, background.1) + d(p.2, background.2) > MONO_THRESHOLD
}

/// Encode the canvas as one ANSI frame of `▀` cells: the top pixel is the
/// foreground, the bottom pixel the background. The caller positions the
/// cursor at the top-left first; each row ends with a reset and a move to
/// the start of the next row.
pub fn encode(canvas: &Canvas) -> String {
    let mut out = String::with_capacity(canvas.cols * canvas.rows * 12);
    let mut last_fg = String::new();
    let mut last_bg = String::new();

    for row in 0..canvas.rows {
        for col in 0..canvas.cols {
            let top = canvas.pixel(col, row * 2);
            let bot = canvas.pixel(col, row * 2 + 1);

            if canvas.color_mode == ColorMode::Mono {
                match (lit(top, canvas.background), lit(bot, canvas.background)) {
                    (true, true) => out.push('█'),
                    (true, false) => out.push('▀'),
                    (false, true) => out.push('▄'),
                    (false, false) => out.push(' '),
                }
                continue;
            }

            let bg = color_to_bg(canvas.map_color(bot));
            if bg != last_bg {
                out.push_str("\x1b[");
                out.push_str(&bg);
                out.push('m');
                last_bg = bg;
            }
            // Uniform cells need no foreground at all.
            if top == bot {
                out.push(' ');
                continue;
            }
            let fg = color_to_fg(canvas.map_color(top));
            if fg != last_fg {
                out.push_str("\x1b[");
                out.push_str(&fg);
                out.push('m');
                last_fg = fg;
            }
            out.push('▀');
        }
        if canvas.color_mode != ColorMode::Mono {
            out.push_str("\x1b[0m");
            last_fg.clear();
            last_bg.clear();
        }
        if row + 1 < canvas.rows {
            out.push_str("\x1b[");
            out.push_str(&(row + 2).to_string());
            out.push_str(";1H");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::surface::{Paint, Surface};

    #[test]
    fn test_uniform_frame_is_spaces_on_background() {
        let mut c = Canvas::new(3, 2, ColorMode::TrueColor);
        c.clear(Rgb(1, 2, 3));
        let out = encode(&c);
        assert_eq!(out, "\x1b[48;2;1;2;3m   \x1b[0m\x1b[2;1H\x1b[48;2;1;2;3m   \x1b[0m");
    }

    #[test]
    fn test_split_cell_uses_upper_half_block() {
        let mut c = Canvas::new(1, 1, ColorMode::TrueColor);
        c.clear(Rgb(0, 0, 0));
        c.fill_rect(0.0, 0.0, 8.0, 8.0, Paint::new(Rgb(255, 0, 0), 1.0));
        assert_eq!(encode(&c), "\x1b[48;2;0;0;0m\x1b[38;2;255;0;0m▀\x1b[0m");
    }

    #[test]
    fn test_mono_thresholds_against_background() {
        let mut c = Canvas::new(2, 1, ColorMode::Mono);
        c.clear(Rgb(10, 10, 10));
        c.fill_rect(0.0, 8.0, 8.0, 8.0, Paint::new(Rgb(250, 250, 250), 1.0));
        c.fill_rect(8.0, 0.0, 8.0, 16.0, Paint::new(Rgb(12, 12, 12), 1.0));
        assert_eq!(encode(&c), "▄ ");
    }

    #[test]
    fn test_color_codes_deduplicated_within_row() {
        let mut c = Canvas::new(4, 1, ColorMode::Ansi256);
        c.clear(Rgb(0, 0, 0));
        c.fill_rect(0.0, 0.0, 32.0, 8.0, Paint::new(Rgb(255, 255, 255), 1.0));
        let out = encode(&c);
        assert_eq!(out.matches("38;5;").count(), 1);
        assert_eq!(out.matches("48;5;").count(), 1);
        assert_eq!(out.matches('▀').count(), 4);
    }
}
