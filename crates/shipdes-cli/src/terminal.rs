//! Terminal styling for the text report.
//!
//! Case headings, warnings and failed statuses are highlighted when the
//! terminal accepts ANSI colors.

/// ANSI escape codes used by the report.
pub mod colors {
    pub const RESET: &str = "\x1b[0m";
    /// Case heading.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Section rules.
    pub const GRAY: &str = "\x1b[90m";
    /// Non-fatal warnings.
    pub const YELLOW: &str = "\x1b[33m";
    /// Failed solves.
    pub const RED: &str = "\x1b[31m";
}

/// Escape codes for each report role; all empty when color is off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub white_bold: &'static str,
    pub gray: &'static str,
    pub yellow: &'static str,
    pub red: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            white_bold: colors::WHITE_BOLD,
            gray: colors::GRAY,
            yellow: colors::YELLOW,
            red: colors::RED,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            white_bold: "",
            gray: "",
            yellow: "",
            red: "",
        }
    }

    /// Palette for the current process environment.
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether stdout styling is allowed, honouring `NO_COLOR` and `TERM=dumb`.
#[must_use]
pub fn supports_color() -> bool {
    color_allowed(
        std::env::var_os("NO_COLOR").is_some(),
        std::env::var("TERM").ok().as_deref(),
    )
}

fn color_allowed(no_color: bool, term: Option<&str>) -> bool {
    !no_color && !term.is_some_and(|term| term.eq_ignore_ascii_case("dumb"))
}

/// Round a quantity to whole units and group the digits in thousands.
///
/// ```
/// # use shipdes_cli::terminal::format_quantity;
/// assert_eq!(format_quantity(10_863.4), "10,863");
/// assert_eq!(format_quantity(-1_250.0), "-1,250");
/// ```
#[must_use]
pub fn format_quantity(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let digits = format!("{:.0}", value.abs());
    let grouped = digits
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect::<Vec<_>>()
        .join(",");
    if value.round() < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantities_are_grouped_in_thousands() {
        assert_eq!(format_quantity(0.0), "0");
        assert_eq!(format_quantity(999.4), "999");
        assert_eq!(format_quantity(49_999.6), "50,000");
        assert_eq!(format_quantity(1_234_567.0), "1,234,567");
        assert_eq!(format_quantity(-12.4), "-12");
        assert_eq!(format_quantity(-0.2), "0");
    }

    #[test]
    fn plain_palette_has_no_escapes() {
        let plain = ColorPalette::plain();
        assert!([plain.reset, plain.white_bold, plain.gray, plain.yellow, plain.red]
            .iter()
            .all(|code| code.is_empty()));
    }

    #[test]
    fn no_color_and_dumb_terminals_disable_styling() {
        assert!(color_allowed(false, Some("xterm-256color")));
        assert!(color_allowed(false, None));
        assert!(!color_allowed(true, Some("xterm-256color")));
        assert!(!color_allowed(false, Some("DUMB")));
    }
}
