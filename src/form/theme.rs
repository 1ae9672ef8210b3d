use crossterm::style::{Attribute, Color, ContentStyle, Stylize};
use serde::{Deserialize, Serialize};

/// Glyphs and colors used when rendering forms.
///
/// Passed explicitly to the compiler and the terminal backend; nothing here is
/// process-wide state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PromptTheme {
    /// Marker drawn before every question.
    pub qmark: String,
    /// Cursor drawn next to the highlighted choice.
    pub pointer: String,
    /// Hex color of the highlighted choice.
    pub selected_color: String,
    /// Hex color of accepted answers.
    pub answer_color: String,
    /// Text drawn for separators without a label.
    pub separator: String,
}

impl Default for PromptTheme {
    fn default() -> Self {
        Self {
            qmark: "-".to_string(),
            pointer: "❯".to_string(),
            selected_color: "#673AB7".to_string(),
            answer_color: "#3ba09d".to_string(),
            separator: "--------".to_string(),
        }
    }
}

impl PromptTheme {
    pub fn qmark_style(&self) -> ContentStyle {
        ContentStyle::new().attribute(Attribute::Bold)
    }

    pub fn question_style(&self) -> ContentStyle {
        ContentStyle::new().attribute(Attribute::Bold)
    }

    pub fn selected_style(&self) -> ContentStyle {
        let style = ContentStyle::new().attribute(Attribute::Bold);
        match parse_hex_color(&self.selected_color) {
            Some(c) => style.with(c),
            None => style,
        }
    }

    pub fn answer_style(&self) -> ContentStyle {
        match parse_hex_color(&self.answer_color) {
            Some(c) => ContentStyle::new().with(c),
            None => ContentStyle::new(),
        }
    }

    pub fn error_style(&self) -> ContentStyle {
        ContentStyle::new().red().attribute(Attribute::Bold)
    }

    pub fn instruction_style(&self) -> ContentStyle {
        ContentStyle::new().dark_grey()
    }
}

/// Parses `#rrggbb` into an RGB color.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(
            parse_hex_color("#673AB7"),
            Some(Color::Rgb {
                r: 0x67,
                g: 0x3a,
                b: 0xb7
            })
        );
        assert_eq!(parse_hex_color("673AB7"), None);
        assert_eq!(parse_hex_color("#12345"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_default_qmark() {
        assert_eq!(PromptTheme::default().qmark, "-");
    }
}
