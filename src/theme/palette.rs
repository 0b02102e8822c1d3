//! Colors and typography for both modes

use super::ThemeMode;

/// Colors of one mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub mode: ThemeMode,
    pub background: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub border: &'static str,
    pub link: &'static str,
    pub link_hover_background: &'static str,
    pub link_active: &'static str,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        mode: ThemeMode::Light,
        background: "#ffffff",
        text: "rgba(0, 0, 0, 0.87)",
        muted: "rgba(0, 0, 0, 0.6)",
        border: "rgba(224, 224, 224, 1)",
        link: "#000000",
        link_hover_background: "#e3f2fd",
        link_active: "#808080",
    };

    pub const DARK: Palette = Palette {
        mode: ThemeMode::Dark,
        background: "#121212",
        text: "#ffffff",
        muted: "rgba(255, 255, 255, 0.7)",
        border: "rgba(81, 81, 81, 1)",
        link: "#ffffff",
        link_hover_background: "#1565c0",
        link_active: "#ffffff",
    };

    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self::LIGHT,
            ThemeMode::Dark => Self::DARK,
        }
    }

    fn css_variables(&self) -> String {
        [
            ("--color-background", self.background),
            ("--color-text", self.text),
            ("--color-muted", self.muted),
            ("--color-border", self.border),
            ("--color-link", self.link),
            ("--color-link-hover-bg", self.link_hover_background),
            ("--color-link-active", self.link_active),
        ]
        .iter()
        .map(|(name, value)| format!("  {}: {};\n", name, value))
        .collect()
    }
}

/// Font size of each heading variant, h1 first
pub const TYPOGRAPHY_SCALE: [(&str, &str); 6] = [
    ("h1", "2em"),
    ("h2", "1.5em"),
    ("h3", "1.25em"),
    ("h4", "1.12em"),
    ("h5", "1.06em"),
    ("h6", "1.03em"),
];

const BASE_CSS: &str = include_str!("site.css");

/// Site stylesheet: palette variables for both modes, typography and widget
/// styles
pub fn stylesheet() -> String {
    let mut css = String::new();
    css.push_str(":root {\n");
    css.push_str(&Palette::LIGHT.css_variables());
    css.push_str("}\n\n[data-theme=\"dark\"] {\n");
    css.push_str(&Palette::DARK.css_variables());
    css.push_str("}\n\n");

    for (variant, size) in TYPOGRAPHY_SCALE {
        css.push_str(&format!(
            ".typography-{v}, .content {v} {{\n  font-size: {s};\n  margin-bottom: 5px;\n}}\n",
            v = variant,
            s = size
        ));
    }
    css.push('\n');
    css.push_str(BASE_CSS);
    css
}
