//! Show or change the persisted color mode

use anyhow::{bail, Result};

use crate::theme::ThemeMode;
use crate::Folio;

/// Apply `action` (`show`, `toggle`, `light` or `dark`) and return the
/// resulting mode
pub fn run(folio: &Folio, action: &str) -> Result<ThemeMode> {
    let color = folio.color_mode();

    let mode = match action {
        "show" => color.mode(),
        "toggle" => color.toggle()?,
        "light" | "dark" => {
            let wanted: ThemeMode = action.parse()?;
            if color.mode() == wanted {
                wanted
            } else {
                color.toggle()?
            }
        }
        other => bail!(
            "Unknown theme action: {}. Available: show, toggle, light, dark",
            other
        ),
    };

    Ok(mode)
}
