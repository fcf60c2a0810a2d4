//! Implementation of the `relbranch styles` command.

use crate::error::Result;
use crate::style::{StyleOptions, create_style, style_names};

/// Execute the `relbranch styles` command.
pub fn cmd_styles() -> Result<()> {
    print!("{}", render_styles()?);
    Ok(())
}

pub(crate) fn render_styles() -> Result<String> {
    let mut out = String::new();
    for name in style_names() {
        let style = create_style(name, &StyleOptions::default())?;
        out.push_str(&format!("{:<10} {}\n", name, style.description()));
    }
    Ok(out)
}
