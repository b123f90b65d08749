//! Builds a themed tree from CSS declarations and prints the custom
//! properties it produces as the theme changes.
//!
//! Run with: `cargo run --example palette`
//! Set `DESIGN_TOKENS_LOG=/tmp/tokens.log` to capture engine logs.

use design_tokens::log_init;
use design_tokens::{
    Color, CssChange, DesignTokenTree, ElementId, Palette, Result, TokenRegistry,
};

const THEME: &str = r#"
/* brand */
:root {
    --primary: #0178d4;
    --dark-mode: false;
}
"#;

fn print_scope(tree: &DesignTokenTree, label: &str, element: ElementId) {
    println!("{} {{", label);
    if let Some(scope) = tree.style_scope(element) {
        for (property, value) in scope.iter() {
            println!("    {}: {};", property, value);
        }
    }
    println!("}}");
}

fn print_changes(title: &str, changes: Vec<CssChange>) {
    println!("-- {} ({} changes)", title, changes.len());
    for change in changes {
        match change {
            CssChange::Write {
                element,
                property,
                value,
            } => println!("   {} {}: {}", element, property, value),
            CssChange::Remove { element, property } => println!("   {} remove {}", element, property),
        }
    }
}

fn main() -> Result<()> {
    log_init::init_from_env();

    let palette = Palette::new();
    let mut registry = TokenRegistry::new();
    palette.register(&mut registry);
    log::info!("registered palette tokens: {}", registry.names().join(", "));

    let mut tree = DesignTokenTree::new();
    let root = tree.create_root();
    let sidebar = tree.attach(root)?;
    let alert = tree.attach(root)?;

    tree.apply_declarations(root, THEME, &registry)?;
    palette.install(&mut tree, root)?;
    tree.observe(sidebar, &palette.background)?;
    tree.take_css_changes();

    print_scope(&tree, ":root", root);

    palette.dark.set_value_for(&mut tree, root, true)?;
    let changes = tree.take_css_changes();
    log::info!("dark mode rewrote {} custom properties", changes.len());
    print_changes("dark mode", changes);

    // A section with its own primary color gets its own shades.
    palette
        .primary
        .set_value_for(&mut tree, alert, Color::rgb(0xba, 0x3c, 0x5b))?;
    palette.install(&mut tree, alert)?;
    print_changes("alert palette", tree.take_css_changes());

    let hover = palette
        .shade("primary-lighten-1")
        .map(|token| token.create_css().to_string())
        .unwrap_or_default();
    println!("alert button background on hover: {}", hover);

    Ok(())
}
