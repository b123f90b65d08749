//! A theme palette expressed as design tokens.
//!
//! From a `primary` color and a `dark-mode` switch, the palette derives the
//! rest of a theme: secondary, background, surface and foreground colors,
//! text that contrasts with the primary, and three darker and three lighter
//! shades of the main colors:
//!
//! - `--primary-darken-1`, `--primary-darken-2`, `--primary-darken-3`
//! - `--primary-lighten-1`, `--primary-lighten-2`, `--primary-lighten-3`
//!
//! Every derived token re-evaluates when its inputs change, so switching
//! `dark-mode` or the primary color on an element updates the whole theme
//! (and its custom properties) below it.

use design_token::{DesignTokenTree, ElementId, Result, Token, TokenRegistry};
use token_css::Color;

const DARK_BACKGROUND: Color = Color::rgb(0x12, 0x12, 0x12);
const LIGHT_BACKGROUND: Color = Color::rgb(0xef, 0xef, 0xef);
const DARK_SURFACE: Color = Color::rgb(0x1e, 0x1e, 0x1e);
const LIGHT_SURFACE: Color = Color::rgb(0xf5, 0xf5, 0xf5);
const DARK_FOREGROUND: Color = Color::rgb(0xe0, 0xe0, 0xe0);
const LIGHT_FOREGROUND: Color = Color::rgb(0x1e, 0x1e, 0x1e);

/// Lightness steps for the `-darken-N` / `-lighten-N` shades.
const SHADE_STEPS: [f32; 3] = [0.10, 0.20, 0.30];

struct Shade {
    token: Token<Color>,
    base: Token<Color>,
    /// Negative values darken.
    amount: f32,
}

/// Theme tokens derived from a primary color.
pub struct Palette {
    pub dark: Token<bool>,
    pub primary: Token<Color>,
    pub secondary: Token<Color>,
    pub background: Token<Color>,
    pub surface: Token<Color>,
    pub foreground: Token<Color>,
    pub foreground_muted: Token<Color>,
    pub on_primary: Token<Color>,
    shades: Vec<Shade>,
}

impl Palette {
    pub fn new() -> Self {
        let primary = Token::<Color>::create("primary");
        let secondary = Token::<Color>::create("secondary");
        let background = Token::<Color>::create("background");

        let mut shades = Vec::new();
        for base in [&primary, &secondary, &background] {
            for (index, step) in SHADE_STEPS.iter().enumerate() {
                shades.push(Shade {
                    token: Token::create(format!("{}-darken-{}", base.name(), index + 1)),
                    base: base.clone(),
                    amount: -step,
                });
            }
            for (index, step) in SHADE_STEPS.iter().enumerate() {
                shades.push(Shade {
                    token: Token::create(format!("{}-lighten-{}", base.name(), index + 1)),
                    base: base.clone(),
                    amount: *step,
                });
            }
        }

        Self {
            dark: Token::create_with("dark-mode", false).with_default(false),
            primary,
            secondary,
            background,
            surface: Token::create("surface"),
            foreground: Token::create("foreground"),
            foreground_muted: Token::create("foreground-muted"),
            on_primary: Token::create("on-primary"),
            shades,
        }
    }

    /// Looks up a shade token such as `primary-lighten-2`.
    pub fn shade(&self, name: &str) -> Option<&Token<Color>> {
        self.shades
            .iter()
            .find(|shade| shade.token.name() == name)
            .map(|shade| &shade.token)
    }

    pub fn shade_names(&self) -> impl Iterator<Item = &str> {
        self.shades.iter().map(|shade| shade.token.name())
    }

    /// Registers the tokens that can be configured from CSS declarations.
    pub fn register(&self, registry: &mut TokenRegistry) {
        registry
            .register(&self.dark)
            .register(&self.primary)
            .register(&self.background)
            .register(&self.surface)
            .register(&self.foreground);
    }

    /// Assigns every derived palette token on `element`.
    ///
    /// `primary` must be assigned on `element` or an ancestor for the colors
    /// that depend on it to resolve.
    pub fn install(&self, tree: &mut DesignTokenTree, element: ElementId) -> Result<()> {
        self.by_mode(tree, element, &self.background, DARK_BACKGROUND, LIGHT_BACKGROUND)?;
        self.by_mode(tree, element, &self.surface, DARK_SURFACE, LIGHT_SURFACE)?;
        self.by_mode(tree, element, &self.foreground, DARK_FOREGROUND, LIGHT_FOREGROUND)?;

        let (dark, primary) = (self.dark.clone(), self.primary.clone());
        self.secondary.set_derived_for(tree, element, move |reader| {
            let primary = reader.get(&primary)?;
            Ok(if reader.get(&dark)? {
                primary.darken(0.15)
            } else {
                primary.lighten(0.15)
            })
        })?;

        let foreground = self.foreground.clone();
        self.foreground_muted.set_derived_for(tree, element, move |reader| {
            Ok(reader.get(&foreground)?.with_alpha(0.6))
        })?;

        let primary = self.primary.clone();
        self.on_primary.set_derived_for(tree, element, move |reader| {
            Ok(reader.get(&primary)?.contrasting_text())
        })?;

        for shade in &self.shades {
            let base = shade.base.clone();
            let amount = shade.amount;
            shade.token.set_derived_for(tree, element, move |reader| {
                let color = reader.get(&base)?;
                Ok(if amount < 0.0 {
                    color.darken(-amount)
                } else {
                    color.lighten(amount)
                })
            })?;
        }
        Ok(())
    }

    fn by_mode(
        &self,
        tree: &mut DesignTokenTree,
        element: ElementId,
        token: &Token<Color>,
        dark_value: Color,
        light_value: Color,
    ) -> Result<()> {
        let dark = self.dark.clone();
        token.set_derived_for(tree, element, move |reader| {
            Ok(if reader.get(&dark)? { dark_value } else { light_value })
        })
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn themed_tree() -> (DesignTokenTree, ElementId, Palette) {
        let palette = Palette::new();
        let mut tree = DesignTokenTree::new();
        let root = tree.create_root();
        palette
            .primary
            .set_value_for(&mut tree, root, Color::rgb(1, 120, 212))
            .unwrap();
        palette.install(&mut tree, root).unwrap();
        (tree, root, palette)
    }

    #[test]
    fn test_shade_names() {
        let palette = Palette::new();
        let names: Vec<&str> = palette.shade_names().take(6).collect();
        assert_eq!(
            names,
            vec![
                "primary-darken-1",
                "primary-darken-2",
                "primary-darken-3",
                "primary-lighten-1",
                "primary-lighten-2",
                "primary-lighten-3",
            ]
        );
        assert_eq!(palette.shade_names().count(), 18);
        assert!(palette.shade("background-lighten-3").is_some());
        assert!(palette.shade("surface-lighten-1").is_none());
    }

    #[test]
    fn test_shades_follow_primary() {
        let (mut tree, root, palette) = themed_tree();
        let primary = Color::rgb(1, 120, 212);

        let darken_2 = palette.shade("primary-darken-2").unwrap();
        assert_eq!(darken_2.get_value_for(&mut tree, root), Ok(primary.darken(0.20)));

        let red = Color::rgb(200, 30, 30);
        palette.primary.set_value_for(&mut tree, root, red).unwrap();
        assert_eq!(darken_2.get_value_for(&mut tree, root), Ok(red.darken(0.20)));
        assert_eq!(
            palette.on_primary.get_value_for(&mut tree, root),
            Ok(red.contrasting_text())
        );
    }

    #[test]
    fn test_dark_mode_switch() {
        let (mut tree, root, palette) = themed_tree();
        assert_eq!(
            palette.background.get_value_for(&mut tree, root),
            Ok(LIGHT_BACKGROUND)
        );

        palette.dark.set_value_for(&mut tree, root, true).unwrap();
        assert_eq!(
            palette.background.get_value_for(&mut tree, root),
            Ok(DARK_BACKGROUND)
        );
        assert_eq!(
            palette.foreground_muted.get_value_for(&mut tree, root),
            Ok(DARK_FOREGROUND.with_alpha(0.6))
        );
        let scope = tree.style_scope(root).unwrap();
        assert_eq!(scope.get("--background"), Some("#121212"));
        assert_eq!(scope.get("--foreground"), Some("#e0e0e0"));
    }

    #[test]
    fn test_section_rebases_palette() {
        let (mut tree, root, palette) = themed_tree();
        let section = tree.attach(root).unwrap();
        let green = Color::rgb(40, 160, 80);

        palette.primary.set_value_for(&mut tree, section, green).unwrap();
        palette.install(&mut tree, section).unwrap();

        let lighten_1 = palette.shade("primary-lighten-1").unwrap();
        assert_eq!(lighten_1.get_value_for(&mut tree, section), Ok(green.lighten(0.10)));
        assert_eq!(
            lighten_1.get_value_for(&mut tree, root),
            Ok(Color::rgb(1, 120, 212).lighten(0.10))
        );
        assert!(tree.style_scope(section).unwrap().contains("--primary-lighten-1"));
    }
}
