//! Bullet and numbering markup for list paragraphs.
//!
//! Not every paragraph exposes a bullet property (free text boxes do not), so
//! the formatter walks an ordered chain of strategies, from the high-level
//! property down to splicing raw `a:pPr` markup, and stops at the first one
//! that succeeds. Failures are logged and never surface to the caller.

use mdpptx_core::Result;
use mdpptx_pptx::markup::ns;
use mdpptx_pptx::{Bullet, Element, Paragraph};
use quick_xml::escape::escape;

use crate::options::NumberingStyle;

/// Character used for unordered items.
pub const BULLET_CHAR: char = '•';

/// Auto-numbering scheme used for ordered items.
pub const NUMBER_SCHEME: &str = "arabicPeriod";

/// Typeface inserted alongside bullets by the direct-tree strategy.
const BULLET_TYPEFACE: &str = "+mj-lt";

/// `a:pPr` children that follow the bullet in schema order.
const AFTER_BULLET: &[&str] = &["tabLst", "defRPr", "extLst"];

/// Kind of list an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// What a bullet strategy needs from a paragraph.
pub trait BulletTarget {
    /// Set the high-level bullet property.
    fn set_native_bullet(&mut self, bullet: Bullet) -> Result<()>;

    /// The raw `a:pPr` block, added if missing.
    fn properties_block(&mut self) -> Result<&mut Element>;

    /// Replace the whole raw `a:pPr` block.
    fn replace_properties(&mut self, properties: Element) -> Result<()>;
}

impl BulletTarget for Paragraph {
    fn set_native_bullet(&mut self, bullet: Bullet) -> Result<()> {
        self.set_bullet(bullet)
    }

    fn properties_block(&mut self) -> Result<&mut Element> {
        Ok(self.properties_or_insert())
    }

    fn replace_properties(&mut self, properties: Element) -> Result<()> {
        Paragraph::replace_properties(self, properties)
    }
}

/// A bullet strategy.
pub type Strategy = fn(&mut dyn BulletTarget, &Bullet) -> Result<()>;

/// The default chain, in order.
pub const STRATEGIES: &[(&str, Strategy)] = &[
    ("native", native),
    ("parsed-fragment", parsed_fragment),
    ("direct-tree", direct_tree),
    ("literal-splice", literal_splice),
];

/// Strategy 1: the paragraph's own bullet property.
pub fn native(target: &mut dyn BulletTarget, bullet: &Bullet) -> Result<()> {
    target.set_native_bullet(bullet.clone())
}

/// Strategy 2: parse the bullet from markup and append it to `a:pPr`.
pub fn parsed_fragment(target: &mut dyn BulletTarget, bullet: &Bullet) -> Result<()> {
    let markup = bullet_markup(bullet, &format!(r#" xmlns:a="{}""#, ns::DRAWINGML));
    let fragment = Element::parse(&markup)?;

    let block = target.properties_block()?;
    block.retain_children(|child| !Bullet::is_bullet_element(child));
    block.push(fragment);
    Ok(())
}

/// Strategy 3: build the elements directly, with an explicit bullet font.
pub fn direct_tree(target: &mut dyn BulletTarget, bullet: &Bullet) -> Result<()> {
    let block = target.properties_block()?;
    block.retain_children(|child| {
        !Bullet::is_bullet_element(child) && child.local_name() != "buFont"
    });

    let position = AFTER_BULLET
        .iter()
        .filter_map(|local| block.position(local))
        .min()
        .unwrap_or(block.children().len());
    block.insert(position, bullet.to_element());
    block.insert(
        position,
        Element::drawing("buFont").with_attr("typeface", BULLET_TYPEFACE),
    );
    Ok(())
}

/// Strategy 4: replace the whole properties block with a literal.
pub fn literal_splice(target: &mut dyn BulletTarget, bullet: &Bullet) -> Result<()> {
    let markup = format!(
        r#"<a:pPr xmlns:a="{}">{}</a:pPr>"#,
        ns::DRAWINGML,
        bullet_markup(bullet, "")
    );
    target.replace_properties(Element::parse(&markup)?)
}

/// Markup for a bullet element; `xmlns` is spliced into the start tag.
fn bullet_markup(bullet: &Bullet, xmlns: &str) -> String {
    match bullet {
        Bullet::Char(c) => format!(
            r#"<a:buChar{} char="{}"/>"#,
            xmlns,
            escape(c.to_string().as_str())
        ),
        Bullet::AutoNumber { scheme, start_at } => format!(
            r#"<a:buAutoNum{} type="{}" startAt="{}"/>"#,
            xmlns,
            escape(scheme.as_str()),
            start_at
        ),
        Bullet::None => format!("<a:buNone{}/>", xmlns),
    }
}

/// Applies list markup through the strategy chain.
#[derive(Debug, Clone)]
pub struct BulletFormatter {
    numbering: NumberingStyle,
    strategies: Vec<(&'static str, Strategy)>,
}

impl BulletFormatter {
    /// Formatter with the default chain.
    pub fn new(numbering: NumberingStyle) -> Self {
        Self::with_strategies(numbering, STRATEGIES.to_vec())
    }

    /// Formatter with a custom chain.
    pub fn with_strategies(numbering: NumberingStyle, strategies: Vec<(&'static str, Strategy)>) -> Self {
        Self {
            numbering,
            strategies,
        }
    }

    /// The bullet an item of `kind` receives.
    pub fn bullet_for(&self, kind: ListKind) -> Bullet {
        match (kind, self.numbering) {
            (ListKind::Unordered, _) => Bullet::Char(BULLET_CHAR),
            (ListKind::Ordered, NumberingStyle::AutoNumber) => Bullet::AutoNumber {
                scheme: NUMBER_SCHEME.to_string(),
                start_at: 1,
            },
            (ListKind::Ordered, NumberingStyle::Prefix) => Bullet::None,
        }
    }

    /// Mark `target` as a list item. Returns the name of the strategy that
    /// succeeded, or `None` when every strategy failed.
    pub fn apply(&self, target: &mut dyn BulletTarget, kind: ListKind, index: usize) -> Option<&'static str> {
        let bullet = self.bullet_for(kind);
        for (name, strategy) in &self.strategies {
            match strategy(target, &bullet) {
                Ok(()) => {
                    log::trace!("Item {} formatted by {} strategy", index, name);
                    return Some(*name);
                }
                Err(e) => log::trace!("Bullet strategy {} failed for item {}: {}", name, index, e),
            }
        }
        log::debug!("No bullet strategy succeeded for item {}", index);
        None
    }
}

impl Default for BulletFormatter {
    fn default() -> Self {
        Self::new(NumberingStyle::default())
    }
}
