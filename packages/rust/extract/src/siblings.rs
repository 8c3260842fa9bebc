//! Bounded forward scan over the siblings that follow a cruise heading.
//!
//! Field values live in the paragraphs after a heading's wrapper element and
//! are located by marker text. The siblings are flattened once into
//! [`SiblingBlock`]s and searched with a fixed lookahead per marker.

use scraper::{ElementRef, Node, Selector};

use worldcruise_shared::{Result, WorldCruiseError};

/// Flattened text of one sibling node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiblingBlock {
    /// All descendant text, concatenated.
    pub text: String,
    /// Text of each `<a>` inside the node.
    pub links: Vec<String>,
}

impl SiblingBlock {
    pub fn contains(&self, marker: &str) -> bool {
        self.text.contains(marker)
    }
}

/// Flatten up to `limit` siblings following `element`.
pub fn following_blocks(element: ElementRef<'_>, limit: usize) -> Vec<SiblingBlock> {
    let link_sel = Selector::parse("a").unwrap();
    element
        .next_siblings()
        .take(limit)
        .map(|node| block_of(ElementRef::wrap(node), node.value(), &link_sel))
        .collect()
}

/// Text of each sibling preceding `element`, nearest first.
pub fn preceding_texts(element: ElementRef<'_>) -> impl Iterator<Item = String> + '_ {
    element
        .prev_siblings()
        .map(|node| node_text(ElementRef::wrap(node), node.value()))
}

fn block_of(element: Option<ElementRef<'_>>, value: &Node, link_sel: &Selector) -> SiblingBlock {
    let links = element
        .map(|el| {
            el.select(link_sel)
                .map(|a| a.text().collect::<String>())
                .collect()
        })
        .unwrap_or_default();

    SiblingBlock {
        text: node_text(element, value),
        links,
    }
}

fn node_text(element: Option<ElementRef<'_>>, value: &Node) -> String {
    match element {
        Some(el) => el.text().collect(),
        None => value.as_text().map(|t| String::from(&**t)).unwrap_or_default(),
    }
}

// ---------------------------------------------------------------------------
// SiblingWalk
// ---------------------------------------------------------------------------

/// Cursor over flattened sibling blocks.
#[derive(Debug)]
pub struct SiblingWalk {
    heading: String,
    blocks: Vec<SiblingBlock>,
    cursor: usize,
    max_lookahead: usize,
}

impl SiblingWalk {
    /// `heading` names the cruise in structure errors.
    pub fn new(heading: impl Into<String>, blocks: Vec<SiblingBlock>, max_lookahead: usize) -> Self {
        Self {
            heading: heading.into(),
            blocks,
            cursor: 0,
            max_lookahead,
        }
    }

    /// Find the next block whose text contains `marker` and move the cursor
    /// past it. At most `max_lookahead` blocks are examined.
    pub fn seek(&mut self, marker: &str) -> Result<usize> {
        let start = self.cursor;
        let window_end = start.saturating_add(self.max_lookahead);

        for idx in start..window_end.min(self.blocks.len()) {
            if self.blocks[idx].contains(marker) {
                self.cursor = idx + 1;
                return Ok(idx);
            }
        }

        let message = if window_end <= self.blocks.len() {
            format!(
                "marker {marker:?} not found within {} siblings",
                self.max_lookahead
            )
        } else {
            format!("marker {marker:?} not found before the end of the sibling list")
        };
        Err(WorldCruiseError::structure(&self.heading, message))
    }

    pub fn block(&self, idx: usize) -> &SiblingBlock {
        &self.blocks[idx]
    }

    /// Blocks in `start..end`.
    pub fn span(&self, start: usize, end: usize) -> &[SiblingBlock] {
        &self.blocks[start..end]
    }
}
