//! In-memory synthetic OSM document built from one route group.
//!
//! Source ids never reach the output. Every element receives a fresh
//! negative id from an [`IdMinter`] shared by all documents of a run.

use std::borrow::Cow;
use std::io::{self, Write};

use geo::{BoundingRect, Coord, Rect};
use routepack_core::{RouteGroup, Tags, cascaded_union};

/// `version` attribute of the `<osm>` root.
pub const OSM_API_VERSION: &str = "0.6";
/// `version` attribute carried by every synthesised element.
pub const ELEMENT_VERSION: &str = "1";
/// `timestamp` attribute carried by every synthesised element.
pub const PLACEHOLDER_TIMESTAMP: &str = "0000-00-00T00:00:00Z";

const GENERATOR: &str = "routepack";

/// Strictly decreasing source of negative element ids.
///
/// # Examples
///
/// ```rust
/// use routepack_data::IdMinter;
///
/// let mut ids = IdMinter::new();
/// assert_eq!(ids.mint(), -1);
/// assert_eq!(ids.mint(), -2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdMinter {
    next: i64,
}

impl Default for IdMinter {
    fn default() -> Self {
        Self::new()
    }
}

impl IdMinter {
    /// Start minting at `-1`.
    pub const fn new() -> Self {
        Self { next: -1 }
    }

    /// Return the next id.
    pub fn mint(&mut self) -> i64 {
        let id = self.next;
        self.next -= 1;
        id
    }

    /// Number of ids handed out so far.
    pub const fn minted(&self) -> u64 {
        (-1 - self.next).unsigned_abs()
    }
}

/// A synthesised node.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticNode {
    /// Minted id.
    pub id: i64,
    /// WGS84 position (`x = longitude`, `y = latitude`).
    pub position: Coord<f64>,
}

/// A synthesised way with its nodes.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticWay {
    /// Minted id.
    pub id: i64,
    /// Tags copied from the source way.
    pub tags: Tags,
    /// Nodes in line order.
    pub nodes: Vec<SyntheticNode>,
}

/// A synthesised relation with its member ways.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticRelation {
    /// Minted id.
    pub id: i64,
    /// Tags copied from the source relation.
    pub tags: Tags,
    /// Member ways that carried geometry.
    pub ways: Vec<SyntheticWay>,
}

/// One bundle's worth of synthesised elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyntheticDocument {
    relations: Vec<SyntheticRelation>,
    bounds: Option<Rect<f64>>,
}

impl SyntheticDocument {
    /// Build a document from `group`, minting ids from `ids`.
    ///
    /// Ids are minted relation first, then each way followed by its nodes.
    /// Ways without a line are dropped, so a relation may end up with no
    /// members.
    pub fn from_group(group: RouteGroup, ids: &mut IdMinter) -> Self {
        let mut extents = Vec::new();
        let relations = group
            .into_entries()
            .into_iter()
            .map(|entry| {
                let relation_id = ids.mint();
                let ways = entry
                    .ways
                    .into_iter()
                    .filter_map(|way| {
                        let line = way.line?;
                        extents.push(line.bounding_rect());
                        let way_id = ids.mint();
                        let nodes = line
                            .0
                            .into_iter()
                            .map(|position| SyntheticNode {
                                id: ids.mint(),
                                position,
                            })
                            .collect();
                        Some(SyntheticWay {
                            id: way_id,
                            tags: way.tags,
                            nodes,
                        })
                    })
                    .collect();
                SyntheticRelation {
                    id: relation_id,
                    tags: entry.tags,
                    ways,
                }
            })
            .collect();

        Self {
            relations,
            bounds: cascaded_union(&extents),
        }
    }

    /// Relations in output order.
    pub fn relations(&self) -> &[SyntheticRelation] {
        &self.relations
    }

    /// Bounding rectangle of every node, if the document has any.
    pub const fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    /// Number of relation elements.
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }

    /// Number of way elements.
    pub fn way_count(&self) -> usize {
        self.relations.iter().map(|relation| relation.ways.len()).sum()
    }

    /// Number of node elements.
    pub fn node_count(&self) -> usize {
        self.relations
            .iter()
            .flat_map(|relation| &relation.ways)
            .map(|way| way.nodes.len())
            .sum()
    }

    /// Serialise the document as OSM XML.
    ///
    /// Each way's nodes precede the way, and each relation follows its ways.
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            out,
            r#"<osm version="{OSM_API_VERSION}" generator="{GENERATOR}">"#
        )?;
        if let Some(bounds) = self.bounds {
            writeln!(
                out,
                r#"  <bounds minlat="{:.7}" minlon="{:.7}" maxlat="{:.7}" maxlon="{:.7}"/>"#,
                bounds.min().y,
                bounds.min().x,
                bounds.max().y,
                bounds.max().x,
            )?;
        }
        for relation in &self.relations {
            for way in &relation.ways {
                write_way(out, way)?;
            }
            writeln!(
                out,
                r#"  <relation id="{}" version="{ELEMENT_VERSION}" timestamp="{PLACEHOLDER_TIMESTAMP}">"#,
                relation.id
            )?;
            for way in &relation.ways {
                writeln!(out, r#"    <member type="way" ref="{}" role=""/>"#, way.id)?;
            }
            write_tags(out, &relation.tags)?;
            writeln!(out, "  </relation>")?;
        }
        writeln!(out, "</osm>")
    }
}

fn write_way<W: Write>(out: &mut W, way: &SyntheticWay) -> io::Result<()> {
    for node in &way.nodes {
        writeln!(
            out,
            r#"  <node id="{}" version="{ELEMENT_VERSION}" timestamp="{PLACEHOLDER_TIMESTAMP}" lat="{:.7}" lon="{:.7}"/>"#,
            node.id, node.position.y, node.position.x
        )?;
    }
    writeln!(
        out,
        r#"  <way id="{}" version="{ELEMENT_VERSION}" timestamp="{PLACEHOLDER_TIMESTAMP}">"#,
        way.id
    )?;
    for node in &way.nodes {
        writeln!(out, r#"    <nd ref="{}"/>"#, node.id)?;
    }
    write_tags(out, &way.tags)?;
    writeln!(out, "  </way>")
}

fn write_tags<W: Write>(out: &mut W, tags: &Tags) -> io::Result<()> {
    for (key, value) in tags {
        writeln!(
            out,
            r#"    <tag k="{}" v="{}"/>"#,
            escape_xml(key),
            escape_xml(value)
        )?;
    }
    Ok(())
}

/// Escape `raw` for use in an XML attribute value.
///
/// The five markup characters become entities. Tabs and line breaks become
/// character references so attribute normalisation keeps them. Characters
/// XML 1.0 does not allow are replaced with U+FFFD.
pub fn escape_xml(raw: &str) -> Cow<'_, str> {
    if !raw.chars().any(needs_escape) {
        return Cow::Borrowed(raw);
    }
    let mut out = String::with_capacity(raw.len() + 8);
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push_str("&#9;"),
            '\n' => out.push_str("&#10;"),
            '\r' => out.push_str("&#13;"),
            _ if is_xml_char(ch) => out.push(ch),
            _ => out.push(char::REPLACEMENT_CHARACTER),
        }
    }
    Cow::Owned(out)
}

fn needs_escape(ch: char) -> bool {
    matches!(ch, '&' | '<' | '>' | '"' | '\'' | '\t' | '\n' | '\r') || !is_xml_char(ch)
}

const fn is_xml_char(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

#[cfg(test)]
mod tests;
