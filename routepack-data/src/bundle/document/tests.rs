use super::*;
use std::collections::HashSet;

use geo::LineString;
use routepack_core::{GroupEntry, GroupWay, RouteKey, tags_from_flat};
use rstest::{fixture, rstest};

fn line(origin: f64, points: usize) -> LineString<f64> {
    (0..points)
        .map(|step| (origin + step as f64 * 0.01, 40.0 + step as f64 * 0.01))
        .collect::<Vec<_>>()
        .into()
}

fn entry(relation_id: i64, reference: &str, ways: Vec<GroupWay>) -> GroupEntry {
    let tags = tags_from_flat(["network", "US:I", "ref", reference, "route", "road"]);
    GroupEntry {
        relation_id,
        key: RouteKey::from_tags(&tags),
        tags,
        ways,
    }
}

fn way(way_id: i64, line: Option<LineString<f64>>) -> GroupWay {
    GroupWay {
        way_id,
        tags: tags_from_flat(["highway", "motorway"]),
        line,
    }
}

/// Two interstates, each with three five-point ways.
#[fixture]
fn interstates() -> RouteGroup {
    [(1, "90", -90.0), (2, "94", -88.0)]
        .into_iter()
        .map(|(id, reference, origin)| {
            let ways = (0..3)
                .map(|index| way(id * 10 + index, Some(line(origin + index as f64, 5))))
                .collect();
            entry(id, reference, ways)
        })
        .collect()
}

fn render(document: &SyntheticDocument) -> String {
    let mut out = Vec::new();
    document.write_to(&mut out).expect("serialise document");
    String::from_utf8(out).expect("utf-8 output")
}

#[rstest]
fn interstates_produce_expected_element_counts(interstates: RouteGroup) {
    let document = SyntheticDocument::from_group(interstates, &mut IdMinter::new());
    assert_eq!(document.relation_count(), 2);
    assert_eq!(document.way_count(), 6);
    assert_eq!(document.node_count(), 30);

    let xml = render(&document);
    let parsed = roxmltree::Document::parse(&xml).expect("well-formed xml");
    let count = |name: &str| {
        parsed
            .descendants()
            .filter(|node| node.has_tag_name(name))
            .count()
    };
    assert_eq!(count("relation"), 2);
    assert_eq!(count("way"), 6);
    assert_eq!(count("node"), 30);
    assert_eq!(count("member"), 6);
    assert_eq!(count("nd"), 30);
}

#[rstest]
fn elements_follow_dependency_order(interstates: RouteGroup) {
    let document = SyntheticDocument::from_group(interstates, &mut IdMinter::new());
    let xml = render(&document);
    let parsed = roxmltree::Document::parse(&xml).expect("well-formed xml");
    let names: Vec<_> = parsed
        .root_element()
        .children()
        .filter(roxmltree::Node::is_element)
        .map(|node| node.tag_name().name().to_owned())
        .filter(|name| name != "bounds")
        .collect();

    let mut expected = Vec::new();
    for _ in 0..2 {
        for _ in 0..3 {
            expected.extend(std::iter::repeat_n("node".to_owned(), 5));
            expected.push("way".to_owned());
        }
        expected.push("relation".to_owned());
    }
    assert_eq!(names, expected);
}

#[rstest]
fn every_element_carries_placeholder_metadata(interstates: RouteGroup) {
    let document = SyntheticDocument::from_group(interstates, &mut IdMinter::new());
    let xml = render(&document);
    let parsed = roxmltree::Document::parse(&xml).expect("well-formed xml");
    let root = parsed.root_element();
    assert_eq!(root.attribute("version"), Some(OSM_API_VERSION));
    for element in root.children().filter(|node| {
        node.has_tag_name("node") || node.has_tag_name("way") || node.has_tag_name("relation")
    }) {
        assert_eq!(element.attribute("version"), Some(ELEMENT_VERSION));
        assert_eq!(element.attribute("timestamp"), Some(PLACEHOLDER_TIMESTAMP));
        let id: i64 = element
            .attribute("id")
            .and_then(|raw| raw.parse().ok())
            .expect("numeric id");
        assert!(id < 0);
    }
}

#[rstest]
fn ids_are_unique_across_documents(interstates: RouteGroup) {
    let mut ids = IdMinter::new();
    let first = SyntheticDocument::from_group(interstates.clone(), &mut ids);
    let second = SyntheticDocument::from_group(interstates, &mut ids);

    let mut seen = HashSet::new();
    for document in [&first, &second] {
        for relation in document.relations() {
            assert!(seen.insert(relation.id));
            for way in &relation.ways {
                assert!(seen.insert(way.id));
                for node in &way.nodes {
                    assert!(seen.insert(node.id));
                }
            }
        }
    }
    assert_eq!(seen.len(), 76);
    assert_eq!(ids.minted(), 76);
    assert!(seen.iter().all(|id| (-76..=-1).contains(id)));
}

#[rstest]
fn ids_are_minted_relation_way_then_nodes() {
    let group: RouteGroup = [entry(7, "90", vec![way(70, Some(line(0.0, 2)))])]
        .into_iter()
        .collect();
    let document = SyntheticDocument::from_group(group, &mut IdMinter::new());
    let relation = &document.relations()[0];
    assert_eq!(relation.id, -1);
    assert_eq!(relation.ways[0].id, -2);
    let node_ids: Vec<_> = relation.ways[0].nodes.iter().map(|node| node.id).collect();
    assert_eq!(node_ids, vec![-3, -4]);
}

#[rstest]
fn ways_without_lines_are_dropped() {
    let group: RouteGroup = [entry(1, "90", vec![way(10, None), way(11, None)])]
        .into_iter()
        .collect();
    let document = SyntheticDocument::from_group(group, &mut IdMinter::new());

    assert_eq!(document.relation_count(), 1);
    assert_eq!(document.way_count(), 0);
    assert!(document.bounds().is_none());

    let xml = render(&document);
    let parsed = roxmltree::Document::parse(&xml).expect("well-formed xml");
    let relation = parsed
        .descendants()
        .find(|node| node.has_tag_name("relation"))
        .expect("relation element");
    assert!(relation.children().all(|child| !child.has_tag_name("member")));
}

#[rstest]
fn coordinates_use_seven_decimals_and_bounds_cover_nodes() {
    let line = LineString::from(vec![(-87.123_456_78, 41.5), (-86.0, 42.000_000_04)]);
    let group: RouteGroup = [entry(1, "90", vec![way(10, Some(line))])]
        .into_iter()
        .collect();
    let document = SyntheticDocument::from_group(group, &mut IdMinter::new());
    let xml = render(&document);

    assert!(xml.contains(r#"lat="41.5000000" lon="-87.1234568""#), "{xml}");
    assert!(xml.contains(
        r#"<bounds minlat="41.5000000" minlon="-87.1234568" maxlat="42.0000000" maxlon="-86.0000000"/>"#
    ));
}

#[rstest]
fn tag_values_are_escaped() {
    let mut relation = entry(1, "90", Vec::new());
    relation
        .tags
        .insert("name".to_owned(), r#"Tom & Jerry's "<Expressway>""#.to_owned());
    let group: RouteGroup = [relation].into_iter().collect();
    let document = SyntheticDocument::from_group(group, &mut IdMinter::new());
    let xml = render(&document);

    let parsed = roxmltree::Document::parse(&xml).expect("well-formed xml");
    let name = parsed
        .descendants()
        .find(|node| node.has_tag_name("tag") && node.attribute("k") == Some("name"))
        .and_then(|node| node.attribute("v"));
    assert_eq!(name, Some(r#"Tom & Jerry's "<Expressway>""#));
}

#[rstest]
fn whitespace_survives_and_control_characters_are_replaced() {
    let mut relation = entry(1, "90", Vec::new());
    relation
        .tags
        .insert("note".to_owned(), "a\nb\tc\r\nd".to_owned());
    relation.tags.insert("fixme".to_owned(), "x\u{1}y".to_owned());
    let group: RouteGroup = [relation].into_iter().collect();
    let document = SyntheticDocument::from_group(group, &mut IdMinter::new());
    let xml = render(&document);

    let parsed = roxmltree::Document::parse(&xml).expect("well-formed xml");
    let value = |key: &str| {
        parsed
            .descendants()
            .find(|node| node.has_tag_name("tag") && node.attribute("k") == Some(key))
            .and_then(|node| node.attribute("v"))
            .map(str::to_owned)
    };
    assert_eq!(value("note").as_deref(), Some("a\nb\tc\r\nd"));
    assert_eq!(value("fixme").as_deref(), Some("x\u{FFFD}y"));
}

#[rstest]
#[case("plain", "plain")]
#[case("A&B", "A&amp;B")]
#[case("<x>", "&lt;x&gt;")]
#[case(r#"say "hi""#, "say &quot;hi&quot;")]
#[case("it's", "it&apos;s")]
#[case("a\nb", "a&#10;b")]
#[case("a\r\nb", "a&#13;&#10;b")]
#[case("a\tb", "a&#9;b")]
#[case("x\u{1}y", "x\u{FFFD}y")]
#[case("\u{FFFE}", "\u{FFFD}")]
#[case("Straße 🚲", "Straße 🚲")]
fn escapes_xml_special_characters(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(escape_xml(raw), expected);
}
