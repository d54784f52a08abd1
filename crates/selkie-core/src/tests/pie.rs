use crate::*;

fn parse_pie_block(text: &str) -> PieModel {
    match parse(text).unwrap() {
        Diagram::Pie(m) => m,
        other => panic!("expected pie, got {:?}", other.kind()),
    }
}

#[test]
fn parses_quoted_entries_in_order() {
    let m = parse_pie_block("pie\n\"Cats\" : 2\n'Dogs' : 3");
    assert_eq!(m.slices.len(), 2);
    assert_eq!(m.slices[0].label, "Cats");
    assert_eq!(m.slices[0].value, 2.0);
    assert_eq!(m.slices[1].label, "Dogs");
}

#[test]
fn header_title_is_extracted() {
    let m = parse_pie_block("pie title Adoption by species\n\"Cats\" : 2");
    assert_eq!(m.title.as_deref(), Some("Adoption by species"));
}

#[test]
fn title_line_is_extracted() {
    let m = parse_pie_block("pie\ntitle Spread\n\"X\" : 1");
    assert_eq!(m.title.as_deref(), Some("Spread"));
}

#[test]
fn values_need_not_sum_to_100() {
    let m = parse_pie_block("pie\n\"X\" : 1\n\"Y\" : 1");
    let total: f64 = m.slices.iter().map(|s| s.value).sum();
    assert_eq!(total, 2.0);
}

#[test]
fn non_positive_values_drop_the_slice() {
    let m = parse_pie_block("pie\n\"Good\" : 5\n\"Bad\" : -1\n\"Zero\" : 0");
    assert_eq!(m.slices.len(), 1);
    assert_eq!(m.slices[0].label, "Good");
}

#[test]
fn unquoted_labels_are_tolerated() {
    let m = parse_pie_block("pie\nRust : 60\nOther : 40");
    assert_eq!(m.slices.len(), 2);
    assert_eq!(m.slices[0].label, "Rust");
}

#[test]
fn junk_lines_are_skipped() {
    let m = parse_pie_block("pie\n\"X\" : 1\nnot a data line\n\"Y\" : 2");
    assert_eq!(m.slices.len(), 2);
}

#[test]
fn escaped_quotes_inside_labels() {
    let m = parse_pie_block("pie\n\"say \\\"hi\\\"\" : 1");
    assert_eq!(m.slices[0].label, "say \"hi\"");
}

#[test]
fn title_keyword_requires_a_word_boundary() {
    let m = parse_pie_block("pie\ntitles : 5\n\"X\" : 1");
    assert_eq!(m.title, None);
    assert_eq!(m.slices.len(), 2);
    assert_eq!(m.slices[0].label, "titles");
}

#[test]
fn non_latin_labels() {
    let m = parse_pie_block("pie title 统计\n\"项目A\" : 35\n\"项目B\" : 65");
    assert_eq!(m.title.as_deref(), Some("统计"));
    assert_eq!(m.slices[0].label, "项目A");
}
