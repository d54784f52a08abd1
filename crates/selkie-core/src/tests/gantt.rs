use crate::*;
use chrono::NaiveDate;

fn parse_gantt_block(text: &str) -> GanttModel {
    match parse(text).unwrap() {
        Diagram::Gantt(m) => m,
        other => panic!("expected gantt, got {:?}", other.kind()),
    }
}

#[test]
fn sections_group_tasks_in_order() {
    let m = parse_gantt_block(
        "gantt\nsection Planning\nScope : 0, 3\nEstimate : 3, 2\nsection Build\nImplement : 5, 10",
    );
    assert_eq!(m.sections.len(), 2);
    assert_eq!(m.sections[0].name, "Planning");
    assert_eq!(m.sections[0].tasks.len(), 2);
    assert_eq!(m.sections[1].tasks[0].label, "Implement");
}

#[test]
fn tasks_before_any_section_use_a_default_section() {
    let m = parse_gantt_block("gantt\nEarly : 0, 1\nsection Later\nNext : 1, 2");
    assert_eq!(m.sections.len(), 2);
    assert_eq!(m.sections[0].name, "");
    assert_eq!(m.sections[0].tasks[0].label, "Early");
}

#[test]
fn numeric_and_date_starts() {
    let m = parse_gantt_block("gantt\nA : 2, 3\nB : 2024-01-10, 4");
    let tasks: Vec<_> = m.tasks().collect();
    assert_eq!(tasks[0].start, TaskStart::Offset(2.0));
    assert_eq!(
        tasks[1].start,
        TaskStart::Date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap())
    );
}

#[test]
fn duration_units_scale_to_days() {
    let m = parse_gantt_block("gantt\nA : 0, 3d\nB : 0, 2w\nC : 0, 1.5");
    let tasks: Vec<_> = m.tasks().collect();
    assert_eq!(tasks[0].duration, 3.0);
    assert_eq!(tasks[1].duration, 14.0);
    assert_eq!(tasks[2].duration, 1.5);
}

#[test]
fn title_line_is_extracted() {
    let m = parse_gantt_block("gantt\ntitle Release plan\nsection S\nA : 0, 1");
    assert_eq!(m.title.as_deref(), Some("Release plan"));
}

#[test]
fn malformed_tasks_are_skipped() {
    let m = parse_gantt_block("gantt\nsection S\nGood : 0, 2\nBad : nonsense\nAlso bad\n: 0, 1");
    assert_eq!(m.task_count(), 1);
}

#[test]
fn keyword_prefixes_require_a_word_boundary() {
    let m = parse_gantt_block("gantt\nsection S\ntitles : 5, 2\nsectionX : 1, 1");
    assert_eq!(m.title, None);
    assert_eq!(m.sections.len(), 1);
    assert_eq!(m.sections[0].tasks[0].label, "titles");
    assert_eq!(m.sections[0].tasks[1].label, "sectionX");
}

#[test]
fn models_stay_serde_compatible() {
    fn assert_serde<T: serde::Serialize + serde::de::DeserializeOwned>() {}
    assert_serde::<GanttModel>();
    assert_serde::<TaskStart>();
}

#[test]
fn non_positive_durations_are_skipped() {
    let m = parse_gantt_block("gantt\nsection S\nA : 0, 0\nB : 0, -2\nC : 0, 1");
    assert_eq!(m.task_count(), 1);
    assert_eq!(m.tasks().next().unwrap().label, "C");
}
