use chrono::NaiveTime;
use dayplan::model::config::PlannerSettings;
use dayplan::ops::cycle::render_document;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;

fn load_fixture(fixture_name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(fixture_name);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Could not read fixture {}: {}", fixture_name, e))
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

/// Helper: render a fixture at `now` and assert byte-for-byte equality
fn assert_stable_at(fixture_name: &str, now: NaiveTime) {
    let source = load_fixture(fixture_name);
    let rendered = render_document(&source, &PlannerSettings::default(), now)
        .unwrap_or_else(|e| panic!("Could not render fixture {}: {}", fixture_name, e));

    assert_eq!(
        rendered.content, source,
        "Round-trip failed for fixture: {}",
        fixture_name
    );
}

#[test]
fn round_trip_before_the_day_starts() {
    assert_stable_at("weekday.md", at(6, 0));
    assert_stable_at("no_end.md", at(8, 59));
}

#[test]
fn round_trip_after_the_day_ends() {
    assert_stable_at("finished.md", at(23, 0));
}

#[test]
fn generated_block_is_removed_again() {
    let source = load_fixture("weekday.md");
    let settings = PlannerSettings::default();

    let midday = render_document(&source, &settings, at(10, 0)).unwrap();
    assert!(midday.content.contains("**Current Task**"));
    assert!(midday.content.contains("> ||09:00||"));
    assert!(midday.content.contains("- [x] 08:30 Standup"));

    let again = render_document(&midday.content, &settings, at(10, 0)).unwrap();
    assert_eq!(again.content, midday.content);

    let morning = render_document(&midday.content, &settings, at(6, 0)).unwrap();
    assert_eq!(morning.content, source);
}

#[test]
fn generated_chart_is_removed_again() {
    let source = load_fixture("no_end.md");
    let settings = PlannerSettings {
        mermaid: true,
        ..PlannerSettings::default()
    };

    let charted = render_document(&source, &settings, at(11, 0)).unwrap();
    assert!(charted.content.contains("```mermaid\ngantt\n"));
    assert_eq!(charted.content.matches("```mermaid").count(), 1);

    let recharted = render_document(&charted.content, &settings, at(11, 0)).unwrap();
    assert_eq!(recharted.content, charted.content);

    let plain = render_document(&charted.content, &PlannerSettings::default(), at(8, 0)).unwrap();
    assert_eq!(plain.content, source);
}

const HAND_WRITTEN: &str = "\
# Day Planner
```mermaid
flowchart LR
  A-->B
```
**Current Task**
- [ ] 09:00 A
- [ ] 10:00 B
---
";

#[test]
fn hand_written_blocks_survive_every_cycle() {
    let plain = PlannerSettings::default();
    let charted = PlannerSettings {
        mermaid: true,
        ..PlannerSettings::default()
    };

    let before = render_document(HAND_WRITTEN, &plain, at(8, 0)).unwrap();
    assert_eq!(before.content, HAND_WRITTEN);

    let after = render_document(HAND_WRITTEN, &plain, at(12, 0)).unwrap();
    assert_eq!(
        after.content,
        HAND_WRITTEN.replace("- [ ] 09:00 A\n- [ ] 10:00 B", "- [x] 09:00 A\n- [x] 10:00 B")
    );

    let mut content = HAND_WRITTEN.to_string();
    for (settings, hour) in [(&charted, 9), (&charted, 9), (&plain, 9), (&charted, 12), (&plain, 12)] {
        content = render_document(&content, settings, at(hour, 30)).unwrap().content;
        assert!(content.contains("```mermaid\nflowchart LR\n  A-->B\n```\n**Current Task**\n"));
        assert_eq!(content.matches("```mermaid").count(), 1 + usize::from(settings.mermaid));
    }
    assert_eq!(content, after.content);
}

#[test]
fn text_outside_the_block_survives_a_full_day() {
    let source = load_fixture("weekday.md");
    let settings = PlannerSettings::default();
    let (head, _) = source.split_once("## Day Planner").unwrap();
    let tail = "---\nFooter text, left alone.\n";

    let mut content = source.clone();
    for hour in 6..24 {
        content = render_document(&content, &settings, at(hour, 0)).unwrap().content;
        assert!(content.starts_with(head), "head changed at {}:00", hour);
        assert!(content.ends_with(tail), "tail changed at {}:00", hour);
    }
}
