use crate::naming::slugify;
use crate::outline::{CourseRef, RawCourse, COURSE_HOST};

/// Unit classification and sequencing.
///
/// Flattens the catalog's section listing into one ordered list, assigns a
/// stable 1-based sequence number to every unit regardless of type, and
/// classifies each unit as video or other. Pure; no I/O.

/// Declared content kind of a unit. Closed variant so a new non-video kind
/// can never be misrouted into the video-only stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Video,
    Other,
}

impl UnitKind {
    fn classify(raw_kind: &str) -> Self {
        if raw_kind.eq_ignore_ascii_case("video") {
            UnitKind::Video
        } else {
            UnitKind::Other
        }
    }
}

/// One addressable piece of course content in its course position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// 1-based position in the flattened outline. Unique and contiguous
    /// within one course snapshot; not stable across catalog edits.
    pub sequence: u32,
    pub title: String,
    pub kind: UnitKind,
    /// The catalog's key for this unit.
    pub native_id: String,
    /// Canonical lesson page URL; the extractor resolves media from it.
    pub view_url: String,
}

impl Unit {
    pub fn is_video(&self) -> bool {
        self.kind == UnitKind::Video
    }
}

/// The resolved, ordered outline of one course.
#[derive(Debug)]
pub struct CourseOutline {
    pub title: String,
    pub units: Vec<Unit>,
}

impl CourseOutline {
    /// Video units in ascending sequence order.
    pub fn videos(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_video())
    }
}

/// Flattens the raw outline and assigns sequence numbers.
///
/// Sections are walked in listed order with their units in declared order;
/// every unit consumes a sequence number whether or not it is a video, so
/// video sequence numbers may have gaps relative to a video-only listing.
/// When the catalog serves no listing, units fall back to the order of
/// their native index. Listing entries without a matching unit record are
/// dropped; they carry no title or type to work with.
pub fn sequence(course: &CourseRef, raw: &RawCourse) -> CourseOutline {
    let title = raw
        .name
        .clone()
        .unwrap_or_else(|| course.course_id.clone());

    let mut ordered_keys: Vec<&str> = Vec::new();
    for block in &raw.listing {
        for item in &block.content {
            if item.kind == "lesson" {
                if let Some(key) = item.key.as_deref() {
                    if raw.lessons.contains_key(key) {
                        ordered_keys.push(key);
                    }
                }
            }
        }
    }

    if ordered_keys.is_empty() {
        let mut pairs: Vec<(&String, i64)> = raw
            .lessons
            .iter()
            .map(|(key, unit)| (key, unit.index))
            .collect();
        pairs.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
        ordered_keys = pairs.into_iter().map(|(key, _)| key.as_str()).collect();
    }

    let units = ordered_keys
        .into_iter()
        .enumerate()
        .map(|(position, key)| {
            let raw_unit = &raw.lessons[key];
            let sequence = (position + 1) as u32;
            let title = raw_unit
                .name
                .clone()
                .unwrap_or_else(|| format!("Lesson {sequence}"));
            let lesson_slug = raw_unit.slug.clone().unwrap_or_else(|| key.to_string());
            let view_url = format!(
                "https://{COURSE_HOST}/courses/{}/lesson/{}/{}",
                course.course_id,
                lesson_slug,
                slugify(&title)
            );
            Unit {
                sequence,
                title,
                kind: UnitKind::classify(&raw_unit.kind),
                native_id: key.to_string(),
                view_url,
            }
        })
        .collect();

    CourseOutline { title, units }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outline::parse_outline;

    fn course() -> CourseRef {
        CourseRef::parse("https://learn.deeplearning.ai/courses/test-course").unwrap()
    }

    fn outline_json(kinds: &[&str]) -> String {
        let lessons: Vec<String> = kinds
            .iter()
            .enumerate()
            .map(|(i, kind)| {
                format!(
                    r#""k{}": {{"type": "{}", "index": {}, "name": "Unit {}", "slug": "u{}"}}"#,
                    i,
                    kind,
                    i + 1,
                    i + 1,
                    i
                )
            })
            .collect();
        let listing: Vec<String> = kinds
            .iter()
            .enumerate()
            .map(|(i, _)| format!(r#"{{"type": "lesson", "key": "k{i}"}}"#))
            .collect();
        format!(
            r#"{{"result": {{"data": {{"json": {{
                "name": "Test Course",
                "lessons": {{{}}},
                "listing": [{{"content": [{}]}}]
            }}}}}}}}"#,
            lessons.join(","),
            listing.join(",")
        )
    }

    #[test]
    fn sequences_are_contiguous_from_one() {
        let raw = parse_outline(&outline_json(&["other", "video", "video", "other", "video"]), "t")
            .unwrap();
        let outline = sequence(&course(), &raw);
        let seqs: Vec<u32> = outline.units.iter().map(|u| u.sequence).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn non_video_units_consume_sequence_numbers() {
        let raw = parse_outline(&outline_json(&["other", "video", "video", "other", "video"]), "t")
            .unwrap();
        let outline = sequence(&course(), &raw);
        let video_seqs: Vec<u32> = outline.videos().map(|u| u.sequence).collect();
        assert_eq!(video_seqs, vec![2, 3, 5]);
    }

    #[test]
    fn classification_is_case_insensitive_exact_match() {
        let raw = parse_outline(&outline_json(&["Video", "reading", "quiz"]), "t").unwrap();
        let outline = sequence(&course(), &raw);
        assert_eq!(outline.units[0].kind, UnitKind::Video);
        assert_eq!(outline.units[1].kind, UnitKind::Other);
        assert_eq!(outline.units[2].kind, UnitKind::Other);
    }

    #[test]
    fn builds_view_urls() {
        let raw = parse_outline(&outline_json(&["video"]), "t").unwrap();
        let outline = sequence(&course(), &raw);
        assert_eq!(
            outline.units[0].view_url,
            "https://learn.deeplearning.ai/courses/test-course/lesson/u0/unit-1"
        );
    }

    #[test]
    fn falls_back_to_native_index_without_listing() {
        let body = r#"{"result": {"data": {"json": {
            "name": "C",
            "lessons": {
                "b": {"type": "video", "index": 2, "name": "Second", "slug": "s2"},
                "a": {"type": "video", "index": 1, "name": "First", "slug": "s1"}
            },
            "listing": []
        }}}}"#;
        let raw = parse_outline(body, "c").unwrap();
        let outline = sequence(&course(), &raw);
        let titles: Vec<&str> = outline.units.iter().map(|u| u.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second"]);
        assert_eq!(outline.units[0].sequence, 1);
    }

    #[test]
    fn dangling_listing_keys_are_dropped() {
        let body = r#"{"result": {"data": {"json": {
            "name": "C",
            "lessons": {
                "a": {"type": "video", "index": 1, "name": "Only", "slug": "s"}
            },
            "listing": [{"content": [
                {"type": "lesson", "key": "missing"},
                {"type": "lesson", "key": "a"}
            ]}]
        }}}}"#;
        let raw = parse_outline(body, "c").unwrap();
        let outline = sequence(&course(), &raw);
        assert_eq!(outline.units.len(), 1);
        assert_eq!(outline.units[0].sequence, 1);
    }

    #[test]
    fn course_title_falls_back_to_slug() {
        let body = r#"{"result": {"data": {"json": {"lessons": {}, "listing": []}}}}"#;
        let raw = parse_outline(body, "c").unwrap();
        let outline = sequence(&course(), &raw);
        assert_eq!(outline.title, "test-course");
        assert!(outline.units.is_empty());
    }
}
