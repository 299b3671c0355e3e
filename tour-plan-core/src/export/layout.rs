//! Page geometry for the itinerary document.
//!
//! Coordinates are PDF points with the origin at the bottom-left corner.

use crate::document::{Document, Line, LineGroup, LineStyle, Section};

/// A4 portrait.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const PAGE_MARGIN: f32 = 30.0;

/// Gap above a section plus its inner padding.
const SECTION_INSET: f32 = 25.0;
const SECTION_GAP_AFTER: f32 = 10.0;
const GROUP_GAP_AFTER: f32 = 8.0;
const LINE_HEIGHT: f32 = 1.25;
const RULE_COLOR: u32 = 0xE0E0E0;
const RULE_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub fn hex(value: u32) -> Self {
        Rgb(
            ((value >> 16) & 0xFF) as f32 / 255.0,
            ((value >> 8) & 0xFF) as f32 / 255.0,
            (value & 0xFF) as f32 / 255.0,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: Rgb,
    pub indent: f32,
    pub space_after: f32,
    pub centered: bool,
}

pub fn style_for(style: LineStyle) -> TextStyle {
    let (size, color, indent, space_after, centered) = match style {
        LineStyle::Title => (28.0, 0x3F51B5, 0.0, 25.0, true),
        LineStyle::Subtitle => (20.0, 0x424242, 0.0, 12.0, false),
        LineStyle::DateHeader => (18.0, 0x616161, 0.0, 10.0, false),
        LineStyle::Activity => (13.0, 0x212121, 12.0, 6.0, false),
        LineStyle::LocationDetail | LineStyle::TrafficDetail => {
            (11.0, 0x757575, 20.0, 3.0, false)
        }
    };
    TextStyle {
        size,
        color: Rgb::hex(color),
        indent,
        space_after,
        centered,
    }
}

/// Width of rendered text.
pub trait Measure {
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// A run of text with its baseline origin.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub color: Rgb,
    pub text: String,
}

/// A horizontal rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
    pub width: f32,
    pub color: Rgb,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub texts: Vec<PlacedText>,
    pub rules: Vec<PlacedRule>,
}

/// Flows `document` onto pages.
///
/// Each line is word-wrapped to the content width. A line group that does
/// not fit on the rest of a page moves to the next page whole, unless it is
/// taller than a full page, in which case it is split between lines.
pub fn layout(document: &Document, measure: &impl Measure) -> Vec<PageLayout> {
    let mut flow = Flow::new(measure);
    for section in document.sections() {
        flow.section(section);
    }
    flow.finish()
}

struct Flow<'m, M> {
    measure: &'m M,
    pages: Vec<PageLayout>,
    current: PageLayout,
    y: f32,
}

/// A wrapped line ready to place.
struct Rows {
    style: TextStyle,
    rows: Vec<String>,
}

impl Rows {
    fn height(&self) -> f32 {
        self.rows.len() as f32 * self.style.size * LINE_HEIGHT + self.style.space_after
    }
}

impl<'m, M: Measure> Flow<'m, M> {
    fn new(measure: &'m M) -> Self {
        Self {
            measure,
            pages: Vec::new(),
            current: PageLayout::default(),
            y: PAGE_HEIGHT - PAGE_MARGIN,
        }
    }

    fn content_left() -> f32 {
        PAGE_MARGIN + SECTION_INSET
    }

    fn content_width() -> f32 {
        PAGE_WIDTH - 2.0 * Self::content_left()
    }

    fn bottom() -> f32 {
        PAGE_MARGIN
    }

    fn full_page_height() -> f32 {
        PAGE_HEIGHT - 2.0 * PAGE_MARGIN
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.current);
        self.pages.push(page);
        self.y = PAGE_HEIGHT - PAGE_MARGIN;
    }

    fn remaining(&self) -> f32 {
        self.y - Self::bottom()
    }

    fn section(&mut self, section: &Section) {
        if self.remaining() < SECTION_INSET {
            self.new_page();
        }
        self.y -= SECTION_INSET;

        let heading = self.wrap(&section.heading);
        let first_group = section.groups.first().map(|g| self.wrap_group(g));
        let lead = heading.height() + first_group.as_deref().map_or(0.0, group_height);
        if lead > self.remaining() && lead <= Self::full_page_height() {
            self.new_page();
        }
        self.place(heading);

        let mut groups = section.groups.iter();
        if let Some(first) = first_group {
            groups.next();
            self.place_group(first);
        }
        for group in groups {
            let rows = self.wrap_group(group);
            self.place_group(rows);
        }

        self.y -= SECTION_INSET - SECTION_GAP_AFTER;
        let y = self.y.max(Self::bottom());
        self.current.rules.push(PlacedRule {
            x1: PAGE_MARGIN + SECTION_GAP_AFTER,
            x2: PAGE_WIDTH - PAGE_MARGIN - SECTION_GAP_AFTER,
            y,
            width: RULE_WIDTH,
            color: Rgb::hex(RULE_COLOR),
        });
        self.y -= SECTION_GAP_AFTER;
    }

    fn wrap_group(&self, group: &LineGroup) -> Vec<Rows> {
        group.lines.iter().map(|line| self.wrap(line)).collect()
    }

    fn place_group(&mut self, lines: Vec<Rows>) {
        let height = group_height(&lines);
        if height > self.remaining() && height <= Self::full_page_height() {
            self.new_page();
        }
        for rows in lines {
            self.place(rows);
        }
        self.y -= GROUP_GAP_AFTER;
    }

    fn place(&mut self, rows: Rows) {
        let style = rows.style;
        let row_height = style.size * LINE_HEIGHT;
        for text in rows.rows {
            if row_height > self.remaining() {
                self.new_page();
            }
            let x = if style.centered {
                let width = self.measure.text_width(&text, style.size);
                Self::content_left() + ((Self::content_width() - width) / 2.0).max(0.0)
            } else {
                Self::content_left() + style.indent
            };
            self.current.texts.push(PlacedText {
                x,
                y: self.y - style.size,
                size: style.size,
                color: style.color,
                text,
            });
            self.y -= row_height;
        }
        self.y -= style.space_after;
    }

    fn wrap(&self, line: &Line) -> Rows {
        let style = style_for(line.style);
        let width = Self::content_width() - style.indent;
        Rows {
            style,
            rows: wrap_text(&line.text, width, style.size, self.measure),
        }
    }

    fn finish(mut self) -> Vec<PageLayout> {
        if !self.current.texts.is_empty() || !self.current.rules.is_empty() || self.pages.is_empty()
        {
            self.new_page();
        }
        self.pages
    }
}

fn group_height(lines: &[Rows]) -> f32 {
    lines.iter().map(Rows::height).sum::<f32>() + GROUP_GAP_AFTER
}

/// Greedy word wrap. Words wider than `width` are broken between
/// characters. Always yields at least one row.
pub fn wrap_text(text: &str, width: f32, size: f32, measure: &impl Measure) -> Vec<String> {
    let mut rows = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };
        if measure.text_width(&candidate, size) <= width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            rows.push(std::mem::take(&mut current));
        }
        if measure.text_width(word, size) <= width {
            current = word.to_string();
            continue;
        }
        for c in word.chars() {
            let mut next = current.clone();
            next.push(c);
            if !current.is_empty() && measure.text_width(&next, size) > width {
                rows.push(std::mem::take(&mut current));
                current.push(c);
            } else {
                current = next;
            }
        }
    }

    if !current.is_empty() || rows.is_empty() {
        rows.push(current);
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::build_document;
    use crate::models::{NewSchedule, Tour, TourId};
    use chrono::NaiveDate;

    /// Every character is half the font size wide.
    struct Fixed;

    impl Measure for Fixed {
        fn text_width(&self, text: &str, size: f32) -> f32 {
            text.chars().count() as f32 * size * 0.5
        }
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    #[test]
    fn test_wrap_text_breaks_on_words() {
        let rows = wrap_text("aa bb cc", 25.0, 10.0, &Fixed);
        assert_eq!(rows, vec!["aa bb", "cc"]);
    }

    #[test]
    fn test_wrap_text_breaks_long_word() {
        let rows = wrap_text("abcdefgh", 20.0, 10.0, &Fixed);
        assert_eq!(rows, vec!["abcd", "efgh"]);
    }

    #[test]
    fn test_wrap_text_empty_line() {
        assert_eq!(wrap_text("", 100.0, 10.0, &Fixed), vec![String::new()]);
    }

    #[test]
    fn test_style_table() {
        let title = style_for(LineStyle::Title);
        assert_eq!(title.size, 28.0);
        assert!(title.centered);
        assert_eq!(title.color, Rgb::hex(0x3F51B5));
        assert_eq!(style_for(LineStyle::TrafficDetail).size, 11.0);
        assert_eq!(style_for(LineStyle::Activity).indent, 12.0);
    }

    #[test]
    fn test_single_page_for_short_plan() {
        let tour = Tour::new(TourId::Persisted(1), "Seoul", date(15), date(16));
        let schedules = vec![NewSchedule::new(
            TourId::Persisted(1),
            "Palace",
            date(15),
            "09:00".parse().unwrap(),
            "11:00".parse().unwrap(),
        )
        .into_schedule(1)];
        let pages = layout(&build_document(&tour, &schedules), &Fixed);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].rules.len(), 2);
        assert_eq!(pages[0].texts[0].text, "Seoul Travel Plan");
        let ys: Vec<f32> = pages[0].texts.iter().map(|t| t.y).collect();
        assert!(ys.windows(2).all(|w| w[0] > w[1]));
        assert!(pages[0]
            .texts
            .iter()
            .all(|t| t.y >= PAGE_MARGIN && t.x >= PAGE_MARGIN));
    }

    #[test]
    fn test_long_plan_spans_pages() {
        let tour = Tour::new(TourId::Persisted(1), "Seoul", date(1), date(30));
        let schedules: Vec<_> = (0..60)
            .map(|i| {
                NewSchedule::new(
                    TourId::Persisted(1),
                    format!("Stop {}", i),
                    date(1 + (i % 28) as u32),
                    "09:00".parse().unwrap(),
                    "10:00".parse().unwrap(),
                )
                .with_content("walk around")
                .into_schedule(i)
            })
            .collect();
        let pages = layout(&build_document(&tour, &schedules), &Fixed);
        assert!(pages.len() > 1);
        let total: usize = pages.iter().map(|p| p.texts.len()).sum();
        assert_eq!(total, 1 + 1 + 28 + 60 * 2);
        for page in &pages {
            assert!(page.texts.iter().all(|t| t.y >= PAGE_MARGIN - 0.01));
        }
    }

    #[test]
    fn test_empty_document_has_one_page() {
        let tour = Tour::new(TourId::Draft(1), "Empty", date(1), date(1));
        let pages = layout(&build_document(&tour, &[]), &Fixed);
        assert_eq!(pages.len(), 1);
    }
}
