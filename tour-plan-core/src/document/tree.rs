use chrono::NaiveDate;

/// Visual role of a line. The exporter maps each style to a font size,
/// colour and indent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineStyle {
    Title,
    Subtitle,
    DateHeader,
    Activity,
    LocationDetail,
    TrafficDetail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    pub style: LineStyle,
}

impl Line {
    pub fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }
}

/// Lines kept together, e.g. everything printed for one schedule entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineGroup {
    pub lines: Vec<Line>,
}

impl LineGroup {
    pub fn push(&mut self, style: LineStyle, text: impl Into<String>) {
        self.lines.push(Line::new(style, text));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Set for day sections, `None` for the summary.
    pub date: Option<NaiveDate>,
    pub heading: Line,
    pub groups: Vec<LineGroup>,
}

/// A printable itinerary: the summary followed by one section per day in
/// ascending date order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub summary: Section,
    pub days: Vec<Section>,
}

impl Document {
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        std::iter::once(&self.summary).chain(self.days.iter())
    }

    /// Every line in print order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.sections().flat_map(|section| {
            std::iter::once(&section.heading)
                .chain(section.groups.iter().flat_map(|group| group.lines.iter()))
        })
    }
}
