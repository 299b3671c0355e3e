use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::tree::{Document, Line, LineGroup, LineStyle, Section};
use crate::models::{Attachment, MapEntity, Schedule, Tour, Traffic};

/// Builds the printable document for `tour` from `schedules`.
///
/// Entries are grouped by date with dates ascending, and ordered by start
/// time within a day. Entries sharing a start time keep their input order.
/// An empty list yields a document holding only the summary.
pub fn build_document(tour: &Tour, schedules: &[Schedule]) -> Document {
    let mut by_date: BTreeMap<NaiveDate, Vec<&Schedule>> = BTreeMap::new();
    for schedule in schedules {
        by_date.entry(schedule.date).or_default().push(schedule);
    }

    let days = by_date
        .into_iter()
        .map(|(date, mut entries)| {
            entries.sort_by_key(|s| s.start_time);
            day_section(date, &entries)
        })
        .collect();

    Document {
        summary: summary_section(tour),
        days,
    }
}

fn summary_section(tour: &Tour) -> Section {
    let mut group = LineGroup::default();

    let mut range = format!("Dates: {} ~ {}", tour.start_date, tour.end_date);
    if let Some(travelers) = tour.travelers {
        range.push_str(&format!(" ({} traveler{})", travelers, plural(travelers)));
    }
    group.push(LineStyle::Subtitle, range);

    if let Some(budget) = tour.budget {
        group.push(LineStyle::Activity, format!("Budget: {}", budget));
    }
    if let Some(meta) = &tour.metadata {
        if meta.total_days > 0 {
            group.push(
                LineStyle::Activity,
                format!("Total days: {}", meta.total_days),
            );
        }
        if meta.estimated_budget > 0 {
            group.push(
                LineStyle::Activity,
                format!(
                    "Estimated total cost: {} KRW",
                    format_thousands(meta.estimated_budget)
                ),
            );
        }
    }

    Section {
        date: None,
        heading: Line::new(LineStyle::Title, format!("{} Travel Plan", tour.title)),
        groups: vec![group],
    }
}

fn day_section(date: NaiveDate, entries: &[&Schedule]) -> Section {
    Section {
        date: Some(date),
        heading: Line::new(LineStyle::DateHeader, format!("Date: {}", date)),
        groups: entries.iter().map(|s| schedule_group(s)).collect(),
    }
}

fn schedule_group(schedule: &Schedule) -> LineGroup {
    let mut group = LineGroup::default();
    group.push(
        LineStyle::Activity,
        format!(
            "{}–{}: {}",
            schedule.start_time, schedule.end_time, schedule.title
        ),
    );
    group.push(LineStyle::Activity, format!("Notes: {}", schedule.content));

    match &schedule.attachment {
        Some(Attachment::Location(entity)) => push_location(&mut group, entity),
        Some(Attachment::Route(traffic)) => push_traffic(&mut group, traffic),
        None => {}
    }
    group
}

fn push_location(group: &mut LineGroup, entity: &MapEntity) {
    let place = &entity.location;
    group.push(LineStyle::LocationDetail, format!("Place: {}", place.name));
    group.push(
        LineStyle::LocationDetail,
        format!("Address: {}", place.address),
    );
    if let Some(rating) = place.rating.filter(|r| *r > 0.0) {
        group.push(LineStyle::LocationDetail, format!("Rating: {} / 5", rating));
    }
    if !place.link.is_empty() {
        group.push(LineStyle::LocationDetail, format!("Map: {}", place.link));
    }
}

fn push_traffic(group: &mut LineGroup, traffic: &Traffic) {
    let vehicle = &traffic.vehicle;
    group.push(
        LineStyle::TrafficDetail,
        format!("Transport: {}", vehicle.mode),
    );
    group.push(
        LineStyle::TrafficDetail,
        format!("From: {}", vehicle.departure),
    );
    group.push(
        LineStyle::TrafficDetail,
        format!("To: {}", vehicle.destination),
    );
    group.push(
        LineStyle::TrafficDetail,
        format!("Duration: {}", vehicle.total_duration),
    );
    group.push(
        LineStyle::TrafficDetail,
        format!("Transfers: {}", vehicle.transfers),
    );
    group.push(
        LineStyle::TrafficDetail,
        format!("Fare: {} KRW", format_thousands(traffic.price)),
    );
}

fn plural(n: u32) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// `1234567` -> `"1,234,567"`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        BudgetTier, LocationData, NewSchedule, PlanMetadata, RouteResult, RouteStep, TimeOfDay,
        TourId, TransitMode, VehicleData,
    };
    use chrono::Utc;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 7, d).unwrap()
    }

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    fn tour() -> Tour {
        Tour::new(TourId::Persisted(1), "Seoul 3-Day", date(15), date(17))
    }

    fn entry(id: i64, day: u32, start: &str, end: &str, title: &str) -> Schedule {
        NewSchedule::new(TourId::Persisted(1), title, date(day), t(start), t(end))
            .with_content("notes")
            .into_schedule(id)
    }

    fn texts(group: &LineGroup) -> Vec<&str> {
        group.lines.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_groups_by_date_in_time_order() {
        let schedules = vec![
            entry(3, 16, "10:00", "12:00", "Market"),
            entry(2, 15, "14:00", "15:30", "Museum"),
            entry(1, 15, "09:00", "11:00", "Palace"),
        ];
        let doc = build_document(&tour(), &schedules);

        assert_eq!(doc.days.len(), 2);
        assert_eq!(doc.days[0].date, Some(date(15)));
        assert_eq!(doc.days[0].heading.text, "Date: 2025-07-15");
        let first: Vec<&str> = doc.days[0]
            .groups
            .iter()
            .map(|g| g.lines[0].text.as_str())
            .collect();
        assert_eq!(first, vec!["09:00–11:00: Palace", "14:00–15:30: Museum"]);
        assert_eq!(doc.days[1].date, Some(date(16)));
        assert_eq!(doc.days[1].groups.len(), 1);
        assert_eq!(doc.days[1].groups[0].lines[0].text, "10:00–12:00: Market");
    }

    #[test]
    fn test_equal_start_times_keep_input_order() {
        let schedules = vec![
            entry(1, 15, "09:00", "10:00", "First"),
            entry(2, 15, "09:00", "09:30", "Second"),
        ];
        let doc = build_document(&tour(), &schedules);
        let titles: Vec<&str> = doc.days[0]
            .groups
            .iter()
            .map(|g| g.lines[0].text.as_str())
            .collect();
        assert_eq!(titles, vec!["09:00–10:00: First", "09:00–09:30: Second"]);
    }

    #[test]
    fn test_plain_entry_has_header_and_content_only() {
        let doc = build_document(&tour(), &[entry(1, 15, "09:00", "10:00", "Walk")]);
        assert_eq!(
            texts(&doc.days[0].groups[0]),
            vec!["09:00–10:00: Walk", "Notes: notes"]
        );
    }

    #[test]
    fn test_empty_schedules_yield_summary_only() {
        let doc = build_document(&tour(), &[]);
        assert!(doc.days.is_empty());
        assert_eq!(doc.summary.heading.text, "Seoul 3-Day Travel Plan");
        assert_eq!(doc.summary.heading.style, LineStyle::Title);
        assert_eq!(texts(&doc.summary.groups[0]), vec!["Dates: 2025-07-15 ~ 2025-07-17"]);
    }

    #[test]
    fn test_summary_lines() {
        let mut tour = tour().with_travelers(2).with_budget(BudgetTier::Medium);
        tour.metadata = Some(PlanMetadata {
            version: "1.0".to_string(),
            last_updated: Utc::now(),
            total_days: 3,
            estimated_budget: 125_000,
        });
        let doc = build_document(&tour, &[]);
        assert_eq!(
            texts(&doc.summary.groups[0]),
            vec![
                "Dates: 2025-07-15 ~ 2025-07-17 (2 travelers)",
                "Budget: medium",
                "Total days: 3",
                "Estimated total cost: 125,000 KRW",
            ]
        );
    }

    #[test]
    fn test_location_details() {
        let mut schedule = entry(1, 15, "09:00", "11:00", "Palace");
        schedule.attachment = Some(Attachment::Location(MapEntity {
            id: 2,
            schedule_id: 1,
            tour_id: TourId::Persisted(1),
            location: LocationData::new("Gyeongbokgung", "161 Sajik-ro")
                .with_rating(4.6)
                .with_link("https://maps.example/g"),
        }));
        let doc = build_document(&tour(), &[schedule]);
        let group = &doc.days[0].groups[0];
        assert_eq!(
            texts(group)[2..],
            [
                "Place: Gyeongbokgung",
                "Address: 161 Sajik-ro",
                "Rating: 4.6 / 5",
                "Map: https://maps.example/g",
            ]
        );
        assert!(group.lines[2..]
            .iter()
            .all(|l| l.style == LineStyle::LocationDetail));
    }

    #[test]
    fn test_zero_rating_and_empty_link_omitted() {
        let mut schedule = entry(1, 15, "09:00", "11:00", "Palace");
        schedule.attachment = Some(Attachment::Location(MapEntity {
            id: 2,
            schedule_id: 1,
            tour_id: TourId::Persisted(1),
            location: LocationData::new("Gyeongbokgung", "161 Sajik-ro").with_rating(0.0),
        }));
        let doc = build_document(&tour(), &[schedule]);
        assert_eq!(doc.days[0].groups[0].lines.len(), 4);
    }

    #[test]
    fn test_traffic_details() {
        let route = RouteResult {
            departure: "A".to_string(),
            destination: "B".to_string(),
            departure_time: t("11:15"),
            arrival_time: t("11:20"),
            duration: 5,
            transfers: 0,
            price: 1500,
            route: vec![RouteStep {
                mode: TransitMode::Subway,
                line: "Line 3".to_string(),
                departure: "A".to_string(),
                arrival: "B".to_string(),
                departure_time: t("11:15"),
                arrival_time: t("11:20"),
            }],
        };
        let mut schedule = entry(1, 15, "11:15", "11:20", "A → B");
        schedule.attachment = Some(Attachment::Route(Traffic {
            id: 2,
            tour_id: TourId::Persisted(1),
            vehicle: VehicleData::from_route(&route),
            spend_time: Utc::now(),
            price: 1500,
            departure_time: t("11:15"),
            arrival_time: t("11:20"),
            route: route.summary(),
        }));
        let doc = build_document(&tour(), &[schedule]);
        assert_eq!(
            texts(&doc.days[0].groups[0])[2..],
            [
                "Transport: TRANSIT",
                "From: A",
                "To: B",
                "Duration: 5 min",
                "Transfers: 0",
                "Fare: 1,500 KRW",
            ]
        );
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_lines_in_print_order() {
        let doc = build_document(&tour(), &[entry(1, 15, "09:00", "10:00", "Walk")]);
        let all: Vec<&str> = doc.lines().map(|l| l.text.as_str()).collect();
        assert_eq!(all[0], "Seoul 3-Day Travel Plan");
        assert_eq!(all[2], "Date: 2025-07-15");
        assert_eq!(all.len(), 5);
    }
}
