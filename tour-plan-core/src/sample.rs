//! A ready-made Seoul itinerary for trying things out.

use chrono::{NaiveDate, TimeZone, Utc};

use crate::models::{
    Attachment, BudgetTier, LocationData, MapEntity, NewSchedule, RouteResult, RouteStep,
    Schedule, TimeOfDay, Tour, TourId, Traffic, TransitMode, VehicleData, Weather,
};
use crate::store::PlanBundle;

const SAMPLE_TOUR_ID: TourId = TourId::Draft(1);

struct Stop {
    id: i64,
    title: &'static str,
    content: &'static str,
    start: (u32, u32),
    end: (u32, u32),
    place: Place,
}

struct Place {
    name: &'static str,
    address: &'static str,
    lat: f64,
    lng: f64,
    place_id: &'static str,
    rating: f64,
}

const STOPS: &[Stop] = &[
    Stop {
        id: 1,
        title: "Gyeongbokgung Palace",
        content: "Main royal palace of the Joseon dynasty, Geunjeongjeon and Gyeonghoeru",
        start: (9, 0),
        end: (11, 0),
        place: Place {
            name: "Gyeongbokgung",
            address: "161 Sajik-ro, Jongno-gu, Seoul",
            lat: 37.5796,
            lng: 126.9770,
            place_id: "ChIJzRz3K2WIFTER4Dl0Zw8Uy6E",
            rating: 4.3,
        },
    },
    Stop {
        id: 3,
        title: "Bukchon Hanok Village walk",
        content: "Traditional hanok houses and views over the city",
        start: (11, 30),
        end: (13, 0),
        place: Place {
            name: "Bukchon Hanok Village",
            address: "37 Gyedong-gil, Jongno-gu, Seoul",
            lat: 37.5816,
            lng: 126.9839,
            place_id: "ChIJ12345example",
            rating: 4.1,
        },
    },
    Stop {
        id: 4,
        title: "Lunch in Myeongdong",
        content: "Dumplings at Myeongdong Kyoja main branch",
        start: (14, 0),
        end: (15, 30),
        place: Place {
            name: "Myeongdong Kyoja",
            address: "29 Myeongdong 10-gil, Jung-gu, Seoul",
            lat: 37.5618,
            lng: 126.9852,
            place_id: "ChIJ67890example",
            rating: 4.0,
        },
    },
    Stop {
        id: 5,
        title: "N Seoul Tower",
        content: "Night view over Seoul",
        start: (18, 0),
        end: (20, 0),
        place: Place {
            name: "N Seoul Tower",
            address: "105 Namsangongwon-gil, Yongsan-gu, Seoul",
            lat: 37.5512,
            lng: 126.9882,
            place_id: "ChIJabcdefexample",
            rating: 4.2,
        },
    },
];

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, d).unwrap_or_default()
}

fn hm((h, m): (u32, u32)) -> TimeOfDay {
    TimeOfDay::from_hm(h, m).unwrap_or_default()
}

fn stop_schedule(stop: &Stop) -> Schedule {
    let mut schedule = NewSchedule::new(
        SAMPLE_TOUR_ID,
        stop.title,
        day(15),
        hm(stop.start),
        hm(stop.end),
    )
    .with_content(stop.content)
    .into_schedule(stop.id);
    let place = &stop.place;
    schedule.attachment = Some(Attachment::Location(MapEntity {
        id: stop.id + 100,
        schedule_id: stop.id,
        tour_id: SAMPLE_TOUR_ID,
        location: LocationData::new(place.name, place.address)
            .with_coordinates(place.lat, place.lng)
            .with_place_id(place.place_id)
            .with_rating(place.rating),
    }));
    schedule
}

fn subway_schedule() -> Schedule {
    let route = RouteResult {
        departure: "Gyeongbokgung Station".to_string(),
        destination: "Anguk Station".to_string(),
        departure_time: hm((11, 15)),
        arrival_time: hm((11, 20)),
        duration: 5,
        transfers: 0,
        price: 1500,
        route: vec![RouteStep {
            mode: TransitMode::Subway,
            line: "Line 3".to_string(),
            departure: "Gyeongbokgung Station".to_string(),
            arrival: "Anguk Station".to_string(),
            departure_time: hm((11, 15)),
            arrival_time: hm((11, 20)),
        }],
    };
    let mut schedule = NewSchedule::new(
        SAMPLE_TOUR_ID,
        "Subway Line 3",
        day(15),
        route.departure_time,
        route.arrival_time,
    )
    .with_content("Gyeongbokgung → Anguk, 5 min")
    .into_schedule(2);
    schedule.attachment = Some(Attachment::Route(Traffic {
        id: 102,
        tour_id: SAMPLE_TOUR_ID,
        vehicle: VehicleData::from_route(&route),
        spend_time: Utc
            .with_ymd_and_hms(2025, 7, 15, 11, 15, 0)
            .single()
            .unwrap_or_default(),
        price: route.price,
        departure_time: route.departure_time,
        arrival_time: route.arrival_time,
        route: route.summary(),
    }));
    schedule
}

/// A three day Seoul plan with places, one subway ride and a forecast.
pub fn seoul_sample() -> PlanBundle {
    let tour = Tour::new(SAMPLE_TOUR_ID, "Seoul 3-Day Trip", day(15), day(17))
        .with_travelers(2)
        .with_budget(BudgetTier::Medium);

    let mut schedules: Vec<Schedule> = STOPS.iter().map(stop_schedule).collect();
    schedules.insert(1, subway_schedule());

    let weather = vec![
        Weather::new(day(15), 29.0, "Sunny").with_icon("01d"),
        Weather::new(day(16), 27.5, "Partly cloudy").with_icon("02d"),
        Weather::new(day(17), 25.0, "Showers").with_icon("09d"),
    ];

    PlanBundle {
        tour: Some(tour),
        schedules,
        weather,
    }
}
