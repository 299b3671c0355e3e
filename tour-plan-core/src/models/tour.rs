use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Schema version written into freshly seeded plan metadata.
pub const PLAN_SCHEMA_VERSION: &str = "1.0";

/// Identity of a tour.
///
/// Tours start life as a `Draft` with a client-generated placeholder and
/// become `Persisted` once the remote service assigns an id. The server id
/// is authoritative: when a draft is saved, every reference to the draft id
/// is rewritten to the persisted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum TourId {
    Draft(i64),
    Persisted(i64),
}

impl TourId {
    /// Numeric value regardless of kind.
    pub fn value(&self) -> i64 {
        match self {
            TourId::Draft(id) | TourId::Persisted(id) => *id,
        }
    }

    /// Server-assigned id, `None` for drafts.
    pub fn persisted(&self) -> Option<i64> {
        match self {
            TourId::Persisted(id) => Some(*id),
            TourId::Draft(_) => None,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, TourId::Draft(_))
    }
}

impl fmt::Display for TourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for BudgetTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BudgetTier::Low => write!(f, "low"),
            BudgetTier::Medium => write!(f, "medium"),
            BudgetTier::High => write!(f, "high"),
        }
    }
}

impl FromStr for BudgetTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(BudgetTier::Low),
            "medium" => Ok(BudgetTier::Medium),
            "high" => Ok(BudgetTier::High),
            _ => Err(format!(
                "Invalid budget '{}'. Valid options: low, medium, high",
                s
            )),
        }
    }
}

/// Aggregate figures carried alongside a tour's plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanMetadata {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub total_days: u32,
    /// Estimated spend in won.
    pub estimated_budget: u64,
}

impl PlanMetadata {
    /// Metadata for a plan with nothing in it yet.
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            version: PLAN_SCHEMA_VERSION.to_string(),
            last_updated: now,
            total_days: 0,
            estimated_budget: 0,
        }
    }
}

/// The trip being planned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tour {
    pub id: TourId,
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Owning user, resolved from the session cache when absent.
    pub owner_id: Option<i64>,
    pub travelers: Option<u32>,
    pub budget: Option<BudgetTier>,
    pub metadata: Option<PlanMetadata>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tour {
    pub fn new(
        id: TourId,
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            start_date,
            end_date,
            owner_id: None,
            travelers: None,
            budget: None,
            metadata: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_owner(mut self, owner_id: i64) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    pub fn with_travelers(mut self, travelers: u32) -> Self {
        self.travelers = Some(travelers);
        self
    }

    pub fn with_budget(mut self, budget: BudgetTier) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Server-assigned id, if the tour has been saved.
    pub fn persisted_id(&self) -> Option<i64> {
        self.id.persisted()
    }

    /// Inclusive day count of the date range, zero if the range is inverted.
    pub fn total_days(&self) -> u32 {
        let days = (self.end_date - self.start_date).num_days() + 1;
        u32::try_from(days).unwrap_or(0)
    }
}

impl fmt::Display for Tour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.title.is_empty() {
            "(untitled)"
        } else {
            self.title.as_str()
        };
        writeln!(f, "{}", title)?;
        writeln!(f, "{}", "=".repeat(title.chars().count()))?;
        match self.id {
            TourId::Persisted(id) => writeln!(f, "ID: {}", id)?,
            TourId::Draft(id) => writeln!(f, "ID: {} (not saved)", id)?,
        }
        writeln!(f, "Dates: {} ~ {}", self.start_date, self.end_date)?;
        if let Some(travelers) = self.travelers {
            writeln!(f, "Travelers: {}", travelers)?;
        }
        if let Some(budget) = self.budget {
            writeln!(f, "Budget: {}", budget)?;
        }
        if let Some(owner) = self.owner_id {
            writeln!(f, "Owner: {}", owner)?;
        }
        Ok(())
    }
}

/// Partial update for a [`Tour`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TourPatch {
    pub title: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub owner_id: Option<i64>,
    pub travelers: Option<u32>,
    pub budget: Option<BudgetTier>,
}

impl TourPatch {
    pub fn is_empty(&self) -> bool {
        *self == TourPatch::default()
    }

    pub fn apply(&self, tour: &mut Tour) {
        if let Some(title) = &self.title {
            tour.title = title.clone();
        }
        if let Some(start) = self.start_date {
            tour.start_date = start;
        }
        if let Some(end) = self.end_date {
            tour.end_date = end;
        }
        if let Some(owner) = self.owner_id {
            tour.owner_id = Some(owner);
        }
        if let Some(travelers) = self.travelers {
            tour.travelers = Some(travelers);
        }
        if let Some(budget) = self.budget {
            tour.budget = Some(budget);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_tour_new() {
        let tour = Tour::new(
            TourId::Persisted(3),
            "Seoul 3-Day",
            date(2025, 7, 15),
            date(2025, 7, 17),
        );
        assert_eq!(tour.persisted_id(), Some(3));
        assert_eq!(tour.total_days(), 3);
        assert!(tour.owner_id.is_none());
    }

    #[test]
    fn test_draft_has_no_persisted_id() {
        let tour = Tour::new(TourId::Draft(99), "", date(2025, 1, 1), date(2025, 1, 1));
        assert_eq!(tour.persisted_id(), None);
        assert!(tour.id.is_draft());
        assert_eq!(tour.id.value(), 99);
    }

    #[test]
    fn test_total_days_inverted_range() {
        let tour = Tour::new(TourId::Draft(1), "", date(2025, 1, 5), date(2025, 1, 1));
        assert_eq!(tour.total_days(), 0);
    }

    #[test]
    fn test_patch_apply() {
        let mut tour = Tour::new(TourId::Draft(1), "Old", date(2025, 1, 1), date(2025, 1, 2));
        let patch = TourPatch {
            title: Some("New".to_string()),
            travelers: Some(4),
            ..Default::default()
        };
        patch.apply(&mut tour);
        assert_eq!(tour.title, "New");
        assert_eq!(tour.travelers, Some(4));
        assert_eq!(tour.start_date, date(2025, 1, 1));
        assert!(!patch.is_empty());
        assert!(TourPatch::default().is_empty());
    }

    #[test]
    fn test_budget_tier_from_str() {
        assert_eq!("MEDIUM".parse::<BudgetTier>().unwrap(), BudgetTier::Medium);
        assert!("lavish".parse::<BudgetTier>().is_err());
    }

    #[test]
    fn test_display_marks_drafts() {
        let tour = Tour::new(TourId::Draft(7), "Trip", date(2025, 1, 1), date(2025, 1, 2));
        let output = format!("{}", tour);
        assert!(output.contains("Trip"));
        assert!(output.contains("not saved"));
    }

    #[test]
    fn test_tour_json_roundtrip() {
        let tour = Tour::new(TourId::Persisted(5), "Busan", date(2025, 8, 1), date(2025, 8, 3))
            .with_owner(11)
            .with_budget(BudgetTier::High);
        let json = serde_json::to_string(&tour).unwrap();
        let parsed: Tour = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, tour);
    }
}
