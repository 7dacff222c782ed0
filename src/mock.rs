//! Demo schedule generator.
//!
//! Produces a plausible portfolio for demos and offline development:
//! numbered properties, a fixed crew of three cleaners, back-to-back-ish
//! stays at every property and the turnovers between them.
//!
//! Output depends only on the configuration and the RNG, so a seeded RNG
//! gives a reproducible snapshot.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use rand::prelude::IndexedRandom;
use rand::Rng;
use tracing::debug;

use crate::models::{
    Cleaner, CleanerStatus, CleaningStatus, Property, Reservation, Snapshot,
};
use crate::turnover::TurnoverDeriver;

/// Property colour palette, cycled by property number.
pub const PROPERTY_COLORS: [&str; 8] = [
    "#60a5fa", "#f59e0b", "#34d399", "#f472b6", "#22d3ee", "#a78bfa", "#f87171", "#4ade80",
];

/// Guest surnames.
pub const GUEST_NAMES: [&str; 25] = [
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris",
];

const CHECK_IN_HOUR: i64 = 16;
const CHECK_OUT_HOUR: i64 = 10;

/// Generator settings.
#[derive(Debug, Clone)]
pub struct MockDataGenerator {
    /// Number of properties (default 50).
    pub property_count: usize,
    /// Stays generated per property (default 2).
    pub reservations_per_property: usize,
    /// Day the first stays start from.
    pub base_date: NaiveDate,
}

impl MockDataGenerator {
    /// Creates a generator with default counts, starting at `base_date`.
    pub fn new(base_date: NaiveDate) -> Self {
        Self {
            property_count: 50,
            reservations_per_property: 2,
            base_date,
        }
    }

    /// Sets the number of properties.
    pub fn with_property_count(mut self, count: usize) -> Self {
        self.property_count = count;
        self
    }

    /// Sets the stays per property.
    pub fn with_reservations_per_property(mut self, count: usize) -> Self {
        self.reservations_per_property = count;
        self
    }

    /// Generates a snapshot.
    ///
    /// Stays last 2 to 5 nights, check in at 16:00 and check out at 10:00
    /// UTC. The first stay starts 0 to 3 days after the base date; later
    /// stays follow after a gap of one or two nights, alternating. Every
    /// turnover is assigned to a random cleaner without overlap checks.
    ///
    /// # Example
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use rand::SeedableRng;
    /// use rand::rngs::SmallRng;
    /// use turnover_schedule::mock::MockDataGenerator;
    ///
    /// let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    /// let generator = MockDataGenerator::new(base).with_property_count(3);
    /// let snapshot = generator.generate(&mut SmallRng::seed_from_u64(7));
    ///
    /// assert_eq!(snapshot.properties.len(), 3);
    /// assert_eq!(snapshot.reservations.len(), 6);
    /// assert_eq!(snapshot.cleanings.len(), 3);
    /// ```
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Snapshot {
        let properties: Vec<Property> = (1..=self.property_count).map(mock_property).collect();
        let cleaners = mock_cleaners();
        let midnight = Utc.from_utc_datetime(&self.base_date.and_time(NaiveTime::MIN));

        let mut reservations = Vec::with_capacity(properties.len() * self.reservations_per_property);
        for property in &properties {
            let mut day_cursor: i64 = rng.random_range(0..4);
            for j in 0..self.reservations_per_property {
                let nights: i64 = rng.random_range(2..=5);
                let check_in = at_hour(midnight, day_cursor, CHECK_IN_HOUR);
                let check_out = at_hour(midnight, day_cursor + nights, CHECK_OUT_HOUR);

                reservations.push(
                    Reservation::new(
                        format!("r_{}_{}", property.id, j + 1),
                        property.id.clone(),
                        check_in,
                        check_out,
                    )
                    .with_guest(guest_name(&property.id, j)),
                );

                day_cursor += nights + if j % 2 == 0 { 1 } else { 2 };
            }
        }

        let plan = TurnoverDeriver::new().derive_all(&reservations);
        let cleanings = plan
            .cleanings
            .into_iter()
            .map(|cleaning| match cleaners.choose(rng) {
                Some(cleaner) => cleaning
                    .with_cleaner(cleaner.id.clone())
                    .with_status(CleaningStatus::Assigned),
                None => cleaning,
            })
            .collect::<Vec<_>>();

        debug!(
            properties = properties.len(),
            reservations = reservations.len(),
            cleanings = cleanings.len(),
            "generated mock schedule"
        );

        Snapshot {
            properties,
            reservations,
            cleanings,
            cleaners,
            range: None,
        }
    }
}

impl Default for MockDataGenerator {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

fn at_hour(midnight: DateTime<Utc>, days: i64, hour: i64) -> DateTime<Utc> {
    midnight + Duration::days(days) + Duration::hours(hour)
}

fn mock_property(i: usize) -> Property {
    Property::new(format!("p{i}"), format!("Property {i}"))
        .with_code(format!("P-{i:03}"))
        .with_color(PROPERTY_COLORS[(i - 1) % PROPERTY_COLORS.len()])
}

/// The demo crew.
pub fn mock_cleaners() -> Vec<Cleaner> {
    vec![
        Cleaner::new("c1", "Alex").with_color("#4f46e5").with_capacity(3),
        Cleaner::new("c2", "Bailey")
            .with_color("#16a34a")
            .with_capacity(2)
            .with_status(CleanerStatus::Holiday),
        Cleaner::new("c3", "Casey").with_color("#dc2626").with_capacity(4),
    ]
}

/// 31-multiplier string hash over UTF-16 units, wrapped to 32 bits.
fn string_hash(s: &str) -> u32 {
    s.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(i32::from(unit)))
        .unsigned_abs()
}

fn guest_name(property_id: &str, index: usize) -> &'static str {
    GUEST_NAMES[(string_hash(property_id) as usize + index) % GUEST_NAMES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::validate_no_overlap;
    use crate::models::{CleaningKind, ScheduleEvent};
    use crate::validation::validate_snapshot;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn base() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_defaults() {
        let g = MockDataGenerator::new(base());
        assert_eq!(g.property_count, 50);
        assert_eq!(g.reservations_per_property, 2);

        let snap = g.generate(&mut SmallRng::seed_from_u64(42));
        assert_eq!(snap.properties.len(), 50);
        assert_eq!(snap.reservations.len(), 100);
        assert_eq!(snap.cleanings.len(), 50);
        assert_eq!(snap.cleaners.len(), 3);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let g = MockDataGenerator::new(base()).with_property_count(10);
        let a = g.generate(&mut SmallRng::seed_from_u64(42));
        let b = g.generate(&mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_property_naming() {
        let snap = MockDataGenerator::new(base())
            .with_property_count(9)
            .generate(&mut SmallRng::seed_from_u64(1));
        let p1 = &snap.properties[0];
        assert_eq!(p1.id, "p1");
        assert_eq!(p1.name, "Property 1");
        assert_eq!(p1.code.as_deref(), Some("P-001"));
        assert_eq!(p1.color.as_deref(), Some("#60a5fa"));
        // Palette wraps after eight
        assert_eq!(snap.properties[8].color.as_deref(), Some("#60a5fa"));
    }

    #[test]
    fn test_crew() {
        let crew = mock_cleaners();
        assert_eq!(crew[0].capacity, Some(3));
        assert_eq!(crew[1].status, CleanerStatus::Holiday);
        assert_eq!(crew[2].name, "Casey");
    }

    #[test]
    fn test_stays_shape() {
        let snap = MockDataGenerator::new(base())
            .with_property_count(20)
            .with_reservations_per_property(4)
            .generate(&mut SmallRng::seed_from_u64(9));
        let start_floor = at_hour(Utc.from_utc_datetime(&base().and_time(NaiveTime::MIN)), 0, 16);

        for r in &snap.reservations {
            let nights = (r.check_out() - r.check_in() + Duration::hours(6)).num_days();
            assert!((2..=5).contains(&nights), "{} lasts {nights} nights", r.id);
            assert_eq!(r.check_in().time(), NaiveTime::from_hms_opt(16, 0, 0).unwrap());
            assert_eq!(r.check_out().time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
            assert!(r.check_in() >= start_floor);
            assert!(GUEST_NAMES.contains(&r.guest_name.as_str()));
        }
        assert!(validate_snapshot(&snap).is_ok());
    }

    #[test]
    fn test_turnovers_fill_gaps() {
        let snap = MockDataGenerator::new(base())
            .with_property_count(5)
            .with_reservations_per_property(3)
            .generate(&mut SmallRng::seed_from_u64(3));
        assert_eq!(snap.cleanings.len(), 10);

        for c in &snap.cleanings {
            assert_eq!(c.kind, CleaningKind::Turnover);
            assert_eq!(c.status, CleaningStatus::Assigned);
            assert!(c.cleaner_id.is_some());
            assert!(!c.window.is_degenerate());

            let next = snap.reservation(c.reservation_id.as_deref().unwrap()).unwrap();
            assert_eq!(c.window.end, next.check_in());
        }

        // Turnovers at one property never overlap each other
        let events: Vec<ScheduleEvent> = snap
            .cleanings
            .iter()
            .map(|c| ScheduleEvent::from_cleaning(c, None).with_cleaner(""))
            .collect();
        for ev in &events {
            assert!(validate_no_overlap(ev, &events));
        }
    }

    #[test]
    fn test_guest_hash() {
        // "p1" = 112 * 31 + 49
        assert_eq!(string_hash("p1"), 3521);
        assert_eq!(string_hash(""), 0);
        assert_eq!(guest_name("p1", 0), GUEST_NAMES[3521 % 25]);
        assert_eq!(guest_name("p1", 1), GUEST_NAMES[3522 % 25]);
    }
}
