use std::collections::HashMap;

use avn_protocol::messages::notice::ViolationNotice;
use avn_protocol::messages::payment::PaymentRecord;
use avn_protocol::messages::report::ViolationReport;
use avn_protocol::types::{AircraftClass, PaymentStatus};
use chrono::{Duration, NaiveDateTime};

/// Fine amounts per aircraft class plus the administrative surcharge.
#[derive(Debug, Clone)]
pub struct FineSchedule {
    pub commercial: f64,
    pub cargo: f64,
    pub surcharge: f64,
}

impl Default for FineSchedule {
    fn default() -> Self {
        FineSchedule {
            commercial: 500_000.0,
            cargo: 700_000.0,
            surcharge: 1.15,
        }
    }
}

impl FineSchedule {
    /// Commercial flights get the commercial rate; everything else,
    /// emergencies included, is billed at the cargo rate.
    pub fn base_fine(&self, class: AircraftClass) -> f64 {
        match class {
            AircraftClass::Commercial => self.commercial,
            AircraftClass::Cargo | AircraftClass::Emergency => self.cargo,
        }
    }
}

/// Issues violation notices and keeps the authoritative copy of each.
pub struct NoticeService {
    fines: FineSchedule,
    notices: HashMap<String, ViolationNotice>,
}

impl NoticeService {
    pub fn new(fines: FineSchedule) -> Self {
        NoticeService {
            fines,
            notices: HashMap::new(),
        }
    }

    /// Turns a raw violation report into a notice and the zero-amount
    /// payment registration that establishes the obligation.
    ///
    /// The notice ID combines the issuance instant with the flight number,
    /// so it is unique for the run. Payment falls due 72 hours after
    /// issuance.
    pub fn issue(
        &mut self,
        report: ViolationReport,
        now: NaiveDateTime,
    ) -> (ViolationNotice, PaymentRecord) {
        let id = format!(
            "AVN{}_{}",
            now.and_utc().timestamp_millis(),
            report.flight_number
        );

        let base_fine = self.fines.base_fine(report.aircraft_class);
        let total_amount = base_fine * self.fines.surcharge;

        let notice = ViolationNotice {
            id: id.clone(),
            flight_number: report.flight_number,
            airline: report.airline,
            aircraft_class: report.aircraft_class,
            recorded: report.recorded,
            limit: report.limit,
            issued_at: now,
            due_by: now + Duration::hours(72),
            base_fine,
            surcharge_rate: self.fines.surcharge,
            total_amount,
            status: PaymentStatus::Unpaid,
        };

        let registration = PaymentRecord {
            notice_id: id.clone(),
            aircraft_id: notice.aircraft_id(),
            aircraft_class: notice.aircraft_class,
            amount_due: total_amount,
            amount_paid: 0.0,
            successful: false,
            settled_at: None,
        };

        self.notices.insert(id, notice.clone());
        (notice, registration)
    }

    /// Marks a stored notice paid after a successful settlement outcome.
    /// Unknown IDs are ignored; a paid notice never goes back to unpaid.
    pub fn mark_paid(&mut self, notice_id: &str) -> bool {
        match self.notices.get_mut(notice_id) {
            Some(notice) => {
                notice.status = PaymentStatus::Paid;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, notice_id: &str) -> Option<&ViolationNotice> {
        self.notices.get(notice_id)
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}

impl Default for NoticeService {
    fn default() -> Self {
        NoticeService::new(FineSchedule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avn_protocol::types::ViolationKind;
    use chrono::DateTime;

    fn sample_now() -> NaiveDateTime {
        DateTime::from_timestamp(1_748_000_000, 0)
            .expect("valid timestamp")
            .naive_utc()
    }

    fn report(class: AircraftClass) -> ViolationReport {
        ViolationReport {
            flight_number: 101,
            airline: "PIA".to_string(),
            aircraft_class: class,
            kind: ViolationKind::Speed,
            recorded: 640.0,
            limit: 600.0,
        }
    }

    #[test]
    fn commercial_fine_with_surcharge() {
        let mut service = NoticeService::default();
        let (notice, registration) = service.issue(report(AircraftClass::Commercial), sample_now());

        assert_eq!(notice.base_fine, 500_000.0);
        assert_eq!(notice.total_amount, 500_000.0 * 1.15);
        assert_eq!(notice.status, PaymentStatus::Unpaid);
        assert_eq!(registration.amount_due, notice.total_amount);
        assert_eq!(registration.amount_paid, 0.0);
        assert!(registration.is_registration());
    }

    #[test]
    fn cargo_and_emergency_share_the_cargo_rate() {
        let mut service = NoticeService::default();
        let (cargo, _) = service.issue(report(AircraftClass::Cargo), sample_now());
        let (emergency, _) = service.issue(report(AircraftClass::Emergency), sample_now());

        assert_eq!(cargo.base_fine, 700_000.0);
        assert_eq!(emergency.base_fine, 700_000.0);
    }

    #[test]
    fn notice_id_embeds_issuance_and_flight() {
        let mut service = NoticeService::default();
        let (notice, _) = service.issue(report(AircraftClass::Commercial), sample_now());

        assert_eq!(notice.id, "AVN1748000000000_101");
        assert_eq!(notice.aircraft_id(), "F0101");
    }

    #[test]
    fn due_date_is_72_hours_out() {
        let mut service = NoticeService::default();
        let now = sample_now();
        let (notice, _) = service.issue(report(AircraftClass::Commercial), now);

        assert_eq!(notice.due_by - notice.issued_at, Duration::hours(72));
        assert_eq!(notice.issued_at, now);
    }

    #[test]
    fn mark_paid_only_touches_known_notices() {
        let mut service = NoticeService::default();
        let (notice, _) = service.issue(report(AircraftClass::Commercial), sample_now());

        assert!(!service.mark_paid("AVN0_999"));
        assert!(service.mark_paid(&notice.id));
        assert_eq!(
            service.get(&notice.id).map(|n| n.status),
            Some(PaymentStatus::Paid)
        );
    }
}
