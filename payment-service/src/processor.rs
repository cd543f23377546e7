use std::collections::HashMap;

use avn_protocol::messages::payment::PaymentRecord;
use chrono::NaiveDateTime;

/// What `process` did with an incoming payment record.
#[derive(Debug, PartialEq)]
pub enum Resolution {
    /// A registration established (or replaced) a pending obligation.
    Registered,
    /// A settlement attempt was resolved; the outcome goes to the portal.
    Resolved(PaymentRecord),
    /// The attempt referenced no pending obligation and was dropped.
    Unknown(String),
}

/// Resolves settlement attempts against registered obligations.
#[derive(Default)]
pub struct PaymentProcessor {
    pending: HashMap<String, PaymentRecord>,
}

impl PaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles one payment record.
    ///
    /// A registration (amount paid 0) inserts the obligation keyed by notice
    /// ID; re-registration silently replaces the previous entry. A
    /// settlement attempt succeeds iff the paid amount covers the stored
    /// amount due; success removes the obligation, failure leaves it
    /// retryable. Attempts against unknown IDs are dropped.
    pub fn process(&mut self, record: PaymentRecord, now: NaiveDateTime) -> Resolution {
        if record.is_registration() {
            self.pending.insert(record.notice_id.clone(), record);
            return Resolution::Registered;
        }

        let obligation = match self.pending.get(&record.notice_id) {
            Some(obligation) => obligation,
            None => return Resolution::Unknown(record.notice_id),
        };

        let successful = record.amount_paid >= obligation.amount_due;
        let outcome = PaymentRecord {
            notice_id: record.notice_id.clone(),
            aircraft_id: obligation.aircraft_id.clone(),
            aircraft_class: obligation.aircraft_class,
            amount_due: obligation.amount_due,
            amount_paid: record.amount_paid,
            successful,
            settled_at: if successful { Some(now) } else { None },
        };

        if successful {
            self.pending.remove(&record.notice_id);
        }
        Resolution::Resolved(outcome)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_pending(&self, notice_id: &str) -> bool {
        self.pending.contains_key(notice_id)
    }
}
