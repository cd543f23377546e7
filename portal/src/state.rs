use std::collections::HashMap;

use avn_protocol::messages::notice::ViolationNotice;
use avn_protocol::messages::payment::PaymentRecord;
use avn_protocol::types::PaymentStatus;

/// The portal's view of outstanding and settled fines.
///
/// Active notices are keyed by notice ID; a confirmed payment moves the
/// notice to history and it never comes back. The portal itself decides
/// nothing about payments, it only mirrors what the authoritative services
/// tell it.
#[derive(Default)]
pub struct Portal {
    active: HashMap<String, ViolationNotice>,
    history: Vec<ViolationNotice>,
}

impl Portal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a newly issued notice as active.
    pub fn record_notice(&mut self, notice: ViolationNotice) {
        self.active.insert(notice.id.clone(), notice);
    }

    /// Applies a settlement outcome from the payment service.
    ///
    /// A successful outcome marks the notice paid and moves it to history;
    /// returns the settled notice ID. Failed outcomes and outcomes for
    /// unknown notices change nothing.
    pub fn apply_outcome(&mut self, outcome: &PaymentRecord) -> Option<String> {
        if !outcome.successful {
            return None;
        }
        let mut notice = self.active.remove(&outcome.notice_id)?;
        notice.status = PaymentStatus::Paid;
        self.history.push(notice);
        Some(outcome.notice_id.clone())
    }

    /// Builds a settlement attempt for a user-chosen amount against an
    /// active notice. `None` when the notice is unknown or already settled.
    pub fn settlement_request(&self, notice_id: &str, amount: f64) -> Option<PaymentRecord> {
        let notice = self.active.get(notice_id)?;
        Some(PaymentRecord {
            notice_id: notice.id.clone(),
            aircraft_id: notice.aircraft_id(),
            aircraft_class: notice.aircraft_class,
            amount_due: notice.total_amount,
            amount_paid: amount,
            successful: false,
            settled_at: None,
        })
    }

    pub fn active(&self) -> impl Iterator<Item = &ViolationNotice> {
        self.active.values()
    }

    pub fn get_active(&self, notice_id: &str) -> Option<&ViolationNotice> {
        self.active.get(notice_id)
    }

    pub fn history(&self) -> &[ViolationNotice] {
        &self.history
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
