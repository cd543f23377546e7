use std::net::{Ipv4Addr, SocketAddrV4};
use std::thread;
use std::time::Duration;

use avn_generator::NoticeService;
use avn_protocol::frame::Frame;
use avn_protocol::messages::report::ViolationReport;
use avn_protocol::types::{AircraftClass, PaymentStatus, ViolationKind};
use channel::{ChannelReader, ChannelWriter};
use chrono::{DateTime, NaiveDateTime};
use payment_service::{PaymentProcessor, Resolution};
use portal::Portal;

fn sample_now() -> NaiveDateTime {
    DateTime::from_timestamp(1_748_000_000, 0)
        .expect("valid timestamp")
        .naive_utc()
}

fn speed_report(flight_number: u32, class: AircraftClass) -> ViolationReport {
    ViolationReport {
        flight_number,
        airline: "PIA".to_string(),
        aircraft_class: class,
        kind: ViolationKind::Speed,
        recorded: 640.0,
        limit: 600.0,
    }
}

fn recv_blocking(reader: &mut ChannelReader) -> Frame {
    for _ in 0..200 {
        if let Some(frame) = reader.try_recv() {
            return frame;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("no frame arrived within the deadline");
}

#[test]
fn notice_flows_through_payment_to_history() {
    let mut service = NoticeService::default();
    let mut processor = PaymentProcessor::new();
    let mut portal = Portal::new();
    let now = sample_now();

    // The notice service issues the fine and registers the obligation.
    let (notice, registration) = service.issue(speed_report(101, AircraftClass::Commercial), now);
    let notice_id = notice.id.clone();
    portal.record_notice(notice);
    assert_eq!(processor.process(registration, now), Resolution::Registered);

    // An underpayment is declined and leaves everything outstanding.
    let short = portal
        .settlement_request(&notice_id, 500_000.0)
        .expect("notice is active");
    match processor.process(short, now) {
        Resolution::Resolved(outcome) => {
            assert!(!outcome.successful);
            assert_eq!(portal.apply_outcome(&outcome), None);
        }
        other => panic!("unexpected resolution {:?}", other),
    }
    assert_eq!(portal.active_count(), 1);
    assert!(processor.is_pending(&notice_id));

    // Paying the full amount settles the fine for good.
    let full = portal
        .settlement_request(&notice_id, 575_000.0)
        .expect("notice is still active");
    match processor.process(full, now) {
        Resolution::Resolved(outcome) => {
            assert!(outcome.successful);
            assert_eq!(outcome.settled_at, Some(now));
            assert_eq!(portal.apply_outcome(&outcome), Some(notice_id.clone()));
            service.mark_paid(&outcome.notice_id);
        }
        other => panic!("unexpected resolution {:?}", other),
    }

    assert_eq!(portal.active_count(), 0);
    assert_eq!(portal.history().len(), 1);
    assert_eq!(portal.history()[0].status, PaymentStatus::Paid);
    assert!(!processor.is_pending(&notice_id));
    assert_eq!(
        service.get(&notice_id).map(|n| n.status),
        Some(PaymentStatus::Paid)
    );
    assert!(portal.settlement_request(&notice_id, 1.0).is_none());
}

#[test]
fn emergency_fine_uses_cargo_rate_end_to_end() {
    let mut service = NoticeService::default();
    let mut processor = PaymentProcessor::new();
    let mut portal = Portal::new();
    let now = sample_now();

    let (notice, registration) = service.issue(speed_report(202, AircraftClass::Emergency), now);
    let notice_id = notice.id.clone();
    assert_eq!(notice.base_fine, 700_000.0);
    // 1.15 is inexact in binary, so compare against the computed product.
    assert_eq!(notice.total_amount, 700_000.0 * 1.15);

    portal.record_notice(notice);
    processor.process(registration, now);

    // The cargo-rate total is what actually has to be paid.
    let attempt = portal
        .settlement_request(&notice_id, 575_000.0)
        .expect("notice is active");
    match processor.process(attempt, now) {
        Resolution::Resolved(outcome) => assert!(!outcome.successful),
        other => panic!("unexpected resolution {:?}", other),
    }

    let attempt = portal
        .settlement_request(&notice_id, 805_000.0)
        .expect("notice is active");
    match processor.process(attempt, now) {
        Resolution::Resolved(outcome) => {
            assert!(outcome.successful);
            portal.apply_outcome(&outcome);
        }
        other => panic!("unexpected resolution {:?}", other),
    }
    assert_eq!(portal.history().len(), 1);
}

#[test]
fn pipeline_messages_survive_the_wire() {
    let addr = SocketAddrV4::new(Ipv4Addr::LOCALHOST, 7731);
    let mut reader = ChannelReader::bind(addr).expect("bind test endpoint");
    let mut writer = ChannelWriter::connect(addr).expect("connect test endpoint");

    let mut service = NoticeService::default();
    let (notice, registration) =
        service.issue(speed_report(303, AircraftClass::Commercial), sample_now());

    writer
        .send(&Frame::Notice(notice.clone()))
        .expect("send notice");
    writer
        .send(&Frame::Payment(registration.clone()))
        .expect("send registration");

    assert_eq!(recv_blocking(&mut reader), Frame::Notice(notice));
    assert_eq!(recv_blocking(&mut reader), Frame::Payment(registration));
}

#[test]
fn duplicate_confirmation_does_not_double_settle() {
    let mut service = NoticeService::default();
    let mut processor = PaymentProcessor::new();
    let mut portal = Portal::new();
    let now = sample_now();

    let (notice, registration) = service.issue(speed_report(404, AircraftClass::Cargo), now);
    let notice_id = notice.id.clone();
    portal.record_notice(notice);
    processor.process(registration, now);

    let attempt = portal
        .settlement_request(&notice_id, 805_000.0)
        .expect("notice is active");
    let outcome = match processor.process(attempt, now) {
        Resolution::Resolved(outcome) => outcome,
        other => panic!("unexpected resolution {:?}", other),
    };

    assert_eq!(portal.apply_outcome(&outcome), Some(notice_id.clone()));
    // Replaying the same confirmation is a no-op.
    assert_eq!(portal.apply_outcome(&outcome), None);
    assert_eq!(portal.history().len(), 1);

    // And the obligation is gone from the payment service as well.
    let retry = PaymentProcessor::new().process(outcome, now);
    assert!(matches!(retry, Resolution::Unknown(_)));
}
