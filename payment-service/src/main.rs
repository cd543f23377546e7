use std::path::Path;
use std::process;
use std::thread;
use std::time::Duration;

use avn_protocol::frame::Frame;
use channel::{endpoints, ChannelReader, ChannelWriter};
use chrono::Utc;
use logger::{Color, Logger};
use payment_service::{PaymentError, PaymentProcessor, Resolution};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn run() -> Result<(), PaymentError> {
    let logger = Logger::new(Path::new("logs"), "payment-service")?;

    let mut inbound = ChannelReader::bind(endpoints::PAYMENTS)?;
    let mut portal = ChannelWriter::connect_retry(endpoints::PAYMENTS_TO_PORTAL, STARTUP_TIMEOUT)?;

    logger.info("Payment service up", Color::Green, true)?;

    let mut processor = PaymentProcessor::new();

    loop {
        let record = match inbound.try_recv() {
            Some(Frame::Payment(record)) => record,
            Some(other) => {
                logger.warn(&format!("Unexpected frame dropped: {:?}", other), true)?;
                continue;
            }
            None => {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
        };

        match processor.process(record, Utc::now().naive_utc()) {
            Resolution::Registered => {
                logger.info(
                    &format!("[PAY] Obligations pending: {}", processor.pending_count()),
                    Color::Cyan,
                    true,
                )?;
            }
            Resolution::Resolved(outcome) => {
                if outcome.successful {
                    logger.info(
                        &format!(
                            "[PAY] Confirmed {} | {:.2} paid against {:.2}",
                            outcome.notice_id, outcome.amount_paid, outcome.amount_due
                        ),
                        Color::Green,
                        true,
                    )?;
                } else {
                    logger.warn(
                        &format!(
                            "[PAY] Declined {} | {:.2} short of {:.2}",
                            outcome.notice_id, outcome.amount_paid, outcome.amount_due
                        ),
                        true,
                    )?;
                }
                portal.send(&Frame::Payment(outcome))?;
            }
            Resolution::Unknown(notice_id) => {
                logger.warn(&format!("[PAY] Unknown notice {}", notice_id), true)?;
            }
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("payment-service failed: {}", e);
        process::exit(1);
    }
}
