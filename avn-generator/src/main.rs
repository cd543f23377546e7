use std::path::Path;
use std::process;
use std::thread;
use std::time::Duration;

use avn_generator::{GeneratorError, NoticeService};
use avn_protocol::frame::Frame;
use channel::{endpoints, ChannelReader, ChannelWriter};
use chrono::Utc;
use logger::{Color, Logger};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn run() -> Result<(), GeneratorError> {
    let logger = Logger::new(Path::new("logs"), "avn-generator")?;

    let mut reports = ChannelReader::bind(endpoints::SIM_TO_AVN)?;
    let mut portal = ChannelWriter::connect_retry(endpoints::AVN_TO_PORTAL, STARTUP_TIMEOUT)?;
    let mut payments = ChannelWriter::connect_retry(endpoints::PAYMENTS, STARTUP_TIMEOUT)?;

    logger.info("Violation-notice service up", Color::Green, true)?;

    let mut service = NoticeService::default();

    loop {
        let report = match reports.try_recv() {
            Some(Frame::Report(report)) => report,
            Some(other) => {
                logger.warn(&format!("Unexpected frame dropped: {:?}", other), true)?;
                continue;
            }
            None => {
                thread::sleep(POLL_INTERVAL);
                continue;
            }
        };

        let now = Utc::now().naive_utc();
        let (notice, registration) = service.issue(report, now);

        logger.info(
            &format!(
                "[AVN] Issued {} for flight {} | {} over {:.1} (limit {:.1}) | due {} | {} on record",
                notice.id,
                notice.aircraft_id(),
                notice.aircraft_class.as_str(),
                notice.recorded,
                notice.limit,
                notice.due_by.format("%Y-%m-%d %H:%M:%S"),
                service.len(),
            ),
            Color::Cyan,
            true,
        )?;

        portal.send(&Frame::Notice(notice))?;
        payments.send(&Frame::Payment(registration))?;
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("avn-generator failed: {}", e);
        process::exit(1);
    }
}
