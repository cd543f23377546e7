use std::io::{self, Write};
use std::path::Path;
use std::process;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use avn_protocol::frame::Frame;
use channel::{endpoints, ChannelReader, ChannelWriter};
use logger::{Color, Logger};
use portal::{Portal, PortalError};

const STARTUP_TIMEOUT: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn prompt_input(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut input = String::new();
    let _ = io::stdin().read_line(&mut input);
    input.trim().to_string()
}

/// Applies everything currently queued on the two inbound channels.
fn drain(
    notices: &mut ChannelReader,
    outcomes: &mut ChannelReader,
    portal: &Arc<Mutex<Portal>>,
    logger: &Logger,
) {
    while let Some(frame) = notices.try_recv() {
        if let Frame::Notice(notice) = frame {
            let _ = logger.info(
                &format!("[PORTAL] New notice {} for {}", notice.id, notice.aircraft_id()),
                Color::Cyan,
                true,
            );
            if let Ok(mut portal) = portal.lock() {
                portal.record_notice(notice);
            }
        }
    }

    while let Some(frame) = outcomes.try_recv() {
        if let Frame::Payment(outcome) = frame {
            let settled = match portal.lock() {
                Ok(mut portal) => portal.apply_outcome(&outcome),
                Err(_) => None,
            };
            match settled {
                Some(notice_id) => {
                    let _ = logger.info(
                        &format!("[PORTAL] Payment confirmed for {}", notice_id),
                        Color::Green,
                        true,
                    );
                }
                None => {
                    let _ = logger.warn(
                        &format!(
                            "[PORTAL] Payment failed for {} ({:.2} against {:.2})",
                            outcome.notice_id, outcome.amount_paid, outcome.amount_due
                        ),
                        true,
                    );
                }
            }
        }
    }
}

fn view_active(portal: &Arc<Mutex<Portal>>) {
    println!("\n=== Active notices ===");
    if let Ok(portal) = portal.lock() {
        for notice in portal.active() {
            println!(
                "ID: {} | Flight: {} | Due: {:.2} | Status: {}",
                notice.id,
                notice.aircraft_id(),
                notice.total_amount,
                notice.status.as_str()
            );
        }
        if portal.active_count() == 0 {
            println!("(none)");
        }
    }
}

fn view_history(portal: &Arc<Mutex<Portal>>) {
    println!("\n=== Settled notices ===");
    if let Ok(portal) = portal.lock() {
        for notice in portal.history() {
            println!(
                "ID: {} | Flight: {} | Paid: {:.2}",
                notice.id,
                notice.aircraft_id(),
                notice.total_amount
            );
        }
        if portal.history().is_empty() {
            println!("(none)");
        }
    }
}

fn pay(portal: &Arc<Mutex<Portal>>, payments: &mut ChannelWriter) -> Result<(), PortalError> {
    let notice_id = prompt_input("Notice ID: ");

    let amount_due = match portal.lock() {
        Ok(portal) => portal.get_active(&notice_id).map(|n| n.total_amount),
        Err(_) => None,
    };
    let amount_due = match amount_due {
        Some(amount_due) => amount_due,
        None => {
            println!("No such active notice.");
            return Ok(());
        }
    };

    let amount_input = prompt_input(&format!("Amount to pay ({:.2}): ", amount_due));
    let amount: f64 = match amount_input.parse() {
        Ok(amount) if amount > 0.0 => amount,
        _ => {
            println!("Invalid amount.");
            return Ok(());
        }
    };

    let request = match portal.lock() {
        Ok(portal) => portal.settlement_request(&notice_id, amount),
        Err(_) => None,
    };
    if let Some(request) = request {
        payments.send(&Frame::Payment(request))?;
        println!("Payment request sent for {}.", notice_id);
    }
    Ok(())
}

fn run() -> Result<(), PortalError> {
    let logger = Logger::new(Path::new("logs"), "portal")?;

    let mut notices = ChannelReader::bind(endpoints::AVN_TO_PORTAL)?;
    let mut outcomes = ChannelReader::bind(endpoints::PAYMENTS_TO_PORTAL)?;
    let mut payments = ChannelWriter::connect_retry(endpoints::PAYMENTS, STARTUP_TIMEOUT)?;

    logger.info("Airline portal up", Color::Green, true)?;

    let portal = Arc::new(Mutex::new(Portal::new()));

    let background = Arc::clone(&portal);
    let background_logger = logger.clone();
    thread::spawn(move || loop {
        drain(&mut notices, &mut outcomes, &background, &background_logger);
        thread::sleep(POLL_INTERVAL);
    });

    loop {
        println!("\n--- Airline Portal ---");
        println!("1. View active notices");
        println!("2. View settled notices");
        println!("3. Pay a notice");
        println!("4. Quit");

        match prompt_input("> ").as_str() {
            "1" => view_active(&portal),
            "2" => view_history(&portal),
            "3" => pay(&portal, &mut payments)?,
            "4" => return Ok(()),
            _ => println!("Invalid choice"),
        }
    }
}

fn main() {
    if let Err(e) = run() {
        eprintln!("portal failed: {}", e);
        process::exit(1);
    }
}
