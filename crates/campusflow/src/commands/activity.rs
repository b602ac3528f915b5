//! Raw activity record handlers.

use chrono::{DateTime, Utc};
use tabled::Tabled;

use campusflow_core::Controller;
use campusflow_core::model::{CctvFrame, LabBooking, LibraryCheckout, Note, Swipe, WifiLog};

use crate::cli::{ActivityArgs, ActivityCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

fn fmt_time(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

// ── Table rows ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct SwipeRow {
    #[tabled(rename = "CARD")]
    card: String,
    #[tabled(rename = "LOCATION")]
    location: String,
    #[tabled(rename = "TIME")]
    time: String,
}

#[derive(Tabled)]
struct WifiRow {
    #[tabled(rename = "DEVICE")]
    device: String,
    #[tabled(rename = "AP")]
    ap: String,
    #[tabled(rename = "TIME")]
    time: String,
}

#[derive(Tabled)]
struct BookingRow {
    #[tabled(rename = "BOOKING")]
    booking: String,
    #[tabled(rename = "ENTITY")]
    entity: String,
    #[tabled(rename = "LAB")]
    lab: String,
    #[tabled(rename = "START")]
    start: String,
    #[tabled(rename = "END")]
    end: String,
    #[tabled(rename = "ATTENDED")]
    attended: String,
}

#[derive(Tabled)]
struct CheckoutRow {
    #[tabled(rename = "CHECKOUT")]
    checkout: String,
    #[tabled(rename = "ENTITY")]
    entity: String,
    #[tabled(rename = "BOOK")]
    book: String,
    #[tabled(rename = "TIME")]
    time: String,
}

#[derive(Tabled)]
struct NoteRow {
    #[tabled(rename = "ENTITY")]
    entity: String,
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "TEXT")]
    text: String,
}

#[derive(Tabled)]
struct CctvRow {
    #[tabled(rename = "FRAME")]
    frame: String,
    #[tabled(rename = "LOCATION")]
    location: String,
    #[tabled(rename = "TIME")]
    time: String,
    #[tabled(rename = "FACE")]
    face: String,
}

pub async fn handle(
    controller: &Controller,
    args: ActivityArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let out = match args.command {
        ActivityCommand::Swipes { limit, entity } => {
            let snapshot = controller.swipes(limit, entity.as_deref()).await?;
            output::render_list(
                &global.output,
                &snapshot.value,
                |s: &Swipe| SwipeRow {
                    card: s.card_id.clone(),
                    location: s.location_id.clone(),
                    time: fmt_time(s.timestamp),
                },
                |s| s.card_id.clone(),
            )
        }
        ActivityCommand::Wifi { limit, entity } => {
            let snapshot = controller.wifi_logs(limit, entity.as_deref()).await?;
            output::render_list(
                &global.output,
                &snapshot.value,
                |w: &WifiLog| WifiRow {
                    device: w.device_hash.clone(),
                    ap: w.ap_id.clone(),
                    time: fmt_time(w.timestamp),
                },
                |w| w.device_hash.clone(),
            )
        }
        ActivityCommand::Bookings { entity, upcoming } => {
            let snapshot = controller.lab_bookings(entity.as_deref(), upcoming).await?;
            output::render_list(
                &global.output,
                &snapshot.value,
                |b: &LabBooking| BookingRow {
                    booking: b.booking_id.clone(),
                    entity: b.entity_id.clone(),
                    lab: b.lab_id.clone(),
                    start: fmt_time(b.start_time),
                    end: fmt_time(b.end_time),
                    attended: if b.attended_flag { "yes" } else { "no" }.into(),
                },
                |b| b.booking_id.clone(),
            )
        }
        ActivityCommand::Checkouts { entity } => {
            let snapshot = controller.library_checkouts(entity.as_deref()).await?;
            output::render_list(
                &global.output,
                &snapshot.value,
                |c: &LibraryCheckout| CheckoutRow {
                    checkout: c.checkout_id.clone(),
                    entity: c.entity_id.clone(),
                    book: c.book_id.clone(),
                    time: fmt_time(c.timestamp),
                },
                |c| c.checkout_id.clone(),
            )
        }
        ActivityCommand::Notes { entity, source } => {
            let snapshot = controller
                .notes(entity.as_deref(), source.as_deref())
                .await?;
            output::render_list(
                &global.output,
                &snapshot.value,
                |n: &Note| NoteRow {
                    entity: n.entity_id.clone(),
                    source: n.source.clone(),
                    time: fmt_time(n.timestamp),
                    text: n.text.clone(),
                },
                |n| n.entity_id.clone(),
            )
        }
        ActivityCommand::Cctv { location, limit } => {
            let snapshot = controller.cctv_frames(location.as_deref(), limit).await?;
            output::render_list(
                &global.output,
                &snapshot.value,
                |f: &CctvFrame| CctvRow {
                    frame: f.frame_id.clone(),
                    location: f.location_id.clone(),
                    time: fmt_time(f.timestamp),
                    face: f.face_id.clone().unwrap_or_else(|| "-".into()),
                },
                |f| f.frame_id.clone(),
            )
        }
    };

    output::print_output(&out, global.quiet);
    Ok(())
}
