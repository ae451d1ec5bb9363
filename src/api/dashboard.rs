use std::time::Duration;

use actix_web::web::Bytes;
use actix_web::{HttpResponse, web};
use chrono::{DateTime, Utc};
use futures::Stream;
use futures::stream;
use serde::{Deserialize, Serialize};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{info, warn};
use utoipa::IntoParams;

use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::error::ServiceError;
use crate::service::TimekeepingService;

const OPEN_FRAME: &[u8] = b"event: open\ndata: {}\n\n";

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct DashboardQuery {
    /// Required for managers; employees always watch themselves
    pub employee_id: Option<String>,
}

/// One server-sent event carrying `payload` as JSON.
pub fn sse_frame<T: Serialize>(payload: &T) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(payload)?;
    Ok(Bytes::from(format!("data: {json}\n\n")))
}

struct Feed {
    service: web::Data<TimekeepingService>,
    employee_id: String,
    time_in: DateTime<Utc>,
    ticker: Interval,
    opened: bool,
}

/// An `open` frame, then a productivity snapshot on every tick. Ends on the
/// first storage failure.
fn snapshot_stream(
    service: web::Data<TimekeepingService>,
    employee_id: String,
    time_in: DateTime<Utc>,
    every: Duration,
) -> impl Stream<Item = Result<Bytes, ServiceError>> {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let feed = Feed {
        service,
        employee_id,
        time_in,
        ticker,
        opened: false,
    };

    stream::unfold(feed, |mut feed| async move {
        if !feed.opened {
            feed.opened = true;
            return Some((Ok(Bytes::from_static(OPEN_FRAME)), feed));
        }
        feed.ticker.tick().await;

        let snapshot = match feed
            .service
            .productivity(&feed.employee_id, feed.time_in, Utc::now())
            .await
        {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(employee_id = %feed.employee_id, error = %e, "Dashboard stream closed");
                return None;
            }
        };
        match sse_frame(&snapshot) {
            Ok(frame) => Some((Ok(frame), feed)),
            Err(e) => {
                warn!(employee_id = %feed.employee_id, error = %e, "Unserializable snapshot");
                None
            }
        }
    })
}

/// Live productivity feed as `text/event-stream`. Waits for today's
/// clock-in before opening.
#[utoipa::path(
    get,
    path = "/api/dashboard/stream",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Event stream of productivity snapshots", content_type = "text/event-stream", body = crate::engine::productivity::ProductivitySnapshot),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No time-in recorded today", body = Object, example = json!({
            "error": "not_yet_available",
            "message": "EMP1 has not clocked in today"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn stream_dashboard(
    auth: AuthUser,
    service: web::Data<TimekeepingService>,
    config: web::Data<Config>,
    query: web::Query<DashboardQuery>,
) -> actix_web::Result<HttpResponse> {
    let employee_id = auth.acting_for(query.employee_id.as_deref())?;
    let time_in = service
        .wait_for_time_in(
            &employee_id,
            Utc::now().date_naive(),
            config.dashboard_wait_timeout(),
            config.dashboard_poll_interval(),
        )
        .await?;

    info!(employee_id = %employee_id, "Dashboard stream opened");
    let body = snapshot_stream(
        service,
        employee_id,
        time_in,
        config.dashboard_push_interval(),
    );
    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(body))
}
