use crate::{
    api::{activity, approval, attendance, dashboard, dtrp, leave_request, notifications, overtime},
    auth::middleware::auth_middleware,
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfig, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Per-scope limiter, `requests_per_min` tokens refilled evenly over a minute
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish();
    match cfg {
        Some(cfg) => Governor::new(&cfg),
        // both values are clamped to at least 1, so this is the quota-less default
        None => Governor::new(&GovernorConfig::default()),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .configure(protected),
    );
}

/// Every authenticated route, relative to the API prefix.
pub fn protected(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dtrp")
            // /dtrp
            .service(
                web::resource("")
                    .route(web::get().to(dtrp::list_dtrp))
                    .route(web::post().to(dtrp::create_dtrp)),
            )
            // /dtrp/{id}
            .service(
                web::resource("/{id}")
                    .route(web::get().to(dtrp::get_dtrp))
                    .route(web::put().to(dtrp::update_dtrp))
                    .route(web::delete().to(dtrp::delete_dtrp)),
            ),
    )
    .service(
        web::scope("/leave")
            .service(
                web::resource("")
                    .route(web::get().to(leave_request::list_leave))
                    .route(web::post().to(leave_request::create_leave)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(leave_request::get_leave))
                    .route(web::put().to(leave_request::update_leave))
                    .route(web::delete().to(leave_request::delete_leave)),
            ),
    )
    .service(
        web::scope("/overtime")
            .service(
                web::resource("")
                    .route(web::get().to(overtime::list_overtime))
                    .route(web::post().to(overtime::create_overtime)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(overtime::get_overtime))
                    .route(web::put().to(overtime::update_overtime))
                    .route(web::delete().to(overtime::delete_overtime)),
            ),
    )
    // /approval/{kind}/{id}
    .service(web::resource("/approval/{kind}/{id}").route(web::put().to(approval::decide)))
    .service(
        web::scope("/attendance")
            .service(
                web::resource("")
                    .route(web::put().to(attendance::check_out))
                    .route(web::post().to(attendance::check_in)),
            )
            .service(web::resource("/day").route(web::get().to(attendance::find_day)))
            .service(web::resource("/range").route(web::get().to(attendance::find_range)))
            // /attendance/{employee_id}/{date}
            .service(
                web::resource("/{employee_id}/{date}")
                    .route(web::put().to(attendance::upsert_day)),
            ),
    )
    .service(
        web::resource("/notifications").route(web::get().to(notifications::notifications)),
    )
    .service(
        web::scope("/activity")
            .service(web::resource("/refresh").route(web::post().to(activity::refresh_statuses)))
            .service(web::resource("/today").route(web::get().to(activity::today_logs)))
            .service(
                web::resource("/{employee_id}/active").route(web::put().to(activity::mark_active)),
            ),
    )
    .service(
        web::resource("/dashboard/stream").route(web::get().to(dashboard::stream_dashboard)),
    );
}
