use crate::{api, config::Config};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use anyhow::{Result, anyhow};
use std::sync::Arc;

type Limiter = Arc<Governor<PeerIpKeyExtractor, NoOpMiddleware>>;

/// Built once and shared by every worker so quotas are per process, not per worker.
#[derive(Clone)]
pub struct RateLimiters {
    api: Limiter,
    settlement: Limiter,
}

impl RateLimiters {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            api: Arc::new(build_limiter(config.rate_api_per_min)?),
            settlement: Arc::new(build_limiter(config.rate_settlement_per_min)?),
        })
    }
}

fn build_limiter(requests_per_min: u32) -> Result<Governor<PeerIpKeyExtractor, NoOpMiddleware>> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .ok_or_else(|| anyhow!("invalid rate limit: {requests_per_min} requests per minute"))?;
    Ok(Governor::new(&cfg))
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiters: &RateLimiters) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(limiters.api.clone())
            // /employees/{id}/settlement writes money; it gets a tighter quota
            .service(
                web::scope("/employees/{id}/settlement")
                    .wrap(limiters.settlement.clone())
                    .configure(api::settlement::configure),
            )
            .configure(api::configure),
    );
}
