//! Detects whether an API key is entitled to the 24-hour and 7-day forecasts.

use tracing::{debug, instrument};

use super::{Endpoints, Transport};
use crate::model::Horizon;

/// `true` when a 24-hour forecast request succeeds. Any failure, whether
/// network, key or parameter, reads as `false`.
#[instrument(skip(transport, endpoints, api_key))]
pub async fn probe_extended_forecast(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    location: &str,
    api_key: &str,
) -> bool {
    let url = match endpoints
        .weather_url(Horizon::Hourly.path(), &[("location", location), ("key", api_key)])
    {
        Ok(url) => url,
        Err(err) => {
            debug!(error = %err, "probe skipped");
            return false;
        }
    };

    match transport.get_json(url).await {
        Ok(_) => true,
        Err(err) => {
            debug!(error = %err, "extended forecast unavailable");
            false
        }
    }
}

/// Horizons offered for selection. Three days is always available.
pub fn available_horizons(extended: bool) -> Vec<Horizon> {
    if extended {
        vec![Horizon::ThreeDays, Horizon::SevenDays, Horizon::Hourly]
    } else {
        vec![Horizon::ThreeDays]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::tests::{FakeTransport, endpoints};
    use serde_json::json;

    #[tokio::test]
    async fn success_means_entitled() {
        let fake = FakeTransport::default();
        fake.respond("/v7/weather/24h", json!({"code": "200", "hourly": []}));

        assert!(probe_extended_forecast(&fake, &endpoints(), "101010100", "KEY").await);
        assert_eq!(fake.paths(), vec!["/v7/weather/24h"]);
    }

    #[tokio::test]
    async fn every_failure_reads_as_false() {
        let fake = FakeTransport::default();
        for code in [401, 403, 404, 429] {
            fake.fail("/v7/weather/24h", code);
            assert!(!probe_extended_forecast(&fake, &endpoints(), "101010100", "KEY").await);
        }

        let broken = Endpoints::new("http://x/lookup", "no scheme");
        assert!(!probe_extended_forecast(&fake, &broken, "101010100", "KEY").await);
    }

    #[test]
    fn horizons_by_entitlement() {
        assert_eq!(available_horizons(false), vec![Horizon::ThreeDays]);
        assert_eq!(
            available_horizons(true),
            vec![Horizon::ThreeDays, Horizon::SevenDays, Horizon::Hourly]
        );
    }
}
