//! City lookup used while setting up a site.

use serde::Deserialize;
use tracing::{debug, instrument};

use super::{Endpoints, Transport, get_decoded};
use crate::{error::HeWeatherError, model::CityList};

#[derive(Debug, Deserialize)]
struct LookupResponse {
    location: Vec<LookupCity>,
}

#[derive(Debug, Deserialize)]
struct LookupCity {
    id: String,
    name: String,
    adm2: String,
    adm1: String,
}

/// Resolve free text or `"lon,lat"` into candidate city ids.
///
/// Transport errors are returned unchanged so the caller can tell a bad key
/// from a bad location. An empty `location` array yields an empty list.
#[instrument(skip(transport, endpoints, api_key))]
pub async fn resolve_location(
    transport: &dyn Transport,
    endpoints: &Endpoints,
    location: &str,
    api_key: &str,
) -> Result<CityList, HeWeatherError> {
    let url = endpoints.lookup_url(location, api_key)?;
    let parsed: LookupResponse = get_decoded(transport, url).await?;

    let mut cities = CityList::default();
    for city in parsed.location {
        let label = format!("{}-{}-{}", city.name, city.adm2, city.adm1);
        cities.insert(city.id, label);
    }

    debug!(count = cities.len(), "resolved location");
    Ok(cities)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::tests::{FakeTransport, endpoints};
    use serde_json::json;

    const PATH: &str = "/v2/city/lookup";

    #[tokio::test]
    async fn two_entries_give_two_labelled_candidates() {
        let fake = FakeTransport::default();
        fake.respond(
            PATH,
            json!({
                "code": "200",
                "location": [
                    {"id": "101010100", "name": "Beijing", "adm2": "Beijing", "adm1": "Beijing"},
                    {"id": "101280601", "name": "Shenzhen", "adm2": "Shenzhen", "adm1": "Guangdong"}
                ]
            }),
        );

        let cities = resolve_location(&fake, &endpoints(), "116.41,39.92", "KEY").await.unwrap();

        assert_eq!(cities.len(), 2);
        assert_eq!(cities.get("101010100"), Some("Beijing-Beijing-Beijing"));
        assert_eq!(cities.get("101280601"), Some("Shenzhen-Shenzhen-Guangdong"));
        assert_eq!(cities.first().map(|c| c.id.as_str()), Some("101010100"));

        let requests = fake.requests.lock().unwrap();
        assert_eq!(requests[0].query(), Some("location=116.41%2C39.92&key=KEY"));
    }

    #[tokio::test]
    async fn empty_location_array_is_not_an_error() {
        let fake = FakeTransport::default();
        fake.respond(PATH, json!({"code": "200", "location": []}));

        let cities = resolve_location(&fake, &endpoints(), "nowhere", "KEY").await.unwrap();
        assert!(cities.is_empty());
    }

    #[tokio::test]
    async fn errors_propagate_unchanged() {
        let fake = FakeTransport::default();
        fake.fail(PATH, 401);
        let err = resolve_location(&fake, &endpoints(), "beijing", "BAD").await.unwrap_err();
        assert!(matches!(err, HeWeatherError::InvalidApiKey { code: 401, .. }));

        fake.fail(PATH, 404);
        let err = resolve_location(&fake, &endpoints(), "beijing", "KEY").await.unwrap_err();
        assert!(matches!(err, HeWeatherError::ApiParam { code: 404, .. }));
    }

    #[tokio::test]
    async fn missing_location_field_is_payload_error() {
        let fake = FakeTransport::default();
        fake.respond(PATH, json!({"code": "200"}));

        let err = resolve_location(&fake, &endpoints(), "beijing", "KEY").await.unwrap_err();
        assert!(matches!(err, HeWeatherError::Payload { .. }));
    }
}
