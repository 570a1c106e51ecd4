use crate::location::Coordinates;

#[derive(Clone)]
pub struct AppConfig {
    pub geocoder_api_key: Option<String>,
    pub geocoder_base_url: String,
    pub request_timeout_secs: u64,
    pub country_bias: String,
    pub default_center: Coordinates,
    pub search_radius_m: u32,
    pub sensor_timeout_secs: u64,
    pub sensor_max_age_secs: u64,
    pub device_position: Option<Coordinates>,
    pub log_level: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field(
                "geocoder_api_key",
                &self.geocoder_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("geocoder_base_url", &self.geocoder_base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("country_bias", &self.country_bias)
            .field("default_center", &self.default_center)
            .field("search_radius_m", &self.search_radius_m)
            .field("sensor_timeout_secs", &self.sensor_timeout_secs)
            .field("sensor_max_age_secs", &self.sensor_max_age_secs)
            .field("device_position", &self.device_position)
            .field("log_level", &self.log_level)
            .finish()
    }
}
