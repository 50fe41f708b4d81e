use derive_new::new;
use serde::Serialize;

#[derive(Debug, Serialize, new)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub users: i64,
    pub completed_profiles: i64,
    pub events: i64,
    pub registrations: i64,
}
