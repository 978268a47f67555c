use serde::{Deserialize, Serialize};

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Envelope used by list endpoints that wrap their rows (`{ "data": [...] }`).
#[derive(Serialize, Deserialize, Debug)]
pub struct DataEnvelope<T> {
    pub data: T,
}

impl<T> DataEnvelope<T> {
    pub fn new(data: T) -> Self { Self { data } }
}
