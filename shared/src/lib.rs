use serde::{Deserialize, Serialize};

/// Result of running one classifier over one uploaded leaf photo.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PredictionResponse {
    pub model: String,
    pub class_name: String,
    pub plant: String,
    pub condition: String,
    pub healthy: bool,
    pub confidence: f32,
    pub probabilities: Vec<f32>,
}

/// One entry of the fixed model menu.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ModelInfo {
    pub key: String,
    pub label: String,
    pub input_width: u32,
    pub input_height: u32,
    pub loaded: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ErrorResponse {
    pub error: String,
}
