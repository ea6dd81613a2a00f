//! The fixed PlantVillage label list shared by every classifier in the menu.
//!
//! Labels use the dataset's `Plant___condition` convention; underscores stand
//! in for spaces inside each half.

pub const CLASS_NAMES: [&str; 38] = [
    "Apple___Apple_scab",
    "Apple___Black_rot",
    "Apple___Cedar_apple_rust",
    "Apple___healthy",
    "Blueberry___healthy",
    "Cherry_(including_sour)___Powdery_mildew",
    "Cherry_(including_sour)___healthy",
    "Corn_(maize)___Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_(maize)___Common_rust_",
    "Corn_(maize)___Northern_Leaf_Blight",
    "Corn_(maize)___healthy",
    "Grape___Black_rot",
    "Grape___Esca_(Black_Measles)",
    "Grape___Leaf_blight_(Isariopsis_Leaf_Spot)",
    "Grape___healthy",
    "Orange___Haunglongbing_(Citrus_greening)",
    "Peach___Bacterial_spot",
    "Peach___healthy",
    "Pepper,_bell___Bacterial_spot",
    "Pepper,_bell___healthy",
    "Potato___Early_blight",
    "Potato___Late_blight",
    "Potato___healthy",
    "Raspberry___healthy",
    "Soybean___healthy",
    "Squash___Powdery_mildew",
    "Strawberry___Leaf_scorch",
    "Strawberry___healthy",
    "Tomato___Bacterial_spot",
    "Tomato___Early_blight",
    "Tomato___Late_blight",
    "Tomato___Leaf_Mold",
    "Tomato___Septoria_leaf_spot",
    "Tomato___Spider_mites Two-spotted_spider_mite",
    "Tomato___Target_Spot",
    "Tomato___Tomato_Yellow_Leaf_Curl_Virus",
    "Tomato___Tomato_mosaic_virus",
    "Tomato___healthy",
];

/// Maps an argmax index to its label. `None` when the model emitted more
/// classes than the label list covers.
pub fn class_name(index: usize) -> Option<&'static str> {
    CLASS_NAMES.get(index).copied()
}

/// Splits a raw label into human-readable (plant, condition) halves.
pub fn split_label(name: &str) -> (String, String) {
    match name.split_once("___") {
        Some((plant, condition)) => (tidy(plant), tidy(condition)),
        None => (tidy(name), "unknown".to_string()),
    }
}

pub fn is_healthy(name: &str) -> bool {
    name.split_once("___")
        .map(|(_, condition)| condition.eq_ignore_ascii_case("healthy"))
        .unwrap_or(false)
}

fn tidy(part: &str) -> String {
    part.replace('_', " ").trim().to_string()
}
