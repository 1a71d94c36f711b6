/// Class labels in the order of the classifier's output vector. Versioned together with the
/// model file; the classifier refuses to load a model whose output width differs.
pub const CLASS_NAMES: [&str; 38] = [
    "Apple__Apple_scab",
    "Apple_Black_rot",
    "Apple_Cedar_apple_rust",
    "Apple_healthy",
    "Blueberry_healthy",
    "Cherry_healthy",
    "Cherry_Powdery_mildew",
    "Corn_Cercospora_leaf_spot Gray_leaf_spot",
    "Corn_Common_rust",
    "Corn_healthy",
    "Corn_Northern_Leaf_Blight",
    "Grape_Black_rot",
    "Grape_Esca(Black_Measles)",
    "Grape__healthy",
    "Grape_Leaf_blight(Isariopsis_Leaf_Spot)",
    "Orange__Haunglongbing(Citrus_greening)",
    "Peach__Bacterial_spot",
    "Peach_healthy",
    "Pepper,_bell_Bacterial_spot",
    "Pepper,_bell_healthy",
    "Potato_Early_blight",
    "Potato_healthy",
    "Potato_Late_blight",
    "Raspberry_healthy",
    "Soybean_healthy",
    "Squash_Powdery_mildew",
    "Strawberry_healthy",
    "Strawberry_Leaf_scorch",
    "Tomato_Bacterial_spot",
    "Tomato_Early_blight",
    "Tomato_healthy",
    "Tomato_Late_blight",
    "Tomato_Leaf_Mold",
    "Tomato_Septoria_leaf_spot",
    "Tomato_Spider_mites Two-spotted_spider_mite",
    "Tomato_Target_Spot",
    "Tomato_Tomato_mosaic_virus",
    "Tomato__Tomato_Yellow_Leaf_Curl_Virus",
];

pub fn label_for_index(index: usize) -> Option<&'static str> {
    CLASS_NAMES.get(index).copied()
}
