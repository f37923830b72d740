use serde::{Deserialize, Serialize};

use crate::invoice::StoreLocation;

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub store: StoreSettings,
    pub pdf: PdfSettings,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StoreSettings {
    /// Brand printed in the invoice title and footer
    pub brand: String,
    #[serde(default = "default_location")]
    pub default_location: StoreLocation,
}

fn default_location() -> StoreLocation {
    StoreLocation::Ny
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}
