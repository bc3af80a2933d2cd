//! The web application manifest document written alongside the icons.

use serde::Serialize;

/// Purpose string applied to every icon when the maskable flag is set.
const MASKABLE_PURPOSE: &str = "any maskable";

/// A `site.webmanifest` document.
#[derive(Clone, Debug, Serialize)]
pub struct WebManifest {
    /// Application name.
    pub name: String,
    /// Short application name; falls back to `name` when not given.
    pub short_name: String,
    /// The icons advertised to the browser.
    pub icons: Vec<ManifestIcon>,
    /// Theme color, as a `#rrggbb` hex string.
    pub theme_color: String,
    /// Background color; same as the theme color.
    pub background_color: String,
    /// Display mode; always `"standalone"`.
    pub display: String,
    /// Start URL; defaults to `"/"`.
    pub start_url: String,
}

/// One icon record inside the manifest.
#[derive(Clone, Debug, Serialize)]
pub struct ManifestIcon {
    /// Absolute path of the icon file, e.g. `/android-chrome-192x192.png`.
    pub src: String,
    /// Dimensions string, e.g. `192x192`.
    pub sizes: String,
    /// MIME type.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// Set to `"any maskable"` for maskable icons, omitted otherwise.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

impl WebManifest {
    /// Assembles a manifest for the given PNG icon sizes.
    pub fn new(
        name: &str,
        short_name: Option<&str>,
        theme_color: &str,
        start_url: Option<&str>,
        maskable: bool,
        icon_sizes: &[(String, u32)],
    ) -> WebManifest {
        let icons = icon_sizes
            .iter()
            .map(|(file_name, size)| ManifestIcon {
                src: format!("/{}", file_name),
                sizes: format!("{}x{}", size, size),
                mime_type: "image/png".to_string(),
                purpose: maskable.then(|| MASKABLE_PURPOSE.to_string()),
            })
            .collect();
        WebManifest {
            name: name.to_string(),
            short_name: short_name.unwrap_or(name).to_string(),
            icons,
            theme_color: theme_color.to_string(),
            background_color: theme_color.to_string(),
            display: "standalone".to_string(),
            start_url: start_url.unwrap_or("/").to_string(),
        }
    }

    /// Serializes the manifest to JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
