//! Frame metadata: the `fc:frame` embed, the host manifest and the landing
//! page carrying them.

use serde::Serialize;

use crate::config::FrameConfig;

pub const FRAME_VERSION: &str = "1";
pub const LAUNCH_ACTION: &str = "launch_frame";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameAction {
    #[serde(rename = "type")]
    pub action_type: String,
    pub url: String,
    pub name: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameButton {
    pub title: String,
    pub action: FrameAction,
}

/// Content of the `fc:frame` meta tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameEmbed {
    pub version: String,
    pub image_url: String,
    pub button: FrameButton,
}

impl FrameEmbed {
    pub fn from_config(config: &FrameConfig) -> Self {
        let base = base_url(config);
        Self {
            version: FRAME_VERSION.to_string(),
            image_url: format!("{}/preview.png", base),
            button: FrameButton {
                title: config.button_title.clone(),
                action: FrameAction {
                    action_type: LAUNCH_ACTION.to_string(),
                    url: base.to_string(),
                    name: config.name.clone(),
                    splash_image_url: format!("{}/splash.png", base),
                    splash_background_color: config.splash_background_color.clone(),
                },
            },
        }
    }

    /// JSON string placed in the meta tag.
    pub fn to_meta_content(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `frame` section of `farcaster.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameManifestEntry {
    pub version: String,
    pub name: String,
    pub icon_url: String,
    pub home_url: String,
    pub image_url: String,
    pub button_title: String,
    pub splash_image_url: String,
    pub splash_background_color: String,
    pub webhook_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameManifest {
    pub frame: FrameManifestEntry,
}

impl FrameManifest {
    pub fn from_config(config: &FrameConfig) -> Self {
        let base = base_url(config);
        Self {
            frame: FrameManifestEntry {
                version: FRAME_VERSION.to_string(),
                name: config.name.clone(),
                icon_url: format!("{}/icon.png", base),
                home_url: base.to_string(),
                image_url: format!("{}/image.png", base),
                button_title: config.button_title.clone(),
                splash_image_url: format!("{}/splash.png", base),
                splash_background_color: config.splash_background_color.clone(),
                webhook_url: format!("{}/api/webhook", base),
            },
        }
    }
}

fn base_url(config: &FrameConfig) -> &str {
    config.app_url.trim_end_matches('/')
}

/// Escape text for HTML attribute and element content.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Landing page with Open Graph and `fc:frame` metadata.
pub fn render_page(config: &FrameConfig) -> Result<String, serde_json::Error> {
    let embed = FrameEmbed::from_config(config).to_meta_content()?;
    let base = base_url(config);
    let name = escape_html(&config.name);
    let description = escape_html(&config.description);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{name} - Instant Crypto Payments on Base</title>
<meta name="description" content="{description}">
<meta property="og:title" content="{name} - Instant Crypto Payments">
<meta property="og:description" content="QR code payments on Base blockchain">
<meta property="og:image" content="{image}">
<meta name="fc:frame" content="{embed}">
</head>
<body>
<h1>{name}</h1>
<p>{description}</p>
</body>
</html>
"#,
        image = escape_html(&format!("{}/image.png", base)),
        embed = escape_html(&embed),
    ))
}
