use serde::Serialize;
use xml_fragment_core::Element;

use crate::records::SystemInfo;
use crate::session::ManagementMode;

/// Detected management mode with provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModeDetection {
    pub mode: ManagementMode,
    pub source: String,
    pub confidence: String,
}

/// `<show><system><info/></system></show>`
pub fn system_info_command() -> Element {
    Element::new("show").with_child(Element::new("system").with_child(Element::new("info")))
}

/// `<show><panorama-status/></show>`
pub fn panorama_status_command() -> Element {
    Element::new("show").with_child(Element::new("panorama-status"))
}

/// Classify the device from its system info.
pub fn detect_mode(info: &SystemInfo) -> ModeDetection {
    if info.model.trim().eq_ignore_ascii_case("panorama") {
        return ModeDetection {
            mode: ManagementMode::CentralizedManager,
            source: "system.model".to_string(),
            confidence: "high".to_string(),
        };
    }

    if info.model.trim().is_empty() {
        return ModeDetection {
            mode: ManagementMode::Standalone,
            source: "not found".to_string(),
            confidence: "low".to_string(),
        };
    }

    ModeDetection {
        mode: ManagementMode::Standalone,
        source: "system.model".to_string(),
        confidence: "high".to_string(),
    }
}

/// Whether `show panorama-status` output reports an active connection.
///
/// The output is free text, one `Key : value` pair per line.
pub fn peer_connected(status_text: &str) -> bool {
    status_text.lines().any(|line| {
        line.split_once(':').is_some_and(|(key, value)| {
            key.trim().eq_ignore_ascii_case("connected") && value.trim().eq_ignore_ascii_case("yes")
        })
    })
}
