//! GPX output formatter

use crate::error::Result;
use crate::format::{OutputFormatter, SearchResponse};

/// GPX formatter - outputs GPX waypoint file
pub struct GpxFormatter;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

impl OutputFormatter for GpxFormatter {
    fn name(&self) -> &str {
        "gpx"
    }

    fn description(&self) -> &str {
        "GPX waypoint file"
    }

    fn format(&self, response: &SearchResponse) -> Result<String> {
        let mut gpx = String::new();

        // XML header
        gpx.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        gpx.push('\n');
        gpx.push_str(r#"<gpx version="1.1" creator="vagas-plus">"#);
        gpx.push('\n');

        // Metadata
        gpx.push_str("  <metadata>\n");
        gpx.push_str("    <name>Vagas+ accessible parking</name>\n");
        gpx.push_str(&format!("    <time>{}</time>\n", response.timestamp.to_rfc3339()));
        gpx.push_str("  </metadata>\n");

        // Reference waypoint
        if let Some(reference) = response.reference {
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                reference.lat, reference.lng
            ));
            gpx.push('\n');
            gpx.push_str("    <name>Search origin</name>\n");
            gpx.push_str(&format!(
                "    <desc>Search radius: {} km</desc>\n",
                response.radii.search_km
            ));
            gpx.push_str("  </wpt>\n");
        }

        // Spot waypoints
        for entry in &response.spots {
            let spot = &entry.spot;
            gpx.push_str(&format!(
                r#"  <wpt lat="{}" lon="{}">"#,
                spot.coords.lat, spot.coords.lng
            ));
            gpx.push('\n');
            gpx.push_str(&format!("    <name>{}</name>\n", escape(&spot.name)));
            gpx.push_str(&format!(
                "    <desc>{} ({}/{} free)</desc>\n",
                escape(&spot.address),
                spot.availability.available(),
                spot.availability.total()
            ));
            let symbol = if entry.nearby { "Parking Area" } else { "Flag" };
            gpx.push_str(&format!("    <sym>{}</sym>\n", symbol));
            gpx.push_str("  </wpt>\n");
        }

        gpx.push_str("</gpx>\n");
        Ok(gpx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::sample_response;

    #[test]
    fn test_gpx_format() {
        let output = GpxFormatter.format(&sample_response()).unwrap();

        // Verify GPX structure
        assert!(output.contains(r#"<?xml version="1.0""#));
        assert!(output.contains(r#"<gpx version="1.1""#));
        assert!(output.contains("<name>Search origin</name>"));
        assert_eq!(output.matches("<wpt").count(), 3);
        assert!(output.contains("</gpx>"));
    }

    #[test]
    fn test_gpx_escapes_markup() {
        let output = GpxFormatter.format(&sample_response()).unwrap();

        assert!(output.contains("Hospital &amp; Clínica"));
        assert!(output.contains("Rua &lt;Conde&gt; de Bonfim"));
        assert!(!output.contains("<Conde>"));
    }

    #[test]
    fn test_gpx_formatter_info() {
        let formatter = GpxFormatter;
        assert_eq!(formatter.name(), "gpx");
        assert!(!formatter.description().is_empty());
    }
}
