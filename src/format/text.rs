//! Human-readable text output formatter

use crate::error::Result;
use crate::format::{OutputFormatter, SearchResponse, SpotEntry};

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

fn audience_label(entry: &SpotEntry) -> String {
    let audience = entry.spot.audience;
    let labels: Vec<&str> = [
        (audience.pregnant, "pregnant"),
        (audience.elderly, "elderly"),
        (audience.disabled, "disabled"),
    ]
    .iter()
    .filter(|(set, _)| *set)
    .map(|(_, label)| *label)
    .collect();

    if labels.is_empty() {
        String::new()
    } else {
        format!(" [{}]", labels.join(", "))
    }
}

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, response: &SearchResponse) -> Result<String> {
        let mut output = String::new();

        // Header
        match response.reference {
            Some(reference) => output.push_str(&format!(
                "Spots within {} km of ({:.6}, {:.6})\n",
                response.radii.search_km, reference.lat, reference.lng
            )),
            None if response.query.is_empty() => output.push_str("All spots\n"),
            None => output.push_str(&format!("Spots matching \"{}\"\n", response.query)),
        }
        if let Some(failure) = &response.failure {
            output.push_str(&format!("Location: {}\n", failure));
        }
        output.push('\n');

        if response.spots.is_empty() {
            output.push_str("No spots found.\n");
            return Ok(output);
        }

        for entry in &response.spots {
            let marker = if entry.nearby { '*' } else { ' ' };
            let spot = &entry.spot;
            output.push_str(&format!("{} {}{}\n", marker, spot.name, audience_label(entry)));
            output.push_str(&format!("    {}\n", spot.address));

            let mut line = format!(
                "    {}/{} free",
                spot.availability.available(),
                spot.availability.total()
            );
            if let Some(d) = entry.distance_km {
                line.push_str(&format!(", {:.2} km", d));
            }
            if let Some(report) = &spot.latest_report {
                line.push_str(&format!(
                    ", reported {} free {} min ago",
                    report.available, report.minutes_ago
                ));
            }
            output.push_str(&line);
            output.push('\n');
        }

        output.push_str(&format!("\n{} spot(s)\n", response.spots.len()));
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::tests::sample_response;
    use crate::geo::{GeolocationError, ResolverFailure};

    #[test]
    fn test_text_format() {
        let output = TextFormatter.format(&sample_response()).unwrap();

        assert!(output.contains("Spots within 3 km"));
        assert!(output.contains("* Shopping Tijuca [pregnant, disabled]"));
        assert!(output.contains("2/4 free, 0.00 km"));
        assert!(output.contains("  Hospital & Clínica"));
        assert!(output.contains("2 spot(s)"));
    }

    #[test]
    fn test_text_format_empty_with_failure() {
        let mut response = sample_response();
        response.spots.clear();
        response.reference = None;
        let response = response.with_failure(Some(ResolverFailure::Geolocation(
            GeolocationError::PermissionDenied,
        )));

        let output = TextFormatter.format(&response).unwrap();
        assert!(output.contains("All spots"));
        assert!(output.contains("Location:"));
        assert!(output.contains("No spots found."));
    }

    #[test]
    fn test_text_formatter_info() {
        let formatter = TextFormatter;
        assert_eq!(formatter.name(), "text");
        assert!(!formatter.description().is_empty());
    }
}
