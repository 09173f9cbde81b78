use crate::error::CliError;
use model::geo::{LatLon, Path, parse_centered};
use serde::Serialize;

/// Path between two locators, as printed by `locate`.
#[derive(Debug, Serialize)]
pub struct LocateReport {
    pub from: String,
    pub to: String,
    pub from_position: LatLon,
    pub to_position: LatLon,
    #[serde(flatten)]
    pub path: Path,
}

impl LocateReport {
    pub fn new(from: &str, to: &str) -> Result<Self, CliError> {
        let from_position = parse_centered(from)?;
        let to_position = parse_centered(to)?;

        Ok(Self {
            from: from.to_uppercase(),
            to: to.to_uppercase(),
            from_position,
            to_position,
            path: Path::between(from_position, to_position),
        })
    }
}

pub fn print_locate(report: &LocateReport, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("{:<16} {}", "From", report.from);
    println!(
        "{:<16} {:.4}, {:.4}",
        "", report.from_position.lat, report.from_position.lon
    );
    println!("{:<16} {}", "To", report.to);
    println!(
        "{:<16} {:.4}, {:.4}",
        "", report.to_position.lat, report.to_position.lon
    );
    println!("{:<16} {} km", "Distance", report.path.distance_km);
    println!("{:<16} {}°", "Azimuth", report.path.azimuth);
    println!("{:<16} {}°", "Reverse azimuth", report.path.rx_azimuth);
    Ok(())
}
