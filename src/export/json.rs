//! JSON export implementation.
//!
//! Exports dependency statistics as pretty-printed JSON.

use super::{ExportStatistics, Exporter};
use serde::Serialize;
use std::io::{self, Write};

/// JSON exporter implementation.
pub struct JsonExporter;

/// Dependency counts for JSON output.
#[derive(Serialize)]
struct JsonDependencies {
    direct: usize,
    indirect: usize,
    total: usize,
}

/// Status counts for JSON output.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonDependencyStatus {
    latest: usize,
    patch_available: usize,
    minor_available: usize,
    major_available: usize,
    abandoned: usize,
}

/// Root JSON export structure.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonExport {
    dependencies: JsonDependencies,
    dependency_status: JsonDependencyStatus,
}

impl Exporter for JsonExporter {
    fn export(&self, stats: &ExportStatistics, writer: &mut dyn Write) -> io::Result<()> {
        let deps = &stats.dependencies;
        let status = &stats.dependency_status;

        let export = JsonExport {
            dependencies: JsonDependencies {
                direct: deps.direct,
                indirect: deps.indirect,
                total: deps.total,
            },
            dependency_status: JsonDependencyStatus {
                latest: status.latest,
                patch_available: status.patch_available,
                minor_available: status.minor_available,
                major_available: status.major_available,
                abandoned: status.abandoned,
            },
        };

        let json = serde_json::to_string_pretty(&export)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        writeln!(writer, "{}", json)
    }
}
