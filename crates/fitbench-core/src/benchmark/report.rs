use super::error::BenchmarkError;
use super::stats::Statistics;
use csv::{Terminator, WriterBuilder};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub const STATISTICS_COLUMNS: [&str; 6] = ["min", "max", "mean", "stdev", "ci95_min", "ci95_max"];

/// The sweep class a report belongs to. Each class has a fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportClass {
    SingleMotif,
    MotifBySize,
    MotifByExtent,
    EnvironmentFiltering,
}

impl ReportClass {
    pub const ALL: [ReportClass; 4] = [
        ReportClass::SingleMotif,
        ReportClass::MotifBySize,
        ReportClass::MotifByExtent,
        ReportClass::EnvironmentFiltering,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReportClass::SingleMotif => "single-motif",
            ReportClass::MotifBySize => "motif-by-size",
            ReportClass::MotifByExtent => "motif-by-extent",
            ReportClass::EnvironmentFiltering => "environment-filtering",
        }
    }

    /// Columns describing the configuration point, before the statistics columns.
    ///
    /// Both binned classes name their bin column `extent`.
    pub fn point_columns(self) -> &'static [&'static str] {
        match self {
            ReportClass::SingleMotif => &["parsing", "dataset_size"],
            ReportClass::MotifBySize | ReportClass::MotifByExtent => &["extent"],
            ReportClass::EnvironmentFiltering => &[
                "enumeration",
                "environment_filtering",
                "match_count",
                "size",
                "extent",
                "label_count",
            ],
        }
    }

    pub fn header(self) -> Vec<&'static str> {
        self.point_columns()
            .iter()
            .chain(STATISTICS_COLUMNS.iter())
            .copied()
            .collect()
    }

    pub fn default_file_name(self) -> &'static str {
        match self {
            ReportClass::SingleMotif => "results_single_motif.csv",
            ReportClass::MotifBySize => "results_size.csv",
            ReportClass::MotifByExtent => "results_extent.csv",
            ReportClass::EnvironmentFiltering => "results_environment_filtering.csv",
        }
    }
}

/// Locale-independent shortest round-trip rendering (`3.0`, `0.1`, `1e-7`).
pub fn format_number(value: f64) -> String {
    format!("{:?}", value)
}

/// One rendered report line: point fields followed by the statistics fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    fields: Vec<String>,
}

impl ReportRow {
    pub fn new(point_fields: Vec<String>, statistics: &Statistics) -> Self {
        let mut fields = point_fields;
        fields.extend(
            [
                statistics.min,
                statistics.max,
                statistics.mean,
                statistics.stdev,
                statistics.ci_lower,
                statistics.ci_upper,
            ]
            .into_iter()
            .map(format_number),
        );
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }
}

pub struct ReportWriter {
    class: ReportClass,
}

impl ReportWriter {
    pub fn new(class: ReportClass) -> Self {
        Self { class }
    }

    pub fn class(&self) -> ReportClass {
        self.class
    }

    /// Renders the header and all rows. Fails without output if any row does not match
    /// the header width.
    pub fn render(&self, rows: &[ReportRow]) -> Result<Vec<u8>, BenchmarkError> {
        let header = self.class.header();
        if let Some(row) = rows.iter().find(|row| row.fields.len() != header.len()) {
            return Err(BenchmarkError::RowShape {
                expected: header.len(),
                found: row.fields.len(),
            });
        }

        let mut writer = WriterBuilder::new()
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());
        writer.write_record(&header)?;
        for row in rows {
            writer.write_record(&row.fields)?;
        }
        writer
            .into_inner()
            .map_err(|e| BenchmarkError::Csv(csv::Error::from(e.into_error())))
    }

    /// Writes the complete report to `path` in one atomic replace.
    pub fn write(&self, rows: &[ReportRow], path: &Path) -> Result<(), BenchmarkError> {
        let content = self.render(rows)?;
        let report_error = |source| BenchmarkError::Report {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(parent).map_err(report_error)?;
        let mut temp = tempfile::NamedTempFile::new_in(parent).map_err(report_error)?;
        temp.write_all(&content).map_err(report_error)?;
        temp.as_file().sync_all().map_err(report_error)?;
        temp.persist(path).map_err(|e| report_error(e.error))?;

        info!(
            report = self.class.name(),
            path = %path.display(),
            rows = rows.len(),
            "Wrote benchmark report."
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(samples: &[f64]) -> Statistics {
        Statistics::from_samples(samples).unwrap()
    }

    #[test]
    fn headers_match_report_contracts() {
        assert_eq!(
            ReportClass::EnvironmentFiltering.header().join(","),
            "enumeration,environment_filtering,match_count,size,extent,label_count,min,max,mean,stdev,ci95_min,ci95_max"
        );
        assert_eq!(
            ReportClass::MotifBySize.header().join(","),
            "extent,min,max,mean,stdev,ci95_min,ci95_max"
        );
        assert_eq!(
            ReportClass::MotifByExtent.header().join(","),
            "extent,min,max,mean,stdev,ci95_min,ci95_max"
        );
        assert_eq!(
            ReportClass::SingleMotif.header().join(","),
            "parsing,dataset_size,min,max,mean,stdev,ci95_min,ci95_max"
        );
    }

    #[test]
    fn format_number_keeps_full_precision() {
        assert_eq!(format_number(3.0), "3.0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(1234.5), "1234.5");
    }

    #[test]
    fn render_starts_with_header_and_keeps_row_order() {
        let rows = vec![
            ReportRow::new(vec!["7".into()], &stats(&[2.0, 2.0])),
            ReportRow::new(vec!["5".into()], &stats(&[1.0])),
        ];
        let rendered = ReportWriter::new(ReportClass::MotifByExtent)
            .render(&rows)
            .unwrap();
        let text = String::from_utf8(rendered).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "extent,min,max,mean,stdev,ci95_min,ci95_max");
        assert_eq!(lines[1], "7,2.0,2.0,2.0,0.0,2.0,2.0");
        assert_eq!(lines[2], "5,1.0,1.0,1.0,0.0,1.0,1.0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn render_keeps_empty_match_count_field() {
        let row = ReportRow::new(
            vec![
                "1".into(),
                "true".into(),
                String::new(),
                "2".into(),
                "3.0".into(),
                "2".into(),
            ],
            &stats(&[4.0]),
        );
        let text = String::from_utf8(
            ReportWriter::new(ReportClass::EnvironmentFiltering)
                .render(&[row])
                .unwrap(),
        )
        .unwrap();
        assert_eq!(text.lines().nth(1), Some("1,true,,2,3.0,2,4.0,4.0,4.0,0.0,4.0,4.0"));
    }

    #[test]
    fn render_rejects_rows_of_wrong_width() {
        let row = ReportRow::new(vec!["PDB".into()], &stats(&[1.0]));
        let result = ReportWriter::new(ReportClass::SingleMotif).render(&[row]);
        assert!(matches!(
            result,
            Err(BenchmarkError::RowShape {
                expected: 8,
                found: 7
            })
        ));
    }

    #[test]
    fn write_replaces_file_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/results_size.csv");
        let writer = ReportWriter::new(ReportClass::MotifBySize);

        writer
            .write(&[ReportRow::new(vec!["2".into()], &stats(&[1.0]))], &path)
            .unwrap();
        writer.write(&[], &path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "extent,min,max,mean,stdev,ci95_min,ci95_max\n");
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn write_leaves_no_file_when_rows_are_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results_extent.csv");
        let bad = ReportRow::new(vec!["1".into(), "2".into()], &stats(&[1.0]));
        let result = ReportWriter::new(ReportClass::MotifByExtent).write(&[bad], &path);
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
