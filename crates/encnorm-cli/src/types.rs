use std::path::PathBuf;

use encnorm_model::RunReport;

use crate::cli::OutputFormatArg;

/// Result of one `normalize` invocation.
#[derive(Debug)]
pub struct NormalizeResult {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub report: RunReport,
    /// Files written; empty on a dry run.
    pub outputs: Vec<PathBuf>,
    pub dry_run: bool,
}

impl NormalizeResult {
    pub fn has_issues(&self) -> bool {
        self.report.has_issues()
    }
}

/// Which writers an output format selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputSelection {
    pub csv: bool,
    pub json: bool,
}

impl From<OutputFormatArg> for OutputSelection {
    fn from(format: OutputFormatArg) -> Self {
        match format {
            OutputFormatArg::Csv => Self {
                csv: true,
                json: false,
            },
            OutputFormatArg::Json => Self {
                csv: false,
                json: true,
            },
            OutputFormatArg::Both => Self {
                csv: true,
                json: true,
            },
        }
    }
}
