use fitbench::benchmark::inputs::DEFAULT_PDB_ROOT;

pub struct DefaultsConfig {
    pub curated_output: &'static str,
    pub report_output: &'static str,
    pub data_root: &'static str,
    /// Relative to the data root.
    pub curated_subdirectory: &'static str,
    /// Relative to the data root.
    pub single_motif_query: &'static str,
    pub pdb_root: &'static str,
    pub search_args: &'static [&'static str],
    pub environment_args: &'static [&'static str],
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            curated_output: "structural_motifs",
            report_output: ".",
            data_root: "data",
            curated_subdirectory: "structural_motifs",
            single_motif_query: "structural_motifs/motif_KDEEH.pdb",
            pdb_root: DEFAULT_PDB_ROOT,
            search_args: &[
                "--query",
                "{query}",
                "--chain-list",
                "{chain-list}",
                "--source",
                "{source}",
                "--pdb-root",
                "{pdb-root}",
                "--atom-filter",
                "{atom-filter}",
                "--exchanges={exchanges}",
                "--threads",
                "{threads}",
            ],
            environment_args: &["--environment-radius", "{radius}"],
        }
    }
}
