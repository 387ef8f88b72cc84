//! The DE/DA integration workflow, end to end.
//!
//! DE genes are tagged as the original population, non-DE genes are
//! bootstrapped into a background of the same size, both are turned into TSS
//! windows (trimmed at sequence starts) and joined against the DA peaks. The joined rows are summarized per
//! gene and swept over thresholds, and the two populations are compared.

use std::fs::create_dir_all;
use std::path::PathBuf;

use integrange_core::models::{GenomeInfo, IntervalStore, Table};
use integrange_overlaprs::{JoinOptions, left_join_overlap};
use log::info;

use crate::aggregate::{Reducer, group_reduce};
use crate::config::{InputConfig, PipelineConfig};
use crate::enrichment::enrichment;
use crate::errors::RangesResult;
use crate::resample::{ORIGIN_COLUMN, RESAMPLE_COLUMN, bootstrap_resample, tag_original, with_origin};
use crate::resize::trimmed_tss_windows;
use crate::sweep::{GENE_ID_COLUMN, PEAK_COUNT_COLUMN, threshold_table};

pub const DE_ORIGIN: &str = "de";
pub const NOT_DE_ORIGIN: &str = "not_de";
pub const DA_PADJ_COLUMN: &str = "da_padj";
pub const DA_LOG2FC_COLUMN: &str = "da_log2FC";
pub const MAX_LFC_COLUMN: &str = "max_lfc";

pub const PER_GENE_FILE: &str = "per_gene.tsv";
pub const SWEEP_FILE: &str = "threshold_sweep.tsv";
pub const ENRICHMENT_FILE: &str = "enrichment.tsv";

/// Tables produced by [run_pipeline].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutputs {
    pub per_gene: Table,
    pub sweep: Table,
    pub enrichment: Table,
}

fn read_input(input: &InputConfig, genome: &GenomeInfo) -> RangesResult<IntervalStore> {
    Ok(IntervalStore::from_tsv(
        &input.path,
        genome.clone(),
        input.schema()?,
    )?)
}

///
/// Per-gene peak summary: for every `(gene_id, origin)`, the number of joined
/// peaks and the largest absolute DA fold change, averaged over resamples.
///
pub fn per_gene_summary(joined: &IntervalStore) -> RangesResult<Table> {
    group_reduce(
        joined,
        &[GENE_ID_COLUMN, ORIGIN_COLUMN],
        &[
            Reducer::CountNonMissing(DA_PADJ_COLUMN.to_string()).named(PEAK_COUNT_COLUMN),
            Reducer::MaxAbs(DA_LOG2FC_COLUMN.to_string()).named(MAX_LFC_COLUMN),
        ],
        Some(RESAMPLE_COLUMN),
    )
}

///
/// Build the tagged gene windows and join them against the peaks.
///
pub fn join_populations(
    de: &IntervalStore,
    not_de: &IntervalStore,
    peaks: &IntervalStore,
    config: &PipelineConfig,
) -> RangesResult<IntervalStore> {
    let sample_size = config.bootstrap.sample_size.unwrap_or(de.len());

    let target = with_origin(&tag_original(de)?, DE_ORIGIN)?;
    let background = bootstrap_resample(
        not_de,
        sample_size,
        config.bootstrap.replicates,
        config.bootstrap.seed,
    )?;
    let background = with_origin(&background, NOT_DE_ORIGIN)?;

    let genes = target.concat(&background)?;
    let windows = trimmed_tss_windows(&genes, config.window)?;
    info!(
        "Built {} TSS windows of {} bp",
        windows.len(),
        config.window
    );

    Ok(left_join_overlap(&windows, peaks, &JoinOptions::default())?)
}

///
/// Run the workflow described by `config` and write its three tables into
/// `config.output_dir`.
///
pub fn run_pipeline(config: &PipelineConfig) -> RangesResult<PipelineOutputs> {
    config.validate()?;
    let genome = GenomeInfo::from(&config.genome);

    let de = read_input(&config.inputs.de_genes, &genome)?;
    let not_de = read_input(&config.inputs.not_de_genes, &genome)?;
    let peaks = read_input(&config.inputs.da_peaks, &genome)?;
    info!(
        "Loaded {} DE genes, {} non-DE genes and {} DA peaks",
        de.len(),
        not_de.len(),
        peaks.len()
    );

    let joined = join_populations(&de, &not_de, &peaks, config)?;
    info!("Joined gene windows into {} rows", joined.len());

    let per_gene = per_gene_summary(&joined)?;
    let thresholds = config.sweep.thresholds.values();
    let sweep = threshold_table(&joined, &config.sweep.value_column, &thresholds)?;
    let enrichment = enrichment(&sweep, DE_ORIGIN, NOT_DE_ORIGIN)?;
    info!("Swept {} thresholds", thresholds.len());

    create_dir_all(&config.output_dir)?;
    let out = |name: &str| -> PathBuf { config.output_dir.join(name) };
    per_gene.to_tsv(out(PER_GENE_FILE))?;
    sweep.to_tsv(out(SWEEP_FILE))?;
    enrichment.to_tsv(out(ENRICHMENT_FILE))?;
    info!("Wrote results to {}", config.output_dir.display());

    Ok(PipelineOutputs {
        per_gene,
        sweep,
        enrichment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        BootstrapConfig, GenomeConfig, InputsConfig, SweepConfig, Thresholds,
    };
    use integrange_core::models::{SeqnameStyle, Value};
    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::fs;
    use std::path::Path;

    const GENE_SCHEMA: &str = "gene_id:str,de_log2FC:float,de_padj:float";
    const PEAK_SCHEMA: &str = "peak_id:str,da_log2FC:float,da_padj:float";

    const DE_TSV: &str = "seqnames\tstart\tend\tstrand\tgene_id\tde_log2FC\tde_padj
chr1\t1000\t5000\t+\tG1\t2.0\t0.001
chr1\t20000\t30000\t-\tG2\t-3.0\t0.002
";

    const NOT_DE_TSV: &str = "seqnames\tstart\tend\tstrand\tgene_id\tde_log2FC\tde_padj
chr1\t50000\t60000\t+\tN1\t0.1\t0.9
chr1\t70000\t80000\t+\tN2\t0.2\t0.8
chr1\t90000\t99000\t-\tN3\t-0.1\t0.7
";

    // one peak at the G1 TSS, one at the N1 TSS
    const PEAKS_TSV: &str = "seqnames\tstart\tend\tstrand\tpeak_id\tda_log2FC\tda_padj
chr1\t900\t1100\t*\tP1\t1.5\t0.001
chr1\t49900\t50100\t*\tP2\t0.5\t0.01
";

    fn write_inputs(dir: &Path) -> PipelineConfig {
        let input = |name: &str, body: &str, schema: &str| {
            let path = dir.join(name);
            fs::write(&path, body).unwrap();
            crate::config::InputConfig {
                path,
                schema: schema.to_string(),
            }
        };
        PipelineConfig {
            window: 1000,
            output_dir: dir.join("out"),
            genome: GenomeConfig {
                build: "GRCh38".to_string(),
                style: SeqnameStyle::Ucsc,
            },
            inputs: InputsConfig {
                de_genes: input("de.tsv", DE_TSV, GENE_SCHEMA),
                not_de_genes: input("not_de.tsv", NOT_DE_TSV, GENE_SCHEMA),
                da_peaks: input("peaks.tsv", PEAKS_TSV, PEAK_SCHEMA),
            },
            bootstrap: BootstrapConfig {
                replicates: 3,
                seed: 7,
                sample_size: Some(3),
            },
            sweep: SweepConfig {
                value_column: DA_LOG2FC_COLUMN.to_string(),
                thresholds: Thresholds::List(vec![0.0, 1.0, 2.0]),
            },
        }
    }

    fn rows_for<'a>(table: &'a Table, gene: &str) -> Vec<&'a Vec<Option<Value>>> {
        let idx = table.schema().index_of(GENE_ID_COLUMN).unwrap();
        table
            .rows()
            .iter()
            .filter(|r| r[idx] == Some(Value::from(gene)))
            .collect()
    }

    #[rstest]
    fn test_per_gene_counts_peaks_near_tss() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(dir.path());
        let outputs = run_pipeline(&config).unwrap();

        let schema = outputs.per_gene.schema();
        let count = schema.index_of(PEAK_COUNT_COLUMN).unwrap();
        let max_lfc = schema.index_of(MAX_LFC_COLUMN).unwrap();

        let g1 = rows_for(&outputs.per_gene, "G1");
        assert_eq!(g1.len(), 1);
        assert_eq!(g1[0][count], Some(Value::Float(1.0)));
        assert_eq!(g1[0][max_lfc], Some(Value::Float(1.5)));

        let g2 = rows_for(&outputs.per_gene, "G2");
        assert_eq!(g2[0][count], Some(Value::Float(0.0)));
        assert_eq!(g2[0][max_lfc], None);

        // every non-DE gene is drawn in each replicate
        let n1 = rows_for(&outputs.per_gene, "N1");
        assert_eq!(n1[0][count], Some(Value::Float(1.0)));
    }

    #[rstest]
    fn test_enrichment_against_background() {
        let dir = tempfile::tempdir().unwrap();
        let config = write_inputs(dir.path());
        let outputs = run_pipeline(&config).unwrap();

        // threshold 0: de has 1 gene and 1 peak, not_de has 1 of each per replicate
        let first = &outputs.enrichment.rows()[0];
        assert_eq!(first[1], Some(Value::Float(1.0)));
        assert_eq!(first[2], Some(Value::Float(1.0)));
        // threshold 1: only the DE peak survives
        let second = &outputs.enrichment.rows()[1];
        assert_eq!(second[1], Some(Value::Float(f64::INFINITY)));
        // threshold 2: nothing survives
        let third = &outputs.enrichment.rows()[2];
        assert_eq!(third[1], Some(Value::Float(f64::NAN)));

        for name in [PER_GENE_FILE, SWEEP_FILE, ENRICHMENT_FILE] {
            assert!(config.output_dir.join(name).exists());
        }
        let written = fs::read_to_string(config.output_dir.join(ENRICHMENT_FILE)).unwrap();
        assert!(written.starts_with("threshold\tgene_enrichment\tpeak_enrichment\n0\t1\t1\n"));
    }

    #[rstest]
    fn test_gene_at_sequence_start_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_inputs(dir.path());
        config.window = 2000;
        fs::write(
            &config.inputs.de_genes.path,
            format!("{}chrM\t1\t68\t+\tMT1\t1.0\t0.01\n", DE_TSV),
        )
        .unwrap();

        let outputs = run_pipeline(&config).unwrap();
        let count = outputs.per_gene.schema().index_of(PEAK_COUNT_COLUMN).unwrap();
        let mt = rows_for(&outputs.per_gene, "MT1");
        assert_eq!(mt.len(), 1);
        assert_eq!(mt[0][count], Some(Value::Float(0.0)));
        assert!(config.output_dir.join(ENRICHMENT_FILE).exists());
    }

    #[rstest]
    fn test_background_too_small() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = write_inputs(dir.path());
        config.bootstrap.sample_size = Some(10);
        assert!(matches!(
            run_pipeline(&config),
            Err(crate::errors::RangesError::SampleSize { .. })
        ));
    }
}
