//! Orchestration of the three pipelines: metabolome graph builds, genome
//! graph builds, and cross-sample comparison.

use crate::config;
use crate::plotting;
use anyhow::{Context, Result};
use clap::Args;
use dietnet_core::compare::kos::{get_kos, SampleKos};
use dietnet_core::compare::patterns::{load_graphs, subset_graphs, Pattern};
use dietnet_core::compare::similarity::SimilarityMatrix;
use dietnet_core::compare::stats::{
    fdr_correct, stat_test, PermanovaResult, DEFAULT_PERMUTATIONS, DEFAULT_SEED, FDR_ALPHA,
};
use dietnet_core::compare::cluster;
use dietnet_core::graph::edges::{build_edges, EdgeStrategy};
use dietnet_core::graph::nodes::{build_nodes, FoodLookup};
use dietnet_core::graph::summarize;
use dietnet_core::provenance::{resolve_metabolome, OriginMapper};
use dietnet_core::weights::{clean_microbe_meta, FoodIndex, KoWeights};
use dietnet_core::writer;
use dietnet_schemas::compound::Origin;
use dietnet_schemas::file_formats::ManifestRecord;
use dietnet_schemas::weights::WeightConfig;
use std::collections::{BTreeSet, HashMap};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Weighting flags shared by both build subcommands.
#[derive(Debug, Args)]
pub struct WeightArgs {
    /// Attach summed consumption frequencies to food-linked nodes
    #[arg(long)]
    pub node_weights: bool,

    /// Attach summed KO abundances to edges
    #[arg(long)]
    pub edge_weights: bool,

    /// Attach aggregated taxonomy labels to edges
    #[arg(long)]
    pub organisms: bool,

    /// Name of the abundance column in the microbe metadata CSV
    #[arg(long, default_value = config::DEFAULT_ABUNDANCE_COLUMN)]
    pub abundance_column: String,
}

impl WeightArgs {
    fn config(&self) -> WeightConfig {
        WeightConfig {
            frequency: self.node_weights,
            abundance: self.edge_weights,
            organisms: self.organisms,
        }
    }

    fn abundance_header(&self) -> &str {
        if self.abundance_column == config::DEFAULT_ABUNDANCE_COLUMN {
            writer::ABUNDANCE_RPKS_HEADER
        } else {
            "abundance"
        }
    }
}

/// Build a graph from metabolome predictions: direct microbial and food
/// compound lists.
#[derive(Debug, Args)]
pub struct MetabolomeArgs {
    /// Compound catalog JSON from the external predictor (microbial compounds)
    #[arg(long)]
    pub microbe_compounds: PathBuf,

    /// Food compound metadata CSV
    #[arg(long)]
    pub food_compounds: PathBuf,

    /// Reaction catalog JSON from the external predictor
    #[arg(long)]
    pub reactions: PathBuf,

    /// CSV of KO, taxonomy, and abundance observations
    #[arg(long)]
    pub microbe_meta: PathBuf,

    #[command(flatten)]
    pub weights: WeightArgs,

    /// Output path for the node CSV
    #[arg(long)]
    pub nodes_out: PathBuf,

    /// Output path for the edge CSV
    #[arg(long)]
    pub edges_out: PathBuf,
}

/// Build a graph from whole-genome predictions via the origin mapper.
#[derive(Debug, Args)]
pub struct GenomeArgs {
    /// Food KO metadata CSV
    #[arg(long)]
    pub food_meta: PathBuf,

    /// CSV of KO, taxonomy, and abundance observations
    #[arg(long)]
    pub microbe_meta: PathBuf,

    /// Origin mapper TSV from the external predictor
    #[arg(long)]
    pub mapper: PathBuf,

    /// Compound catalog JSON from the external predictor
    #[arg(long)]
    pub compounds: PathBuf,

    /// Reaction catalog JSON from the external predictor
    #[arg(long)]
    pub reactions: PathBuf,

    #[command(flatten)]
    pub weights: WeightArgs,

    /// Output path for the node CSV
    #[arg(long)]
    pub nodes_out: PathBuf,

    /// Output path for the edge CSV
    #[arg(long)]
    pub edges_out: PathBuf,
}

/// Compare graphs across samples using KO sets and Jaccard similarity.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Metadata CSV containing per-sample graph paths and names
    #[arg(short, long)]
    pub metadata: PathBuf,

    /// Name of the column containing graph CSV paths
    #[arg(short, long)]
    pub paths_col: String,

    /// Name of the column containing sample names (must be unique)
    #[arg(short, long)]
    pub names_col: String,

    /// Run PERMANOVA group-difference tests
    #[arg(short, long)]
    pub stat_test: bool,

    /// Grouping-variable columns, comma separated (e.g. cohort,diet)
    #[arg(short, long, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Name of the KO column in the graph CSVs
    #[arg(long, default_value = "KOs")]
    pub ko_column: String,

    /// Output directory for plots and summary files
    #[arg(short, long)]
    pub output: PathBuf,
}

pub fn run_metabolome(args: &MetabolomeArgs) -> Result<()> {
    let config = args.weights.config();

    let microbe_compounds = config::load_compound_ids(&args.microbe_compounds)?;
    let food_records = config::load_food_meta(&args.food_compounds)?;
    let reactions = config::load_reaction_catalog(&args.reactions)?;
    let microbe_meta =
        config::load_microbe_meta(&args.microbe_meta, &args.weights.abundance_column)?;

    let foods = FoodIndex::new(food_records);
    let food_compounds: BTreeSet<String> = foods.ids().cloned().collect();
    let origins = resolve_metabolome(&microbe_compounds, &food_compounds);
    let universe: BTreeSet<String> = origins.keys().cloned().collect();
    info!(compounds = universe.len(), "resolved compound universe");

    let cleaned = clean_microbe_meta(microbe_meta, &config);
    let ko_weights = KoWeights::build(&cleaned, &config);

    let result = build_edges(&reactions, &universe, &ko_weights, &EdgeStrategy::Metabolome);
    let nodes = build_nodes(
        &universe,
        &origins,
        &foods,
        &FoodLookup::ByCompound,
        &config,
    )?;

    summarize(&nodes, &result.edges, reactions.len());
    writer::write_nodes(&args.nodes_out, &nodes)?;
    writer::write_edges(&args.edges_out, &result.edges, args.weights.abundance_header())?;
    info!(
        nodes = %args.nodes_out.display(),
        edges = %args.edges_out.display(),
        "metabolome graph written"
    );
    Ok(())
}

pub fn run_genome(args: &GenomeArgs) -> Result<()> {
    let config = args.weights.config();

    let mapper = OriginMapper::from_tsv(&args.mapper)?;
    info!(
        entries = mapper.len(),
        food = mapper.count_origin(Origin::Food),
        microbe = mapper.count_origin(Origin::Microbe),
        both = mapper.count_origin(Origin::Both),
        "origin mapper loaded"
    );
    let universe = config::load_compound_ids(&args.compounds)?;
    let food_records = config::load_food_meta(&args.food_meta)?;
    let reactions = config::load_reaction_catalog(&args.reactions)?;
    let microbe_meta =
        config::load_microbe_meta(&args.microbe_meta, &args.weights.abundance_column)?;

    let foods = FoodIndex::new(food_records);
    let cleaned = clean_microbe_meta(microbe_meta, &config);
    let ko_weights = KoWeights::build(&cleaned, &config);

    let result = build_edges(
        &reactions,
        &universe,
        &ko_weights,
        &EdgeStrategy::Genome { mapper: &mapper },
    );
    let nodes = build_nodes(
        &universe,
        &mapper,
        &foods,
        &FoodLookup::ByKo {
            food_linked: &result.food_linked,
        },
        &config,
    )?;

    summarize(&nodes, &result.edges, reactions.len());
    writer::write_nodes(&args.nodes_out, &nodes)?;
    writer::write_edges(&args.edges_out, &result.edges, args.weights.abundance_header())?;
    info!(
        nodes = %args.nodes_out.display(),
        edges = %args.edges_out.display(),
        "genome graph written"
    );
    Ok(())
}

pub fn run_compare(args: &CompareArgs) -> Result<()> {
    let manifest = config::load_manifest(
        &args.metadata,
        &args.paths_col,
        &args.names_col,
        &args.groups,
    )?;
    let graphs = load_graphs(&manifest, &args.ko_column)?;
    fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create output directory: {}", args.output.display()))?;

    // A failed pattern is reported and skipped so the remaining patterns
    // still get compared.
    for pattern in Pattern::ALL {
        if let Err(e) = compare_pattern(pattern, &graphs, &manifest, args) {
            error!(pattern = pattern.display_name(), error = %e, "pattern comparison failed");
        }
    }
    Ok(())
}

fn compare_pattern(
    pattern: Pattern,
    graphs: &[dietnet_core::compare::patterns::SampleGraph],
    manifest: &[ManifestRecord],
    args: &CompareArgs,
) -> Result<()> {
    let subset = subset_graphs(graphs, pattern);
    let sample_kos = get_kos(&subset);

    let matrix = SimilarityMatrix::calculate(&sample_kos);
    if matrix.n() == 0 {
        info!(pattern = pattern.display_name(), "no samples; skipping pattern");
        return Ok(());
    }

    let similarity_path = args
        .output
        .join(format!("SimilarityMatrix_{}.csv", pattern.file_stem()));
    writer::write_similarity(&similarity_path, &matrix)?;
    info!(path = %similarity_path.display(), "saved similarity matrix");

    let clustering = cluster::cluster(&matrix);
    let ordered = matrix.permuted(&clustering.leaf_order);
    plotting::plot_heatmap(&args.output, pattern, &ordered)?;
    plotting::plot_dendrogram(&args.output, pattern, &clustering, &matrix.labels)?;

    let stats = if args.stat_test {
        run_group_tests(&sample_kos, manifest, &args.groups)
    } else {
        Vec::new()
    };

    write_summary(&args.output, pattern, &sample_kos, &stats)?;
    Ok(())
}

/// One grouping variable's outcome: a result with its FDR-corrected p-value,
/// or the reason the test could not run.
enum GroupTest {
    Passed {
        group_col: String,
        result: PermanovaResult,
        corrected_p: f64,
    },
    Failed {
        group_col: String,
        reason: String,
    },
}

fn run_group_tests(
    sample_kos: &SampleKos,
    manifest: &[ManifestRecord],
    group_cols: &[String],
) -> Vec<GroupTest> {
    let mut passed: Vec<(String, PermanovaResult)> = Vec::new();
    let mut failed: Vec<(String, String)> = Vec::new();

    for group_col in group_cols {
        let grouping: HashMap<String, String> = manifest
            .iter()
            .filter_map(|record| {
                record
                    .groups
                    .get(group_col)
                    .map(|label| (record.name.clone(), label.clone()))
            })
            .collect();

        match stat_test(
            sample_kos,
            &grouping,
            group_col,
            DEFAULT_PERMUTATIONS,
            DEFAULT_SEED,
        ) {
            Ok(result) => passed.push((group_col.clone(), result)),
            Err(e) => {
                warn!(group_col, error = %e, "PERMANOVA failed");
                failed.push((group_col.clone(), e.to_string()));
            }
        }
    }

    // Correction runs only across the tests that actually produced a
    // p-value; failures are reported, not given placeholders.
    let raw: Vec<f64> = passed.iter().map(|(_, r)| r.p_value).collect();
    let corrected = fdr_correct(&raw);

    let mut tests: Vec<GroupTest> = passed
        .into_iter()
        .zip(corrected)
        .map(|((group_col, result), corrected_p)| GroupTest::Passed {
            group_col,
            result,
            corrected_p,
        })
        .collect();
    tests.extend(
        failed
            .into_iter()
            .map(|(group_col, reason)| GroupTest::Failed { group_col, reason }),
    );
    tests
}

fn write_summary(
    output: &Path,
    pattern: Pattern,
    sample_kos: &SampleKos,
    stats: &[GroupTest],
) -> Result<()> {
    let mut intersection: Option<BTreeSet<String>> = None;
    for (_, kos) in sample_kos {
        let set: BTreeSet<String> = kos.iter().cloned().collect();
        intersection = Some(match intersection {
            Some(acc) => acc.intersection(&set).cloned().collect(),
            None => set,
        });
    }
    let intersection = intersection.unwrap_or_default();

    let unique: Vec<(String, Vec<String>)> = sample_kos
        .iter()
        .map(|(name, kos)| {
            let unique_kos: Vec<String> = kos
                .iter()
                .filter(|ko| !intersection.contains(*ko))
                .cloned()
                .collect();
            (name.clone(), unique_kos)
        })
        .collect();

    let mut text = String::new();
    writeln!(text, "##### SUMMARY FOR PATTERN: {} #####", pattern)?;
    writeln!(text, "Number of KOs shared: {}", intersection.len())?;

    for test in stats {
        match test {
            GroupTest::Passed {
                group_col,
                result,
                corrected_p,
            } => {
                writeln!(text, "\n##### PERMANOVA RESULTS FOR {} #####", group_col)?;
                writeln!(text, "method name: PERMANOVA")?;
                writeln!(text, "test statistic name: pseudo-F")?;
                writeln!(text, "sample size: {}", result.sample_size)?;
                writeln!(text, "number of groups: {}", result.groups)?;
                writeln!(text, "test statistic: {:.6}", result.test_statistic)?;
                writeln!(text, "p-value: {:.6}", result.p_value)?;
                writeln!(text, "number of permutations: {}", result.permutations)?;
                writeln!(text, "R-squared: {:.6}", result.effect_size)?;
                writeln!(
                    text,
                    "FDR-corrected p-value (BH, alpha = {}): {:.6}",
                    FDR_ALPHA, corrected_p
                )?;
            }
            GroupTest::Failed { group_col, reason } => {
                writeln!(text, "\n##### PERMANOVA FAILED FOR {} #####", group_col)?;
                writeln!(text, "Reason: {}", reason)?;
            }
        }
    }

    writeln!(text, "\n##### UNIQUE KOs #####")?;
    for (name, unique_kos) in &unique {
        writeln!(text, "Unique KOs to {}: {}", name, unique_kos.len())?;
    }

    writeln!(text, "\n##### LISTS OF KOs #####")?;
    let shared: Vec<&str> = intersection.iter().map(String::as_str).collect();
    writeln!(text, "Intersection KOs: {:?}", shared)?;
    for (name, unique_kos) in &unique {
        writeln!(text, "\nUnique KOs for {}: {:?}", name, unique_kos)?;
    }

    let summary_path = output.join(format!(
        "{}_GraphComparisons_Summary.txt",
        pattern.file_stem()
    ));
    fs::write(&summary_path, text)
        .with_context(|| format!("Failed to write summary: {}", summary_path.display()))?;
    info!(path = %summary_path.display(), "saved summary");
    Ok(())
}
