use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};

use cathgvs::catalogue::CatalogueColumns;
use cathgvs::pipeline::{self, PipelineOpts};

/// cathgvs CLI
#[derive(Parser)]
#[command(name = "cathgvs")]
#[command(version)]
#[command(about = "Translate mutation catalogue shorthand into HGVS descriptors", long_about = None)]
struct Cli {
    /// Verbosity of the program
    #[command(flatten)]
    verbose: Verbosity<InfoLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a whole catalogue (two passes with deletion imputation) and write CSV
    Translate(TranslateArgs),

    /// Classify individual shorthand strings against an annotation
    Classify {
        /// Gene annotation (GFF3)
        #[arg(long)]
        gff: PathBuf,
        /// Shorthand variants, e.g. "rpoB_S450L"
        #[arg(required = true)]
        variants: Vec<String>,
    },
}

#[derive(Args)]
struct TranslateArgs {
    /// Gene annotation (GFF3)
    #[arg(long)]
    gff: PathBuf,
    /// Reference genome (FASTA or plain sequence lines)
    #[arg(long)]
    reference: PathBuf,
    /// Mutation catalogue (CSV, or TSV for .tsv/.txt)
    #[arg(long)]
    catalogue: PathBuf,
    /// Output CSV ("-" for stdout)
    #[arg(long, default_value = "-")]
    output: PathBuf,
    /// Threads (None = all)
    #[arg(long)]
    threads: Option<usize>,
    /// Catalogue column holding the variant name
    #[arg(long, default_value = "variant (common_name)")]
    variant_column: String,
    /// Catalogue column holding the drug
    #[arg(long, default_value = "drug")]
    drug_column: String,
    /// Catalogue column holding the confidence grading
    #[arg(long, default_value = "FINAL CONFIDENCE GRADING")]
    grading_column: String,
    /// Catalogue column holding the genome position
    #[arg(long, default_value = "Genome position")]
    position_column: String,
}

impl From<TranslateArgs> for PipelineOpts {
    fn from(a: TranslateArgs) -> Self {
        PipelineOpts {
            gff: a.gff,
            reference: a.reference,
            catalogue: a.catalogue,
            output: a.output,
            threads: a.threads,
            columns: CatalogueColumns {
                variant: a.variant_column,
                drug: a.drug_column,
                grading: a.grading_column,
                genome_position: a.position_column,
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let collector = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_max_level(match cli.verbose.log_level() {
            Some(log::Level::Error) => tracing::Level::ERROR,
            Some(log::Level::Warn) => tracing::Level::WARN,
            Some(log::Level::Info) | None => tracing::Level::INFO,
            Some(log::Level::Debug) => tracing::Level::DEBUG,
            Some(log::Level::Trace) => tracing::Level::TRACE,
        })
        .compact()
        .finish();

    tracing::subscriber::with_default(collector, || match cli.command {
        Commands::Translate(args) => {
            let summary = pipeline::run(&args.into())?;
            tracing::info!(
                rows = summary.rows,
                classified = summary.classified,
                imputed = summary.imputed,
                failed = summary.failed,
                "done"
            );
            Ok(())
        }
        Commands::Classify { gff, variants } => cmd_classify(gff, variants),
    })
}

fn cmd_classify(gff: PathBuf, variants: Vec<String>) -> anyhow::Result<()> {
    let genes = cathgvs::gene::load_gff(gff)?;
    for v in variants {
        match cathgvs::classify(&v, &genes) {
            Ok(c) => println!("{v}\t{}\t{}\t{}", c.gene, c.variant_type, c.hgvs),
            Err(e) => println!("{v}\t\t\t\t{e}"),
        }
    }
    Ok(())
}
