/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command Line Interface (CLI) module
//!
//! `crystal-graph info <file>` summarises a structure file,
//! `crystal-graph graph <file>` builds its neighbor graph, optionally writing
//! every array to JSON, and `crystal-graph betti <file>` stores per-atom
//! persistent-homology features in binary form.

use crate::graph::{CrystalGraph, GaussianRbf, GraphArrays, GraphConfig};
use crate::io::AtomEmbeddings;
use crate::session::GraphSession;
use crate::structure::{ParserConfig, Structure};
use crate::topology::{save_betti_features, structure_betti_features};
use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::info;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Periodic crystal structure to neighbor graph converter
#[derive(Debug, Parser)]
#[command(name = "crystal-graph", version, about)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Summarise a structure file
    Info {
        /// POSCAR-style structure file
        path: PathBuf,
    },
    /// Build the neighbor graph of a structure file
    Graph(GraphArgs),
    /// Compute per-atom Betti features of a structure file
    Betti(BettiArgs),
}

#[derive(Debug, Args)]
pub struct GraphArgs {
    /// POSCAR-style structure file
    pub path: PathBuf,

    /// Neighbor cutoff radius in Å
    #[arg(short = 'r', long, default_value_t = 8.0)]
    pub cutoff: f64,

    /// Maximum neighbors per atom (zero or less gives an empty graph)
    #[arg(short = 'k', long, default_value_t = 12, allow_negative_numbers = true)]
    pub max_neighbors: i64,

    /// JSON graph configuration
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Compute the Gaussian RBF encoding of edge distances
    #[arg(long)]
    pub rbf: bool,

    /// JSON table of per-element embeddings, keyed by atomic number
    #[arg(long)]
    pub embeddings: Option<PathBuf>,

    /// Append Betti features to the node features (needs --embeddings)
    #[arg(long, requires = "embeddings")]
    pub topo: bool,

    /// Write the graph arrays to this JSON file
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BettiArgs {
    /// POSCAR-style structure file
    pub path: PathBuf,

    /// Radius of each atom's neighbor cloud and of the filtration in Å
    #[arg(short = 'r', long, default_value_t = 10.0)]
    pub cutoff: f64,

    /// Binary feature matrix to write
    #[arg(short, long)]
    pub output: PathBuf,
}

impl Cli {
    /// Default log filter implied by the verbosity flags
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Everything `graph --output` writes
#[derive(Debug, Serialize)]
pub struct GraphReport {
    pub title: String,
    pub elements: Vec<String>,
    pub element_counts: Vec<usize>,
    pub lattice_vectors: Vec<f64>,
    pub positions: Vec<f64>,
    pub atom_types: Vec<usize>,
    pub graph: GraphArrays,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_features: Option<Vec<Vec<f64>>>,
}

/// Run a parsed command line, writing human-readable output to `out`
pub fn run<W: Write>(cli: &Cli, out: &mut W) -> Result<()> {
    match &cli.command {
        Command::Info { path } => run_info(path, out),
        Command::Graph(args) => run_graph(args, out),
        Command::Betti(args) => run_betti(args, out),
    }
}

fn read_structure_text(path: &PathBuf) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_structure(path: &PathBuf) -> Result<Structure> {
    let text = read_structure_text(path)?;
    crate::structure::StructureParser::new(ParserConfig::default())
        .parse(&text)
        .with_context(|| format!("parsing {}", path.display()))
}

fn run_info<W: Write>(path: &PathBuf, out: &mut W) -> Result<()> {
    let structure = read_structure(path)?;
    write_summary(&structure, out)
}

fn run_betti<W: Write>(args: &BettiArgs, out: &mut W) -> Result<()> {
    let structure = read_structure(&args.path)?;
    let parallel = GraphConfig::default().use_parallel(structure.num_atoms());
    let features = structure_betti_features(&structure, args.cutoff, parallel)
        .context("computing Betti features")?;
    save_betti_features(&args.output, &features)
        .with_context(|| format!("writing {}", args.output.display()))?;
    writeln!(
        out,
        "Betti:     {:?} features (cutoff {:.3} Å) -> {}",
        features.dim(),
        args.cutoff,
        args.output.display()
    )?;
    info!("Wrote Betti features to {}", args.output.display());
    Ok(())
}

fn write_summary<W: Write>(structure: &Structure, out: &mut W) -> Result<()> {
    writeln!(out, "Title:     {}", structure.title())?;
    writeln!(out, "Atoms:     {}", structure.num_atoms())?;
    for (symbol, count) in structure.species().iter().zip(structure.element_counts()) {
        writeln!(out, "  {:<4} {}", symbol, count)?;
    }
    writeln!(out, "Volume:    {:.4} Å³", structure.volume())?;
    for (label, row) in ["a", "b", "c"].iter().zip(structure.lattice().rows()) {
        writeln!(
            out,
            "  {} = ({:>10.5}, {:>10.5}, {:>10.5})",
            label, row[0], row[1], row[2]
        )?;
    }
    Ok(())
}

fn run_graph<W: Write>(args: &GraphArgs, out: &mut W) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            GraphConfig::from_json(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => GraphConfig::default(),
    };
    if args.rbf {
        config.rbf.enabled = true;
    }

    let text = read_structure_text(&args.path)?;
    let mut session = GraphSession::with_config(config.clone(), ParserConfig::default());
    session
        .try_load_structure(&text)
        .with_context(|| format!("parsing {}", args.path.display()))?;
    session
        .build_graph(args.cutoff, args.max_neighbors)
        .context("building graph")?;

    let (structure, graph) = match (session.structure(), session.graph()) {
        (Some(s), Some(g)) => (s, g),
        _ => anyhow::bail!("graph was not built"),
    };

    write_summary(structure, out)?;
    writeln!(
        out,
        "Edges:     {} (cutoff {:.3} Å, max {} neighbors)",
        graph.num_edges(),
        graph.r_cutoff(),
        graph.max_neighbors()
    )?;
    let unpaired = graph.unpaired_edges().len();
    if unpaired > 0 {
        writeln!(out, "Unpaired:  {} edges truncated on the reverse side", unpaired)?;
    }

    let node_features = match &args.embeddings {
        Some(path) => {
            let embeddings = AtomEmbeddings::from_file(path)
                .with_context(|| format!("reading embeddings {}", path.display()))?;
            let rbf = GaussianRbf::from_config(&config.rbf, args.cutoff)?;
            let mut crystal = CrystalGraph::new(structure, graph, &embeddings, &rbf)?;
            if args.topo {
                let topo = structure_betti_features(
                    structure,
                    args.cutoff,
                    config.use_parallel(structure.num_atoms()),
                )
                    .context("computing Betti features")?;
                crystal.add_topo_features(&topo)?;
            }
            writeln!(
                out,
                "Features:  nodes {:?}, edges {:?}",
                crystal.node_features().dim(),
                crystal.edge_attr().dim()
            )?;
            Some(
                crystal
                    .node_features()
                    .rows()
                    .into_iter()
                    .map(|r| r.to_vec())
                    .collect(),
            )
        }
        None => None,
    };

    if let Some(path) = &args.output {
        let report = GraphReport {
            title: structure.title().to_string(),
            elements: session.elements(),
            element_counts: session.element_counts(),
            lattice_vectors: session.lattice_vectors(),
            positions: session.positions(),
            atom_types: session.atom_types(),
            graph: graph.to_arrays(),
            node_features,
        };
        let file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &report)?;
        writer.flush()?;
        info!("Wrote graph to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arguments() {
        let cli = Cli::try_parse_from([
            "crystal-graph",
            "-vv",
            "graph",
            "POSCAR",
            "--cutoff",
            "5.5",
            "-k",
            "-1",
            "--rbf",
        ])
        .unwrap();
        assert_eq!(cli.log_level(), "debug");
        match cli.command {
            Command::Graph(args) => {
                assert_eq!(args.cutoff, 5.5);
                assert_eq!(args.max_neighbors, -1);
                assert!(args.rbf);
                assert!(args.output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_betti_arguments() {
        let cli =
            Cli::try_parse_from(["crystal-graph", "betti", "POSCAR", "-o", "out.bin"]).unwrap();
        match cli.command {
            Command::Betti(args) => {
                assert_eq!(args.cutoff, 10.0);
                assert_eq!(args.output, PathBuf::from("out.bin"));
            }
            other => panic!("unexpected command {:?}", other),
        }

        // Topological node features only make sense on top of embeddings
        assert!(Cli::try_parse_from(["crystal-graph", "graph", "POSCAR", "--topo"]).is_err());
    }

    #[test]
    fn test_info_defaults() {
        let cli = Cli::try_parse_from(["crystal-graph", "info", "POSCAR"]).unwrap();
        assert_eq!(cli.log_level(), "warn");
        assert!(matches!(cli.command, Command::Info { .. }));
    }
}
