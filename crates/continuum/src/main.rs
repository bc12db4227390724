//! `continuum` — inspect and exercise a consistent hashing ring.
//!
//! Builds a ring from a TOML config file and/or command-line flags, then
//! answers lookups or reports how keys are distributed.
//!
//! # Usage
//!
//! ```text
//! continuum -n cache-a -n cache-b locate user:42         # primary node
//! continuum -c ring.toml locate user:42 --count 3        # replica set
//! continuum -c ring.toml members                         # members and point counts
//! continuum -c ring.toml dump                            # every point on the ring
//! continuum -c ring.toml spread -k 100000                # key share per member
//! continuum -c ring.toml remap --add cache-d             # keys moved by a join
//! continuum bench -k 1000                                # lookup timing grid
//! ```

mod config;
mod telemetry;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use continuum_ring::{HashFunction, HashMode, NodeName, Ring};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use config::CliConfig;

// -----------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "continuum",
    version,
    about = "Consistent hashing ring inspector"
)]
struct Cli {
    /// Path to TOML config file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Ring member(s), replacing `[members] nodes` from the config file.
    ///
    /// Can be specified multiple times.
    #[arg(short = 'n', long = "node", global = true)]
    nodes: Vec<String>,

    /// Override the number of points per member.
    #[arg(long, global = true, env = "CONTINUUM_REPLICAS")]
    replicas: Option<u32>,

    /// Override the hash function (md5, sha1, blake3).
    #[arg(long, global = true)]
    hash: Option<HashFunction>,

    /// Override the position mode (normal, libmemcached).
    #[arg(long, global = true)]
    mode: Option<HashMode>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the node(s) responsible for each key.
    Locate {
        /// Keys to look up.
        #[arg(required = true)]
        keys: Vec<String>,

        /// Number of distinct nodes to resolve per key.
        #[arg(long, default_value = "1")]
        count: usize,
    },

    /// List ring members and their point counts.
    Members,

    /// Print every point on the ring in order.
    Dump,

    /// Show what share of random keys each member serves.
    Spread {
        /// Number of random keys to sample.
        #[arg(short = 'k', long, default_value = "10000")]
        keys: usize,

        /// Seed for key generation.
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Show what share of keys change node under a membership change.
    Remap {
        /// Node(s) to add.
        #[arg(long)]
        add: Vec<String>,

        /// Node(s) to remove.
        #[arg(long)]
        remove: Vec<String>,

        /// Number of random keys to sample.
        #[arg(short = 'k', long, default_value = "10000")]
        keys: usize,

        /// Seed for key generation.
        #[arg(long, default_value = "0")]
        seed: u64,
    },

    /// Time lookups over a grid of ring sizes (in-memory, random node names).
    Bench {
        /// Number of lookups per grid cell.
        #[arg(short = 'k', long, default_value = "1000")]
        keys: usize,

        /// Size of each random key and node name in bytes.
        #[arg(short, long, default_value = "16")]
        size: usize,
    },
}

// -----------------------------------------------------------------------
// Entrypoint
// -----------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref()).context("failed to load config")?;

    telemetry::init(&config.log.level);

    // CLI args override config file values.
    if !cli.nodes.is_empty() {
        config.members.nodes = cli.nodes;
    }
    if let Some(replicas) = cli.replicas {
        config.ring.replicas = replicas;
    }
    if let Some(hash) = cli.hash {
        config.ring.hash = hash;
    }
    if let Some(mode) = cli.mode {
        config.ring.mode = mode;
    }
    debug!(
        replicas = config.ring.replicas,
        hash = %config.ring.hash,
        mode = %config.ring.mode,
        members = config.members.nodes.len(),
        "ring configuration"
    );

    match cli.command {
        Commands::Locate { keys, count } => cmd_locate(&config, &keys, count),
        Commands::Members => cmd_members(&config),
        Commands::Dump => cmd_dump(&config),
        Commands::Spread { keys, seed } => cmd_spread(&config, keys, seed),
        Commands::Remap {
            add,
            remove,
            keys,
            seed,
        } => cmd_remap(&config, &add, &remove, keys, seed),
        Commands::Bench { keys, size } => cmd_bench(&config, keys, size),
    }
}

/// Build the configured ring, refusing to continue without members.
fn populated_ring(config: &CliConfig) -> Result<Ring> {
    let ring = config.build_ring()?;
    if ring.is_empty() {
        bail!("ring has no members; pass --node or set [members] nodes in the config file");
    }
    Ok(ring)
}

// -----------------------------------------------------------------------
// continuum locate / members / dump
// -----------------------------------------------------------------------

fn cmd_locate(config: &CliConfig, keys: &[String], count: usize) -> Result<()> {
    let ring = populated_ring(config)?;
    for key in keys {
        let nodes = ring
            .find_nodes(key, count)
            .with_context(|| format!("locating {key:?}"))?;
        let names: Vec<String> = nodes.iter().map(NodeName::to_string).collect();
        println!("{key}\t{}", names.join(", "));
    }
    Ok(())
}

fn cmd_members(config: &CliConfig) -> Result<()> {
    let ring = config.build_ring()?;
    let mut members = ring.members();
    members.sort();

    println!("Members: {}", members.len());
    for node in &members {
        let points = ring.node_info(node).map_or(0, |info| info.points);
        println!("  {node:<32} points={points}");
    }
    Ok(())
}

fn cmd_dump(config: &CliConfig) -> Result<()> {
    let ring = config.build_ring()?;

    println!(
        "replicas={} hash={} mode={} members={} points={}",
        ring.replicas(),
        ring.hasher().function(),
        ring.hasher().mode(),
        ring.node_count(),
        ring.point_count()
    );
    for point in ring.points() {
        println!("{:>20}  {}", point.position, point.node);
    }
    Ok(())
}

// -----------------------------------------------------------------------
// continuum spread / remap
// -----------------------------------------------------------------------

fn cmd_spread(config: &CliConfig, count: usize, seed: u64) -> Result<()> {
    let ring = populated_ring(config)?;
    let keys = random_keys(&mut StdRng::seed_from_u64(seed), count, 16);

    let mut served: HashMap<NodeName, usize> = HashMap::new();
    for key in &keys {
        *served.entry(ring.find_node(key)?).or_default() += 1;
    }

    let ideal = 1.0 / ring.node_count() as f64;
    let mut rows: Vec<(NodeName, usize)> = ring
        .members()
        .into_iter()
        .map(|node| {
            let n = served.get(&node).copied().unwrap_or(0);
            (node, n)
        })
        .collect();
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    println!("Sampled {count} keys over {} members", rows.len());
    for (node, n) in rows {
        let share = n as f64 / count.max(1) as f64;
        println!(
            "  {node:<32} {n:>8}  {:>6.2}%  ({:+.1}% vs even)",
            share * 100.0,
            (share / ideal - 1.0) * 100.0
        );
    }
    Ok(())
}

fn cmd_remap(
    config: &CliConfig,
    add: &[String],
    remove: &[String],
    count: usize,
    seed: u64,
) -> Result<()> {
    if add.is_empty() && remove.is_empty() {
        bail!("nothing to change; pass --add and/or --remove");
    }

    let old = populated_ring(config)?;
    let mut new = old.clone();
    for node in add {
        new.add(node.as_str())
            .with_context(|| format!("adding {node:?}"))?;
    }
    for node in remove {
        new.remove(node)
            .with_context(|| format!("removing {node:?}"))?;
    }
    if new.is_empty() {
        bail!("the change would leave the ring with no members");
    }

    let keys = random_keys(&mut StdRng::seed_from_u64(seed), count, 16);
    let moved = Ring::diff(&old, &new, &keys)?;
    let fraction = moved.len() as f64 / count.max(1) as f64;
    info!(moved = moved.len(), sampled = count, "remap computed");

    println!(
        "Members: {} -> {}",
        old.node_count(),
        new.node_count()
    );
    println!(
        "Moved:   {} of {count} keys ({:.2}%)",
        moved.len(),
        fraction * 100.0
    );

    let mut flows: HashMap<(NodeName, NodeName), usize> = HashMap::new();
    for m in moved {
        *flows.entry((m.from, m.to)).or_default() += 1;
    }
    let mut flows: Vec<_> = flows.into_iter().collect();
    flows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for ((from, to), n) in flows {
        println!("  {from} -> {to}: {n}");
    }
    Ok(())
}

// -----------------------------------------------------------------------
// continuum bench
// -----------------------------------------------------------------------

fn cmd_bench(config: &CliConfig, count: usize, size: usize) -> Result<()> {
    if size == 0 {
        bail!("--size must be at least 1");
    }

    // (replicas, nodes)
    let grid: &[(u32, usize)] = &[
        (1, 1),
        (1, 8),
        (1, 256),
        (8, 1),
        (8, 32),
        (8, 512),
        (512, 8),
        (512, 16),
        (512, 32),
    ];

    let mut rng = StdRng::seed_from_u64(0);
    println!(
        "continuum bench: hash={} mode={} keys={count} size={size}",
        config.ring.hash, config.ring.mode
    );

    for &(replicas, nodes) in grid {
        let mut ring_config = config.ring;
        ring_config.replicas = replicas;
        let mut ring = Ring::with_config(&ring_config)?;

        for i in 0..nodes {
            let mut name = random_key(&mut rng, size);
            // Suffix keeps names unique even when random prefixes repeat.
            name.extend_from_slice(format!("-{i}").as_bytes());
            ring.add(name)?;
        }

        let keys = random_keys(&mut rng, count, size);
        let start = Instant::now();
        for key in &keys {
            ring.find_node(key)?;
        }
        let elapsed = start.elapsed();

        let per_lookup = elapsed.as_secs_f64() / count.max(1) as f64;
        println!(
            "replicas={replicas:<4} nodes={nodes:<4} total={:.5}s avg={:.3}us ops/sec={:.0}",
            elapsed.as_secs_f64(),
            per_lookup * 1e6,
            if per_lookup > 0.0 { 1.0 / per_lookup } else { 0.0 }
        );
    }
    Ok(())
}

/// Random lowercase ASCII key of `size` bytes.
fn random_key(rng: &mut StdRng, size: usize) -> Vec<u8> {
    (0..size).map(|_| rng.random_range(b'a'..=b'z')).collect()
}

fn random_keys(rng: &mut StdRng, count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count).map(|_| random_key(rng, size)).collect()
}
