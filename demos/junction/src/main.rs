//! junction: lane connector walkthrough on a single four-way junction.
//!
//! Builds the junction, authors road and tram connections, prints both
//! graphs, writes the connection records to CSV (first argument, default
//! `connections.csv`) and reloads them into a fresh session.
//!
//! Set `RUST_LOG=debug` to see rejected edits and the graph dumps.

mod network;

use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{ensure, Result};
use tracing_subscriber::EnvFilter;

use lc_core::{ConnectionGroup, ConnectorConfig, GroupSelector};
use lc_manager::{read_records_path, write_records_path, ConnectionManager};
use lc_network::{EventLog, HostEvent, NoopNotifier};

use network::build_junction;

const DEFAULT_OUTPUT: &str = "connections.csv";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let output = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

    // ── Network ───────────────────────────────────────────────────────────
    let j = build_junction()?;
    let [w_in, e_in, n_in, s_in] = j.inbound;
    let [w_out, e_out, n_out, s_out] = j.outbound;
    let [tram_w, tram_e] = j.tram;
    let seg_n = j.seg_n;
    let center = j.center;
    println!("Junction: {} lanes on {} segments.", j.net.lane_count(), j.net.segment_count());

    let config = ConnectorConfig::default();
    let mut mgr = ConnectionManager::new(config.clone(), j.net, EventLog::new())?;

    // ── Road connections ──────────────────────────────────────────────────
    // West approach: straight on and left only.
    mgr.add_lane_connection(w_in, e_out, false, GroupSelector::All);
    mgr.add_lane_connection(w_in, n_out, false, GroupSelector::All);
    // East approach: U-turn back west is allowed, straight on too.
    mgr.add_lane_connection(e_in, w_out, true, GroupSelector::All);
    mgr.add_lane_connection(e_in, e_out, true, GroupSelector::All);
    // North approach is a dead-end.
    mgr.add_lane_connection(n_in, n_in, true, GroupSelector::All);
    // South approach: everywhere.
    for target in [w_out, e_out, n_out] {
        mgr.add_lane_connection(s_in, target, false, GroupSelector::All);
    }

    // ── Tram connections ──────────────────────────────────────────────────
    let straight = mgr.add_lane_connection(tram_w, tram_e, false, GroupSelector::Track);
    // Road lanes are not tram lanes; the track group refuses this one.
    let crossover = mgr.add_lane_connection(tram_w, n_out, false, GroupSelector::All);
    println!("Tram straight through: {straight}; tram into north car lane: {crossover}");
    if !crossover {
        tracing::info!(source = %tram_w, target = %n_out, "no group governs a tram-to-car connection");
    }

    for lane in [w_in, e_in, s_in] {
        match mgr.notifier().last_arrows(lane) {
            Some(Some(arrows)) => println!("  {lane} arrows: {arrows}"),
            Some(None) => println!("  {lane} arrows: default"),
            None => println!("  {lane} arrows: untouched"),
        }
    }
    let uturns = mgr
        .notifier()
        .events
        .iter()
        .filter(|e| matches!(e, HostEvent::AllowUturn(..)))
        .count();
    println!("U-turn restrictions lifted: {uturns}");
    println!(
        "Node has connections: {}; north arm U-turns: {}",
        mgr.has_node_connections(center, GroupSelector::All),
        mgr.has_uturn_connections(seg_n, true, GroupSelector::All),
    );

    // ── Dumps ─────────────────────────────────────────────────────────────
    for group in ConnectionGroup::ALL {
        let graph = mgr.sub_manager(group).graph();
        println!("\n{group} graph ({} lane ends, {} edges):", graph.len(), graph.edge_count());
        print!("{}", graph.debug_dump());
    }
    mgr.print_debug_info();

    // ── Save ──────────────────────────────────────────────────────────────
    let records = mgr.save_data();
    write_records_path(&output, &records)?;
    println!("\nWrote {} records to {}", records.len(), output.display());

    // ── Reload into a fresh session ───────────────────────────────────────
    let (net, _) = mgr.into_parts();
    let mut reloaded = ConnectionManager::new(config, net, NoopNotifier)?;
    let back = read_records_path(&output)?;
    ensure!(reloaded.load_data(&back), "some connection records were skipped");
    let saved: HashSet<_> = records.iter().copied().collect();
    let replayed: HashSet<_> = reloaded.save_data().into_iter().collect();
    ensure!(saved == replayed, "reloaded connections differ from the saved ones");
    println!("Reloaded {} records; graphs match.", back.len());

    Ok(())
}
