//! Shared sample builders for the integration tests.

#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use faultline::{CapacityTable, CellIdentity, Neighbor, Sample, ServingCell};

pub const SERVING_EARFCN: u32 = 1650;
pub const OTHER_EARFCN: u32 = 2850;
pub const SERVING_PCI: u32 = 101;
pub const ENODEB_ID: u32 = 5001;

pub fn base_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 14)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid base time")
}

/// Healthy sample `secs` after the base time: good radio, target throughput met.
pub fn healthy(secs: i64) -> Sample {
    Sample {
        timestamp: base_time() + Duration::seconds(secs),
        throughput_kbps: 25_000.0,
        serving: ServingCell {
            rsrp_dbm: -85.0,
            sinr_db: 18.0,
            rsrq_db: -9.0,
            earfcn: SERVING_EARFCN,
            pci: SERVING_PCI,
            enodeb_id: ENODEB_ID,
            resource_blocks: 45.0,
            tx_power_dbm: 5.0,
        },
        neighbors: Vec::new(),
        distance_to_site_m: 250.0,
        far_high_power: false,
    }
}

/// Underperforming sample with healthy radio KPIs; no predicate fires.
pub fn slow(secs: i64) -> Sample {
    Sample {
        throughput_kbps: 2_500.0,
        ..healthy(secs)
    }
}

/// Underperforming sample with weak serving RSRP and no neighbors.
pub fn weak_coverage(secs: i64, rsrp_dbm: f64) -> Sample {
    let mut s = slow(secs);
    s.serving.rsrp_dbm = rsrp_dbm;
    s
}

/// Underperforming sample that passes the High Load KPI gates.
pub fn congested(secs: i64, resource_blocks: f64) -> Sample {
    let mut s = slow(secs);
    s.serving.resource_blocks = resource_blocks;
    s
}

/// Underperforming sample with good RSRP, poor SINR and two close neighbors.
pub fn overlapped(secs: i64) -> Sample {
    let mut s = slow(secs);
    s.serving.rsrp_dbm = -95.0;
    s.serving.sinr_db = 3.0;
    s.neighbors = vec![
        Neighbor::new(-93.0, SERVING_EARFCN, 21),
        Neighbor::new(-97.0, SERVING_EARFCN, 104),
    ];
    s
}

/// Capacity table with one row for the shared serving cell.
pub fn busy_cell(utilization: &str) -> CapacityTable {
    let mut table = CapacityTable::new();
    table.insert(
        CellIdentity {
            enodeb_id: ENODEB_ID,
            pci: SERVING_PCI,
            earfcn: SERVING_EARFCN,
        },
        utilization,
    );
    table
}
