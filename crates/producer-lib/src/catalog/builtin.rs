//! Built-in catalog for the Baseview dashboards
//!
//! Edit these lists to match the cluster being mocked, or point the
//! producer at a catalog file instead.

use super::{Catalog, EntityGroup, GroupKind, MetricRef, MetricSpec, RangeTable, ValueSource};

/// Standalone rack entities
pub const RACKS: &[&str] = &["A05", "A06", "A07"];

/// DGX compute nodes
pub const COMPUTE_NODES: &[&str] = &[
    "a05-p1-dgx-01-c01",
    "a05-p1-dgx-01-c02",
    "a05-p1-dgx-01-c03",
    "a05-p1-dgx-01-c04",
    "a05-p1-dgx-01-c05",
    "a05-p1-dgx-01-c06",
    "a05-p1-dgx-01-c07",
    "a05-p1-dgx-01-c08",
    "a05-p1-dgx-01-c09",
    "a05-p1-dgx-01-c10",
    "a05-p1-dgx-01-c11",
    "a05-p1-dgx-01-c12",
    "a05-p1-dgx-01-c13",
    "a05-p1-dgx-01-c14",
    "a05-p1-dgx-01-c15",
    "a05-p1-dgx-01-c16",
    "a05-p1-dgx-01-c17",
    "a05-p1-dgx-01-c18",
];

/// Head and service nodes
pub const INFRASTRUCTURE_NODES: &[&str] = &["a04-p1-head-01", "a04-p1-head-02"];

/// Network switches reporting health
pub const SWITCHES: &[&str] = &[
    "a03-p1-btor-01",
    "a03-p1-ftor-01",
    "a03-p1-tor-01",
    "a04-p1-spine-01",
    "a04-p1-stor-01",
    "a04-p1-tor-02",
];

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Memory installed in a DGX node
const COMPUTE_MEMORY_BYTES: f64 = 2048.0 * GIB;

/// Memory installed in a head node
const INFRASTRUCTURE_MEMORY_BYTES: f64 = 512.0 * GIB;

/// Share of node power drawn by the GPU trays
const GPU_POWER_FRACTION: f64 = 0.70;

/// User/system split of busy CPU time
const CPU_USER_FRACTION: f64 = 0.8;
const CPU_SYSTEM_FRACTION: f64 = 0.2;

impl Catalog {
    /// The compiled-in catalog: racks, compute nodes, infrastructure
    /// nodes and switches, in that order
    pub fn builtin() -> Self {
        Self::new(vec![
            racks(),
            compute_nodes(),
            infrastructure_nodes(),
            switches(),
        ])
    }
}

fn racks() -> EntityGroup {
    let power = RangeTable::uniform(50_000.0, 60_000.0)
        .with_override("A05", 130_000.0, 135_000.0)
        .with_override("A06", 60_000.0, 65_000.0)
        .with_override("A07", 55_000.0, 60_000.0);
    let temperature = RangeTable::uniform(50.0, 65.0)
        .with_override("A05", 75.0, 85.0)
        .with_override("A06", 55.0, 65.0)
        .with_override("A07", 50.0, 60.0);

    EntityGroup::new(GroupKind::Rack, RACKS.iter().copied())
        .metric(
            MetricSpec::new("totalnodepowerusage", "Power/Rack", ValueSource::Uniform(power))
                .unit("W"),
        )
        .metric(
            MetricSpec::new(
                "TotalGPUTemperature",
                "Temperature/Rack",
                ValueSource::Uniform(temperature),
            )
            .unit("C"),
        )
}

fn compute_nodes() -> EntityGroup {
    let group = EntityGroup::new(GroupKind::ComputeNode, COMPUTE_NODES.iter().copied())
        .metric(
            MetricSpec::new("gpu_temperature", "GPU", uniform(45.0, 75.0))
                .parameter("average")
                .unit("C"),
        )
        .metric(
            MetricSpec::new("gpu_utilization", "GPU", uniform(30.0, 95.0))
                .parameter("average")
                .unit("%"),
        )
        .metric(
            MetricSpec::new("total_power", "Power/Node", uniform(6_000.0, 10_200.0)).unit("W"),
        )
        .metric(
            MetricSpec::new(
                "gpu_power",
                "Power/Node",
                ValueSource::Fraction {
                    base: MetricRef::new("total_power"),
                    fraction: GPU_POWER_FRACTION,
                },
            )
            .parameter("total")
            .unit("W"),
        );

    with_host_metrics(group, (10.0, 60.0), (20.0, 80.0), COMPUTE_MEMORY_BYTES, true)
}

fn infrastructure_nodes() -> EntityGroup {
    let group = EntityGroup::new(
        GroupKind::InfrastructureNode,
        INFRASTRUCTURE_NODES.iter().copied(),
    );
    with_host_metrics(group, (5.0, 40.0), (10.0, 60.0), INFRASTRUCTURE_MEMORY_BYTES, false)
}

fn switches() -> EntityGroup {
    EntityGroup::new(GroupKind::Switch, SWITCHES.iter().copied())
        .metric(MetricSpec::new("DeviceStatusOk", "Internal", ValueSource::Status))
}

/// CPU and memory metrics shared by every node group
fn with_host_metrics(
    group: EntityGroup,
    cpu: (f64, f64),
    memory: (f64, f64),
    memory_bytes: f64,
    cpu_split: bool,
) -> EntityGroup {
    let mut group = group
        .metric(MetricSpec::new("CPUUsage", "CPU", uniform(cpu.0, cpu.1)).unit("%"))
        .metric(
            MetricSpec::new(
                "CPUIdle",
                "CPU",
                ValueSource::Complement {
                    base: MetricRef::new("CPUUsage"),
                    total: 100.0,
                },
            )
            .unit("%"),
        );

    if cpu_split {
        group = group
            .metric(
                MetricSpec::new(
                    "CPUUser",
                    "CPU",
                    ValueSource::Fraction {
                        base: MetricRef::new("CPUUsage"),
                        fraction: CPU_USER_FRACTION,
                    },
                )
                .unit("%"),
            )
            .metric(
                MetricSpec::new(
                    "CPUSystem",
                    "CPU",
                    ValueSource::Fraction {
                        base: MetricRef::new("CPUUsage"),
                        fraction: CPU_SYSTEM_FRACTION,
                    },
                )
                .unit("%"),
            );
    }

    group
        .metric(
            MetricSpec::new("MemoryUsage", "Memory", uniform(memory.0, memory.1)).unit("%"),
        )
        .metric(
            MetricSpec::new(
                "MemoryUsed",
                "Memory",
                ValueSource::Capacity {
                    base: MetricRef::new("MemoryUsage"),
                    capacity: memory_bytes,
                },
            )
            .unit("B"),
        )
}

fn uniform(lo: f64, hi: f64) -> ValueSource {
    ValueSource::Uniform(RangeTable::uniform(lo, hi))
}
