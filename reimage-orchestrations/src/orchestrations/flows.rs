//! Static flow diagrams for orchestrations
//!
//! Mermaid flowcharts of each orchestration's expected path. Node IDs map to
//! the step names that appear in [`crate::error::StepError`] and in the logs.

use crate::names::orchestrations;

pub struct FlowDiagram {
    pub orchestration_name: &'static str,
    /// Mermaid flowchart definition
    pub mermaid: &'static str,
    /// Node ID to step name
    pub node_mappings: &'static [(&'static str, &'static str)],
}

impl FlowDiagram {
    /// Node ID for a step name, if the step appears in this flow
    pub fn node_for_step(&self, step: &str) -> Option<&'static str> {
        self.node_mappings
            .iter()
            .find(|(_, name)| *name == step)
            .map(|(node, _)| *node)
    }
}

/// Replace Instance orchestration flow
pub const REPLACE_INSTANCE_FLOW: FlowDiagram = FlowDiagram {
    orchestration_name: orchestrations::REPLACE_INSTANCE,
    mermaid: r#"flowchart TD
    subgraph init["Initialization"]
        start(["▶ Start"])
        validate["📋 Validate Input<br/><small>identifier + disk size</small>"]
        locate["📋 Locate Instance<br/><small>name prefix + tag regex</small>"]
    end

    subgraph stop["Stop Original"]
        detach["📋 Detach Access Config<br/><small>best effort</small>"]
        stop_vm["📋 Stop Instance"]
        wait_stopped{"⏳ Terminated?"}
        timer_stopped["⏱ Poll Interval"]
    end

    subgraph image["Build Image"]
        snapshot["📋 Insert Image<br/><small>tarball, disk or boot disk</small>"]
        wait_image{"⏳ Image Ready?"}
        timer_image["⏱ Poll Interval"]
    end

    subgraph replace["Launch Successor"]
        clone["📋 Clone Spec<br/><small>new name, new boot image</small>"]
        create["📋 Insert Instance"]
        wait_running{"⏳ Running?"}
        timer_running["⏱ Poll Interval"]
        success(["🏁 Success"])
    end

    failed(["💥 Failed<br/><small>original left stopped</small>"])

    start --> validate
    validate -->|Invalid| failed
    validate --> locate
    locate -->|None or many| failed
    locate --> detach
    detach --> stop_vm
    stop_vm --> wait_stopped
    wait_stopped -->|No| timer_stopped
    timer_stopped --> wait_stopped
    wait_stopped -->|Timeout| failed
    wait_stopped -->|Yes| snapshot
    snapshot --> wait_image
    wait_image -->|Pending| timer_image
    timer_image --> wait_image
    wait_image -->|Failed or timeout| failed
    wait_image -->|Ready| clone
    clone --> create
    create --> wait_running
    wait_running -->|No| timer_running
    timer_running --> wait_running
    wait_running -->|Timeout| failed
    wait_running -->|Yes| success

    classDef activity fill:#3b82f6,color:#fff,stroke:#1d4ed8
    classDef timer fill:#06b6d4,color:#fff,stroke:#0891b2
    classDef decision fill:#f59e0b,color:#000,stroke:#d97706
    classDef success fill:#22c55e,color:#fff,stroke:#16a34a
    classDef failure fill:#ef4444,color:#fff,stroke:#dc2626
    classDef start fill:#a855f7,color:#fff,stroke:#9333ea

    class start start
    class validate,locate,detach,stop_vm,snapshot,clone,create activity
    class timer_stopped,timer_image,timer_running timer
    class wait_stopped,wait_image,wait_running decision
    class success success
    class failed failure"#,
    node_mappings: &[
        ("validate", "validate"),
        ("locate", "locate"),
        ("stop_vm", "stop"),
        ("wait_stopped", "confirm-stopped"),
        ("snapshot", "snapshot"),
        ("clone", "clone"),
        ("create", "create"),
        ("wait_running", "confirm-running"),
    ],
};

/// Delete Instance orchestration flow
pub const DELETE_INSTANCE_FLOW: FlowDiagram = FlowDiagram {
    orchestration_name: orchestrations::DELETE_INSTANCE,
    mermaid: r#"flowchart TD
    start(["▶ Start"])
    delete["📋 Delete Instance"]
    check_found{"Found?"}
    deleted(["🏁 Deleted"])
    missing(["🏁 Nothing to delete"])
    failed(["💥 Failed"])

    start --> delete
    delete --> check_found
    check_found -->|Yes| deleted
    check_found -->|No| missing
    delete -->|Operation error| failed

    classDef activity fill:#3b82f6,color:#fff,stroke:#1d4ed8
    classDef decision fill:#f59e0b,color:#000,stroke:#d97706
    classDef success fill:#22c55e,color:#fff,stroke:#16a34a
    classDef failure fill:#ef4444,color:#fff,stroke:#dc2626
    classDef start fill:#a855f7,color:#fff,stroke:#9333ea

    class start start
    class delete activity
    class check_found decision
    class deleted,missing success
    class failed failure"#,
    node_mappings: &[("delete", "delete")],
};

/// Get Disk orchestration flow
pub const GET_DISK_FLOW: FlowDiagram = FlowDiagram {
    orchestration_name: orchestrations::GET_DISK,
    mermaid: r#"flowchart TD
    start(["▶ Start"])
    locate["📋 Locate Disk<br/><small>name prefix</small>"]
    check_single{"Exactly one?"}
    report(["🏁 Name, size, owner"])
    failed(["💥 Failed"])

    start --> locate
    locate --> check_single
    check_single -->|Yes| report
    check_single -->|None or many| failed

    classDef activity fill:#3b82f6,color:#fff,stroke:#1d4ed8
    classDef decision fill:#f59e0b,color:#000,stroke:#d97706
    classDef success fill:#22c55e,color:#fff,stroke:#16a34a
    classDef failure fill:#ef4444,color:#fff,stroke:#dc2626
    classDef start fill:#a855f7,color:#fff,stroke:#9333ea

    class start start
    class locate activity
    class check_single decision
    class report success
    class failed failure"#,
    node_mappings: &[("locate", "locate")],
};

pub fn get_all_flows() -> Vec<&'static FlowDiagram> {
    vec![&REPLACE_INSTANCE_FLOW, &DELETE_INSTANCE_FLOW, &GET_DISK_FLOW]
}

/// Look up a flow by full or short orchestration name
pub fn get_flow_by_name(name: &str) -> Option<&'static FlowDiagram> {
    let short_name = name.rsplit("::").next().unwrap_or(name);

    get_all_flows()
        .into_iter()
        .find(|flow| flow.orchestration_name == name || flow.orchestration_name.ends_with(&format!("::{}", short_name)))
}
