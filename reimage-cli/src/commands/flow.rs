use anyhow::Result;
use reimage_orchestrations::flows::{get_all_flows, get_flow_by_name};

pub fn run_flow(name: String) -> Result<()> {
    let Some(flow) = get_flow_by_name(&name) else {
        let known: Vec<&str> = get_all_flows().iter().map(|flow| flow.orchestration_name).collect();
        anyhow::bail!("No flow named '{}' (known: {})", name, known.join(", "));
    };

    println!("%% {}", flow.orchestration_name);
    println!("{}", flow.mermaid);
    Ok(())
}
