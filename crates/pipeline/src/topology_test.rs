use super::*;

fn chain() -> Topology {
    let mut topo = Topology::new();
    topo.add_edge("in", "route");
    topo.add_edge("route", "out");
    topo
}

#[test]
fn test_consumers_sort_before_producers() {
    let order = chain().sorted().unwrap();
    assert_eq!(order, vec!["out", "route", "in"]);
}

#[test]
fn test_diamond_keeps_both_branches_ahead() {
    let mut topo = Topology::new();
    topo.add_edge("in", "left");
    topo.add_edge("in", "right");
    topo.add_edge("left", "out");
    topo.add_edge("right", "out");

    let order = topo.sorted().unwrap();
    let pos = |name: &str| order.iter().position(|n| n == name).unwrap();
    assert!(pos("out") < pos("left"));
    assert!(pos("out") < pos("right"));
    assert!(pos("left") < pos("in"));
    assert!(pos("right") < pos("in"));
}

#[test]
fn test_isolated_node_is_included() {
    let mut topo = chain();
    topo.add_node("lonely");
    let order = topo.sorted().unwrap();
    assert_eq!(order.len(), 4);
    assert!(order.contains(&"lonely".to_owned()));
}

#[test]
fn test_duplicate_edges_are_harmless() {
    let mut topo = chain();
    topo.add_edge("in", "route");
    let order = topo.sorted().unwrap();
    assert_eq!(order, vec!["out", "route", "in"]);
}

#[test]
fn test_duplicate_nodes_collapse() {
    let mut topo = Topology::new();
    assert_eq!(topo.add_node("a"), topo.add_node("a"));
    assert_eq!(topo.len(), 1);
}

#[test]
fn test_cycle_is_rejected() {
    let mut topo = Topology::new();
    topo.add_edge("a", "b");
    topo.add_edge("b", "c");
    topo.add_edge("c", "a");
    let err = topo.sorted().unwrap_err();
    assert!(matches!(err, PipelineError::CycleDetected { .. }));
}

#[test]
fn test_self_loop_is_rejected() {
    let mut topo = Topology::new();
    topo.add_edge("a", "a");
    assert!(matches!(
        topo.sorted().unwrap_err(),
        PipelineError::CycleDetected { .. }
    ));
}

#[test]
fn test_empty_topology_sorts_empty() {
    assert!(Topology::new().sorted().unwrap().is_empty());
}
