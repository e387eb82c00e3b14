use std::collections::HashSet;

use carekg::graph::types::{EventData, NodeData, PersonData};
use carekg::graph::{Connection, KnowledgeGraph};
use carekg::Error;

/// A graph with a cycle, a parallel edge and a dead end.
fn tangled() -> KnowledgeGraph {
    let mut kg = KnowledgeGraph::new();
    for (id, name) in [("user", "Margaret"), ("a", "Ann"), ("b", "Ben"), ("c", "Cat"), ("d", "Dan")] {
        kg.add_person(id, PersonData::new(name, 50)).unwrap();
    }
    kg.add_event("e", EventData::new("Tea", "Afternoon tea", "16:00", "Sunday", "Kitchen"))
        .unwrap();
    kg.connect("user", "a", "knows", false).unwrap();
    kg.connect("a", "b", "knows", false).unwrap();
    kg.connect("a", "b", "likes", false).unwrap();
    kg.connect("b", "c", "knows", true).unwrap();
    kg.connect("c", "user", "visits", false).unwrap();
    kg.connect("d", "e", "attended", false).unwrap();
    kg
}

#[test]
fn zero_distance_is_the_node_itself() {
    let kg = tangled();
    for id in kg.get_nodes() {
        assert_eq!(kg.get_neighbors(&id, 0).unwrap(), vec![id.clone()]);
    }
}

#[test]
fn neighborhoods_grow_monotonically_with_distance() {
    let kg = tangled();
    for id in kg.get_nodes() {
        let mut previous: HashSet<String> = HashSet::new();
        for d in 0..6 {
            let current: HashSet<String> = kg.get_neighbors(&id, d).unwrap().into_iter().collect();
            assert!(previous.is_subset(&current), "{id} shrank at distance {d}");
            previous = current;
        }
    }
}

#[test]
fn neighbors_are_unique_even_with_parallel_edges_and_cycles() {
    let kg = tangled();
    let neighbors = kg.get_neighbors("user", 10).unwrap();
    let unique: HashSet<_> = neighbors.iter().collect();
    assert_eq!(neighbors.len(), unique.len());
    assert_eq!(unique.len(), 4, "d and e are unreachable from user");
}

#[test]
fn direction_is_respected() {
    let kg = tangled();
    assert_eq!(kg.get_neighbors("e", 3).unwrap(), vec!["e"]);
    assert_eq!(kg.get_neighbors("d", 1).unwrap(), vec!["d", "e"]);
}

#[test]
fn from_config_rejects_duplicate_ids_across_kinds() {
    let result = KnowledgeGraph::from_config(
        vec![("tea".to_string(), PersonData::new("Tea Lady", 70))],
        vec![(
            "tea".to_string(),
            EventData::new("Tea", "", "16:00", "Sunday", "Kitchen"),
        )],
        Vec::<Connection>::new(),
    );
    assert!(matches!(result, Err(Error::DuplicateNode(id)) if id == "tea"));
}

#[test]
fn event_day_is_canonicalized_on_insert() {
    let mut kg = KnowledgeGraph::new();
    kg.add_event("e", EventData::new("Tea", "", "16:00", "sUnDaY", "Kitchen"))
        .unwrap();
    match &kg.node("e").unwrap().data {
        NodeData::Event(e) => assert_eq!(e.day, "Sunday"),
        other => panic!("expected event, got {other:?}"),
    }
}

#[test]
fn event_time_is_stored_zero_padded() {
    let mut kg = KnowledgeGraph::new();
    kg.add_event("e", EventData::new("Tea", "", "9:5", "Sunday", "Kitchen"))
        .unwrap();
    assert!(kg.node_to_text("e").unwrap().contains("time: 09:05\n"));
}

#[test]
fn blank_ids_are_rejected() {
    let mut kg = KnowledgeGraph::new();
    assert!(matches!(
        kg.add_person("", PersonData::new("Nobody", 1)),
        Err(Error::EmptyNodeId)
    ));
    assert!(matches!(
        kg.add_event(" ", EventData::new("Tea", "", "16:00", "Sunday", "")),
        Err(Error::EmptyNodeId)
    ));
    assert!(kg.is_empty());
}

#[test]
fn invalid_event_payloads_are_rejected() {
    let mut kg = KnowledgeGraph::new();
    assert!(matches!(
        kg.add_event("e", EventData::new("Tea", "", "4pm", "Sunday", "")),
        Err(Error::InvalidTimeFormat(_))
    ));
    assert!(matches!(
        kg.add_event("e", EventData::new("Tea", "", "16:00", "Caturday", "")),
        Err(Error::InvalidDayFormat(_))
    ));
    assert!(matches!(
        kg.add_event("e", EventData::new("Tea", "", "16:00", "Sun", "")),
        Err(Error::InvalidDayFormat(_))
    ));
    assert!(kg.is_empty());
}

#[test]
fn rendering_is_deterministic() {
    let a = tangled();
    let b = tangled();
    for id in a.get_nodes() {
        assert_eq!(a.node_to_text(&id).unwrap(), b.node_to_text(&id).unwrap());
    }
    assert_eq!(
        a.node_to_text("a").unwrap(),
        "name: Ann\nage: 50\na knows b. likes b."
    );
}
