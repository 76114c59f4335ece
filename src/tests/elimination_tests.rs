use crate::core::{EliminationPlanner, FGError, FactorGraphBuilder, VariableId, VariableRole};
use crate::counting::{build_graph, CountingConfig};

#[test]
fn star_graph_ties_follow_creation_order() {
    // a hub of domain 5 with four binary leaves; every leaf costs 5, the hub costs 48
    let mut fgb = FactorGraphBuilder::new();
    let leaves: Vec<VariableId> = (0..4)
        .map(|i| {
            fgb.add_variable(format!("leaf{i}"), 2, VariableRole::LatentPrior)
                .unwrap()
        })
        .collect();
    let hub = fgb.add_variable("hub", 5, VariableRole::LatentPrior).unwrap();
    let query = fgb.add_variable("query", 3, VariableRole::LatentPrior).unwrap();
    for leaf in leaves.iter().rev() {
        fgb.add_factor_fn(&[hub, *leaf], |_| 1.).unwrap();
    }
    fgb.add_factor_fn(&[hub, query], |_| 1.).unwrap();
    let fg = fgb.build();

    let plan = EliminationPlanner::new(&fg).plan(query).unwrap();
    let mut expected = leaves.clone();
    expected.push(hub);
    assert_eq!(plan.order(), expected.as_slice());
    assert_eq!(plan.query(), query);
    assert_eq!(*plan.full_order().last().unwrap(), query);
    // the largest product is (hub, leaf) or (hub, query)
    assert_eq!(plan.peak_table_size(), 15);
    // planning is a pure function of the graph
    assert_eq!(EliminationPlanner::new(&fg).plan(query).unwrap(), plan);
}

#[test]
fn unknown_query_is_rejected() {
    let mut fgb = FactorGraphBuilder::new();
    fgb.add_variable("a", 2, VariableRole::LatentPrior).unwrap();
    let fg = fgb.build();
    assert_eq!(
        EliminationPlanner::new(&fg).plan(VariableId(3)),
        Err(FGError::OutOfRangeVariable(1, 3))
    );
}

#[test]
fn counting_model_eliminates_draw_variables_before_items() {
    let config = CountingConfig::new(8, 0.5, 0.2, vec![true; 10]);
    let model = build_graph(&config).unwrap();
    let plan = model.plan().unwrap();
    let order = plan.order();
    assert_eq!(order.len(), model.graph().variables().len() - 1);
    assert!(!order.contains(&model.count_variable()));
    let position = |id: &VariableId| order.iter().position(|x| x == id).unwrap();
    let first_item = model.item_variables().iter().map(position).min().unwrap();
    for draw in model.draws() {
        assert!(position(&draw.switch) < first_item);
        assert!(position(&draw.selected) < position(&draw.index));
        assert!(position(&draw.index) < first_item);
    }
    // the widest table spans (count, index, items): 9 * 9 * 2^9
    assert_eq!(plan.peak_table_size(), 9 * 9 * 512);
}
