#[cfg(test)]
mod test_structure_search {
    use bayesnet_learn::inference::{CptEstimator, LikelihoodScorer, Penalty};
    use bayesnet_learn::network::{DataTable, Edge, Network, VariableId, VariableRegistry};
    use bayesnet_learn::search::{
        HillClimber, InitialStructure, SCORE_TOLERANCE, SearchConfig, StopReason,
    };

    const P1: VariableId = VariableId(0);
    const P2: VariableId = VariableId(1);
    const V: VariableId = VariableId(2);

    fn four_rows() -> (Network, DataTable) {
        let registry = VariableRegistry::from_names(["P1", "P2", "V"]).unwrap();
        let data = DataTable::from_rows(
            vec![
                vec![false, false, true],
                vec![false, true, false],
                vec![true, false, true],
                vec![true, true, true],
            ],
            3,
        )
        .unwrap();
        (Network::new(registry), data)
    }

    #[test]
    fn test_two_parent_table_order() {
        let (mut net, data) = four_rows();
        assert!(net.add_edge(P1, V));
        assert!(net.add_edge(P2, V));
        let probs = CptEstimator::new(&data).enumerate_all_probabilities(&net, V).unwrap();
        assert_eq!(probs.len(), 4);
        assert_eq!(probs, vec![1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_single_round_selects_parent_of_v() {
        let (net, data) = four_rows();
        let config = SearchConfig {
            max_rounds: Some(1),
            ..SearchConfig::default()
        };
        let climber = HillClimber::new(&data, config).unwrap();
        let baseline = climber.scorer().score(&net).unwrap();

        let outcome = climber.search_from(net).unwrap();
        assert_eq!(outcome.rounds, 1);
        assert_eq!(outcome.stop_reason, StopReason::RoundBudget);
        assert!(outcome.evaluation.score > baseline);
        // P1 -> V is the first improving move enumerated; equivalent moves tie.
        assert_eq!(outcome.network.edges(), &[Edge::new(P1, V)]);
        assert_eq!(outcome.network.parents_of(V), &[P1]);
    }

    #[test]
    fn test_search_terminates_at_local_optimum() {
        let (net, data) = four_rows();
        let climber = HillClimber::new(&data, SearchConfig::default()).unwrap();
        let outcome = climber.search_from(net).unwrap();

        assert_eq!(outcome.stop_reason, StopReason::Converged);
        assert!(outcome.network.is_acyclic());
        assert!(outcome.network.edge_count() >= 1);

        // No single move can beat the returned network.
        if let Some(candidate) = climber.best_move(&outcome.network).unwrap() {
            assert!(candidate.evaluation.score <= outcome.evaluation.score + SCORE_TOLERANCE);
        }
    }

    #[test]
    fn test_reported_score_matches_scorer() {
        let (net, data) = four_rows();
        let climber = HillClimber::new(&data, SearchConfig::default()).unwrap();
        let outcome = climber.search_from(net).unwrap();
        let scorer = LikelihoodScorer::new(&data, Penalty::default());
        let evaluation = scorer.evaluate(&outcome.network).unwrap();
        assert!((evaluation.score - outcome.evaluation.score).abs() < 1e-12);
        assert!((evaluation.score - (evaluation.log_likelihood - 4.0)).abs() < 1e-12);
    }

    #[test]
    fn test_best_move_skips_cycles() {
        let (mut net, data) = four_rows();
        net.add_edge(P1, P2);
        net.add_edge(P2, V);
        let climber = HillClimber::new(&data, SearchConfig::default()).unwrap();
        let candidate = climber.best_move(&net).unwrap().unwrap();
        assert!(candidate.network.is_acyclic());

        // Closing the loop directly is what the engine must refuse.
        let mut cyclic = net.clone();
        assert!(cyclic.add_edge(V, P1));
        assert!(!cyclic.is_acyclic());
    }

    #[test]
    fn test_two_cycle_blocked_by_pair_check() {
        let (mut net, _) = four_rows();
        assert!(net.add_edge(P1, P2));
        assert!(!net.add_edge(P2, P1));
        assert!(net.is_acyclic());
    }

    #[test]
    fn test_time_budget_stops_before_first_round() {
        let (net, data) = four_rows();
        let config = SearchConfig {
            max_rounds: None,
            time_limit_secs: Some(1e-9),
            ..SearchConfig::default()
        };
        let outcome = HillClimber::new(&data, config).unwrap().search_from(net.clone()).unwrap();
        assert_eq!(outcome.stop_reason, StopReason::TimeBudget);
        assert_eq!(outcome.rounds, 0);
        assert_eq!(outcome.network, net);
    }

    #[test]
    fn test_bic_prefers_sparse_structure_on_independent_data() {
        // Three independent fair coins over all eight combinations.
        let registry = VariableRegistry::from_names(["A", "B", "C"]).unwrap();
        let rows = (0..8)
            .map(|i| vec![i & 4 != 0, i & 2 != 0, i & 1 != 0])
            .collect();
        let data = DataTable::from_rows(rows, 3).unwrap();
        let config = SearchConfig {
            penalty: Penalty::Bic,
            ..SearchConfig::default()
        };
        let outcome = HillClimber::new(&data, config)
            .unwrap()
            .search_from(Network::new(registry))
            .unwrap();
        assert_eq!(outcome.network.edge_count(), 0);
        assert_eq!(outcome.stop_reason, StopReason::Converged);
    }

    #[test]
    fn test_spanning_tree_start() {
        let (net, data) = four_rows();
        let config = SearchConfig {
            initial: InitialStructure::SpanningTree,
            max_rounds: Some(0),
            ..SearchConfig::default()
        };
        let outcome = HillClimber::new(&data, config).unwrap().search(&net).unwrap();
        assert_eq!(outcome.network.edge_count(), 2);
        assert!(outcome.network.is_acyclic());
    }

    #[test]
    fn test_unseen_parent_configuration_is_half() {
        let registry = VariableRegistry::from_names(["A", "B"]).unwrap();
        let mut net = Network::new(registry);
        net.add_edge(VariableId(0), VariableId(1));
        let data = DataTable::from_rows(vec![vec![true, true], vec![true, false], vec![true, true]], 2).unwrap();
        let probs = CptEstimator::new(&data)
            .enumerate_all_probabilities(&net, VariableId(1))
            .unwrap();
        assert_eq!(probs[0], 0.5);
        assert!((probs[1] - 2.0 / 3.0).abs() < 1e-12);
    }
}
