use gepreg::engines::evaluation::FitnessEvaluator;
use gepreg::engines::generation::{random_gene, Chromosome, ExpressionTree, Gene};
use gepreg::engines::metrics::RegressionMetrics;
use gepreg::functions::{Operator, Symbol, SymbolTable};
use gepreg::{Table, TrainingSet};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn table() -> SymbolTable {
    SymbolTable::new(Operator::ALL.to_vec(), 3, vec![-4.5, 0.0, 1e-12, 7.25]).unwrap()
}

/// Any code sequence and any head length, including layouts that break the
/// head/tail rule.
fn arbitrary_gene() -> impl Strategy<Value = Gene> {
    let size = table().len() as u16;
    (prop::collection::vec(0..size, 0..40), 0usize..40).prop_map(|(codes, head)| {
        let table = table();
        let symbols: Vec<Symbol> = codes.iter().filter_map(|c| table.symbol(*c)).collect();
        let head = head.min(symbols.len());
        Gene::new(symbols, head)
    })
}

fn finite_row() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-1e6f64..1e6, 3)
}

/// Rows of two inputs plus a response.
fn training_rows() -> impl Strategy<Value = Vec<(f64, f64, f64)>> {
    prop::collection::vec((-3.0f64..3.0, -3.0f64..3.0, -10.0f64..10.0), 8..30)
}

fn training_set(rows: &[(f64, f64, f64)]) -> TrainingSet {
    let inputs: Vec<Vec<f64>> = rows.iter().map(|(a, b, _)| vec![*a, *b]).collect();
    let response = rows.iter().map(|(_, _, y)| *y).collect();
    TrainingSet::new(Table::from_rows(&inputs).unwrap(), response).unwrap()
}

proptest! {
    #[test]
    fn decode_is_total_and_deterministic(gene in arbitrary_gene()) {
        let table = table();
        let tree = ExpressionTree::decode(&gene, &table);
        prop_assert_eq!(&tree, &ExpressionTree::decode(&gene, &table));
        prop_assert!(tree.size() >= 1);
        prop_assert!(tree.size() <= 2 * gene.len() + 1);
    }

    #[test]
    fn head_tail_genes_decode_within_their_length(seed in any::<u64>(), head in 1usize..12) {
        let table = table();
        let gene = random_gene(&table, head, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(gene.len(), head + table.tail_length(head));
        prop_assert!(ExpressionTree::decode(&gene, &table).size() <= gene.len());
    }

    #[test]
    fn evaluation_is_always_finite(gene in arbitrary_gene(), row in finite_row()) {
        let tree = ExpressionTree::decode(&gene, &table());
        prop_assert!(tree.evaluate(&row).is_finite());
    }

    #[test]
    fn r_squared_is_bounded_and_order_free(
        pairs in prop::collection::vec((-1e3f64..1e3, -1e3f64..1e3), 2..60),
        shift in 0usize..60,
    ) {
        let (predicted, actual): (Vec<f64>, Vec<f64>) = pairs.iter().copied().unzip();
        let r2 = RegressionMetrics::r_squared(&predicted, &actual);
        prop_assert!((0.0..=1.0).contains(&r2));

        let mut rotated = pairs.clone();
        rotated.rotate_left(shift % pairs.len());
        rotated.reverse();
        let (p2, a2): (Vec<f64>, Vec<f64>) = rotated.into_iter().unzip();
        let permuted = RegressionMetrics::r_squared(&p2, &a2);
        prop_assert!((r2 - permuted).abs() < 1e-9, "{} vs {}", r2, permuted);
    }

    #[test]
    fn evaluator_fitness_ignores_row_order(
        rows in training_rows(),
        seed in any::<u64>(),
        head in 1usize..4,
        genes in 1usize..3,
        shift in 0usize..30,
    ) {
        let table = SymbolTable::new(
            vec![Operator::Add, Operator::Sub, Operator::Mul, Operator::Sin, Operator::Neg],
            2,
            vec![-2.5, 0.5, 3.0],
        )
        .unwrap();
        let mut rng = StdRng::seed_from_u64(seed);
        let chromosome = Chromosome::new(
            (0..genes).map(|_| random_gene(&table, head, &mut rng)).collect(),
        );

        let mut shuffled = rows.clone();
        shuffled.rotate_left(shift % rows.len());
        shuffled.reverse();

        let original = training_set(&rows);
        let permuted = training_set(&shuffled);
        let a = FitnessEvaluator::new(&original, &table).evaluate(&chromosome).fitness;
        let b = FitnessEvaluator::new(&permuted, &table).evaluate(&chromosome).fitness;

        prop_assert!((0.0..=1.0).contains(&a));
        prop_assert!((0.0..=1.0).contains(&b));
        prop_assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
    }
}
