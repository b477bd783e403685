use crate::engines::generation::gene_consumer::GeneConsumer;
use crate::engines::generation::genome::Gene;
use crate::functions::primitives::{guard, Operator};
use crate::functions::registry::{Symbol, SymbolTable};
use crate::types::Table;

/// Node of a decoded expression. Children of a function node sit at
/// `first_child..first_child + arity` and always have larger indices than the parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Function { op: Operator, first_child: usize },
    Variable(usize),
    Constant(f64),
}

/// Expression tree decoded from one gene, stored flat in breadth-first order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionTree {
    nodes: Vec<Node>,
}

impl ExpressionTree {
    /// Breadth-first Karva decoding.
    ///
    /// Symbols are read until every open argument slot is filled; the rest of the
    /// tail is ignored. Total over any symbol sequence: slots that a short sequence
    /// cannot fill become `0.0` constants, and an empty gene decodes to `0.0`.
    pub fn decode(gene: &Gene, table: &SymbolTable) -> Self {
        let mut consumer = GeneConsumer::new(gene.symbols());
        let mut nodes = Vec::new();
        let mut open_slots = 1usize;
        let mut next_child = 1usize;

        while open_slots > 0 {
            let node = match consumer.consume() {
                Some(Symbol::Function(op)) => {
                    let node = Node::Function {
                        op,
                        first_child: next_child,
                    };
                    next_child += op.arity();
                    open_slots += op.arity();
                    node
                }
                Some(Symbol::Variable(i)) => Node::Variable(i),
                Some(Symbol::Constant(i)) => Node::Constant(
                    table.constants().get(i).copied().unwrap_or(0.0),
                ),
                None => Node::Constant(0.0),
            };
            nodes.push(node);
            open_slots -= 1;
        }

        Self { nodes }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Number of symbols the expression actually uses.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Evaluate against one input row. Always finite for finite inputs.
    pub fn evaluate(&self, row: &[f64]) -> f64 {
        let mut scratch = Vec::with_capacity(self.nodes.len());
        self.evaluate_with(row, &mut scratch)
    }

    /// Same as `evaluate`, reusing `scratch` for node values.
    pub fn evaluate_with(&self, row: &[f64], scratch: &mut Vec<f64>) -> f64 {
        scratch.clear();
        scratch.resize(self.nodes.len(), 0.0);

        // children always follow their parent, so a reverse sweep sees them first
        for i in (0..self.nodes.len()).rev() {
            scratch[i] = match &self.nodes[i] {
                Node::Function { op, first_child } => {
                    let a = scratch[*first_child];
                    let b = if op.arity() == 2 {
                        scratch[*first_child + 1]
                    } else {
                        0.0
                    };
                    op.apply(a, b)
                }
                Node::Variable(v) => guard(row.get(*v).copied().unwrap_or(0.0)),
                Node::Constant(c) => *c,
            };
        }

        scratch.first().copied().unwrap_or(0.0)
    }

    /// Evaluate every row of a table.
    pub fn evaluate_table(&self, table: &Table) -> Vec<f64> {
        let mut scratch = Vec::with_capacity(self.nodes.len());
        table
            .rows()
            .map(|row| self.evaluate_with(row, &mut scratch))
            .collect()
    }

    /// Infix rendering, e.g. `(x1 * sin(x2))`.
    pub fn to_formula(&self) -> String {
        if self.nodes.is_empty() {
            return "0".to_string();
        }
        self.render(0)
    }

    fn render(&self, index: usize) -> String {
        match &self.nodes[index] {
            Node::Function { op, first_child } => {
                let args: Vec<String> = (0..op.arity())
                    .map(|k| self.render(first_child + k))
                    .collect();
                op.render(&args)
            }
            Node::Variable(v) => format!("x{}", v + 1),
            Node::Constant(c) => format!("{}", c),
        }
    }
}

/// Linked model rendering, e.g. `1.5 + 2*((x1 * x1)) - 0.25*(x2)`. Genes with
/// a zero coefficient are left out.
pub fn render_model(formulas: &[String], coefficients: &[f64], intercept: f64) -> String {
    let mut out = format!("{}", intercept);
    for (formula, &b) in formulas.iter().zip(coefficients) {
        if b == 0.0 {
            continue;
        }
        let sign = if b < 0.0 { '-' } else { '+' };
        out.push_str(&format!(" {} {}*({})", sign, b.abs(), formula));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> SymbolTable {
        SymbolTable::new(Operator::ALL.to_vec(), 2, vec![2.5]).unwrap()
    }

    fn gene(symbols: Vec<Symbol>, head_length: usize) -> Gene {
        Gene::new(symbols, head_length)
    }

    #[test]
    fn test_decode_breadth_first() {
        // * + x2 x1 x1 ...  =>  (x1 + x1) * x2
        let g = gene(
            vec![
                Symbol::Function(Operator::Mul),
                Symbol::Function(Operator::Add),
                Symbol::Variable(1),
                Symbol::Variable(0),
                Symbol::Variable(0),
                Symbol::Variable(1),
                Symbol::Variable(1),
            ],
            3,
        );
        let tree = ExpressionTree::decode(&g, &table());
        assert_eq!(tree.size(), 5);
        assert_eq!(tree.evaluate(&[3.0, 4.0]), 24.0);
        assert_eq!(tree.to_formula(), "((x1 + x1) * x2)");
    }

    #[test]
    fn test_terminal_root_ignores_rest() {
        let g = gene(
            vec![
                Symbol::Constant(0),
                Symbol::Function(Operator::Div),
                Symbol::Variable(0),
            ],
            1,
        );
        let tree = ExpressionTree::decode(&g, &table());
        assert_eq!(tree.size(), 1);
        assert_eq!(tree.evaluate(&[100.0, 0.0]), 2.5);
    }

    #[test]
    fn test_unary_chain() {
        let g = gene(
            vec![
                Symbol::Function(Operator::Neg),
                Symbol::Function(Operator::Square),
                Symbol::Variable(1),
                Symbol::Variable(0),
            ],
            2,
        );
        let tree = ExpressionTree::decode(&g, &table());
        assert_eq!(tree.evaluate(&[0.0, 3.0]), -9.0);
        assert_eq!(tree.to_formula(), "neg(sqr(x2))");
    }

    #[test]
    fn test_short_sequence_still_decodes() {
        let g = gene(vec![Symbol::Function(Operator::Add)], 1);
        let tree = ExpressionTree::decode(&g, &table());
        assert_eq!(tree.size(), 3);
        assert_eq!(tree.evaluate(&[1.0, 1.0]), 0.0);

        let empty = ExpressionTree::decode(&gene(vec![], 0), &table());
        assert_eq!(empty.evaluate(&[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_guarded_division_in_tree() {
        let g = gene(
            vec![
                Symbol::Function(Operator::Div),
                Symbol::Variable(0),
                Symbol::Variable(1),
            ],
            1,
        );
        let tree = ExpressionTree::decode(&g, &table());
        assert_eq!(tree.evaluate(&[5.0, 0.0]), 1.0);
    }

    #[test]
    fn test_evaluate_table() {
        let g = gene(
            vec![
                Symbol::Function(Operator::Sub),
                Symbol::Variable(0),
                Symbol::Variable(1),
            ],
            1,
        );
        let tree = ExpressionTree::decode(&g, &table());
        let data = Table::from_rows(&[vec![3.0, 1.0], vec![5.0, 5.0]]).unwrap();
        assert_eq!(tree.evaluate_table(&data), vec![2.0, 0.0]);
    }

    #[test]
    fn test_render_model_skips_dead_genes() {
        let formulas = vec!["x1".to_string(), "sin(x2)".to_string(), "x2".to_string()];
        assert_eq!(
            render_model(&formulas, &[2.0, 0.0, -0.5], 1.5),
            "1.5 + 2*(x1) - 0.5*(x2)"
        );
        assert_eq!(render_model(&formulas, &[0.0, 0.0, 0.0], 3.0), "3");
    }
}
