use crate::functions::registry::Symbol;

/// Reads the symbols of a gene front to back in Karva order.
pub struct GeneConsumer<'a> {
    symbols: &'a [Symbol],
    position: usize,
}

impl<'a> GeneConsumer<'a> {
    pub fn new(symbols: &'a [Symbol]) -> Self {
        Self {
            symbols,
            position: 0,
        }
    }

    /// Consume the next symbol, or `None` once the gene is exhausted.
    pub fn consume(&mut self) -> Option<Symbol> {
        let symbol = self.symbols.get(self.position).copied();
        if symbol.is_some() {
            self.position += 1;
        }
        symbol
    }

    /// Check if symbols remaining
    pub fn has_symbols(&self) -> bool {
        self.position < self.symbols.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consumes_in_order_then_stops() {
        let symbols = [Symbol::Variable(0), Symbol::Constant(1)];
        let mut consumer = GeneConsumer::new(&symbols);
        assert_eq!(consumer.consume(), Some(Symbol::Variable(0)));
        assert!(consumer.has_symbols());
        assert_eq!(consumer.consume(), Some(Symbol::Constant(1)));
        assert_eq!(consumer.consume(), None);
        assert_eq!(consumer.position(), 2);
    }
}
